pub mod health;
pub use self::health::health;

pub mod home;
pub use self::home::{home, not_found};

pub mod login;
pub mod logout;
pub mod protected;
pub mod register;

// common functions for the form handlers
use crate::client::ClientError;
use axum::http::StatusCode;
use regex::Regex;
use serde::Deserialize;
use std::{fmt, sync::OnceLock};

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Email/password pair posted by the login and register forms.
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl CredentialsForm {
    /// Returns the trimmed email, or a message for the form.
    pub fn validate(&self) -> Result<String, String> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err("Email and password are required".to_string());
        }
        if !valid_email(email) {
            return Err("Please enter a valid email address".to_string());
        }
        Ok(email.to_string())
    }
}

/// Compiled once per process.
pub fn valid_email(email: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// Status used when re-rendering a form after a failed backend call.
pub fn form_error_status(err: &ClientError) -> StatusCode {
    match err {
        ClientError::Http { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        ClientError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ClientError::Storage(_) | ClientError::Config(_) | ClientError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ClientError::Network(_) | ClientError::Parse(_) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn valid_email_accepts_common_addresses() {
        assert!(valid_email("ada@example.com"));
        assert!(valid_email("first.last+tag@sub.example.org"));
        assert!(!valid_email("ada@example"));
        assert!(!valid_email("ada example.com"));
        assert!(!valid_email("@example.com"));

        // The pattern is compiled once and kept.
        assert!(matches!(EMAIL_RE.get(), Some(Some(_))));
    }

    #[test]
    fn validate_trims_email_and_requires_both_fields() {
        assert_eq!(
            form("  ada@example.com ", "pw").validate(),
            Ok("ada@example.com".to_string())
        );
        assert!(form("", "pw").validate().is_err());
        assert!(form("ada@example.com", "").validate().is_err());
        assert_eq!(
            form("not-an-email", "pw").validate(),
            Err("Please enter a valid email address".to_string())
        );
    }

    #[test]
    fn form_error_status_mirrors_backend_status() {
        let err = ClientError::Http {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(form_error_status(&err), StatusCode::CONFLICT);
        assert_eq!(
            form_error_status(&ClientError::Network("down".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            form_error_status(&ClientError::Timeout("slow".to_string())),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", form("ada@example.com", "hunter22"));
        assert!(!rendered.contains("hunter22"));
    }
}
