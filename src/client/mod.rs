//! Client-side auth helper for the backend `/api/auth/*` endpoints.
//!
//! Flow Overview: `login` posts credentials and persists the returned token;
//! authorized calls pick the token up through the bearer interceptor in
//! [`api`]; `logout` clears the store before notifying the backend. Failure
//! policy differs per operation: `login` and `register` return errors to the
//! caller, `logout` swallows the backend call, and `current_user` maps every
//! failure to `None`.

pub mod api;
mod errors;
pub mod store;
pub mod types;

pub use self::api::ApiClient;
pub use self::errors::ClientError;
pub use self::store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use self::types::{AuthResponse, LoginCredentials, RegisterCredentials, User};

use reqwest::Method;
use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, error, instrument};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const ME_PATH: &str = "/api/auth/me";

#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// True while the store holds a non-empty token. No network call.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.api.store().get().is_some()
    }

    /// Posts credentials and persists the token when the backend returns one.
    ///
    /// # Errors
    /// Returns the backend or transport error, or a storage error if the
    /// token cannot be persisted.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ClientError> {
        let response: AuthResponse = self.api.post_json(LOGIN_PATH, credentials).await?;

        if let Some(token) = response.token() {
            self.api
                .store()
                .set(SecretString::from(token.to_string()))?;
            debug!("session token stored");
        } else {
            debug!("login response carried no token");
        }

        Ok(response)
    }

    /// Posts the registration payload. The response shape is up to the
    /// backend and no token is persisted.
    ///
    /// # Errors
    /// Returns the backend or transport error.
    #[instrument(skip_all, fields(email = %user_data.email))]
    pub async fn register(&self, user_data: &RegisterCredentials) -> Result<Value, ClientError> {
        self.api.post_json(REGISTER_PATH, user_data).await
    }

    /// Clears the stored token, then asks the backend to drop its session.
    /// The backend call is best-effort; its failure is logged and ignored.
    ///
    /// # Errors
    /// Returns an error only if the local store cannot be cleared.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ClientError> {
        let token = self.api.store().get();
        self.api.store().clear()?;

        let mut request = self.api.anonymous(Method::POST, LOGOUT_PATH);
        if let Some(token) = &token {
            request = api::with_bearer(request, token);
        }

        let result = match api::send(request).await {
            Ok(response) => api::handle_empty_response(response).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            error!("Error during logout: {err}");
        }

        Ok(())
    }

    /// Fetches the current user's profile. Returns `None` without a network
    /// call when no token is stored, and `None` on any failure.
    #[instrument(skip_all)]
    pub async fn current_user(&self) -> Option<User> {
        if !self.is_authenticated() {
            return None;
        }

        match self
            .api
            .get_json_authorized::<types::MeResponse>(ME_PATH)
            .await
        {
            Ok(me) => Some(me.user),
            Err(err) => {
                error!("Failed to get current user: {err}");
                None
            }
        }
    }
}
