//! HTTP helpers for the backend JSON API with a consistent timeout and error
//! mapping. The bearer interceptor lives here: [`ApiClient::authorized`] reads
//! the token store on every call and attaches `Authorization: Bearer <token>`
//! when a token is present. Tokens are never logged.

use crate::{
    APP_USER_AGENT,
    client::{ClientError, TokenStore, types::ErrorBody},
};
use reqwest::{Client, Method, RequestBuilder, Response, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

/// Default request timeout applied to all backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    /// Builds a client with its own connection pool.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: Url,
        timeout: Duration,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let http = build_http_client(timeout)?;
        Ok(Self::with_http(http, base_url, store))
    }

    /// Reuses an existing HTTP client, so many short-lived `ApiClient`s can
    /// share one connection pool.
    #[must_use]
    pub fn with_http(http: Client, base_url: Url, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url,
            store,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request builder without credentials.
    pub fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, build_url(&self.base_url, path))
    }

    /// Request builder passed through the bearer interceptor.
    pub fn authorized(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.anonymous(method, path);
        match self.store.get() {
            Some(token) => with_bearer(builder, &token),
            None => builder,
        }
    }

    /// Posts JSON without credentials and parses a JSON response.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or undecodable body.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = send(self.anonymous(Method::POST, path).json(body)).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON through the bearer interceptor.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or undecodable body.
    pub async fn get_json_authorized<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let response = send(self.authorized(Method::GET, path)).await?;
        handle_json_response(response).await
    }
}

/// Attaches `Authorization: Bearer <token>` to a request.
pub fn with_bearer(builder: RequestBuilder, token: &SecretString) -> RequestBuilder {
    builder.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
}

/// Builds the shared HTTP client with the crate user agent and a request timeout.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<Client, ClientError> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|err| ClientError::Config(format!("Failed to build HTTP client: {err}")))
}

/// Parses and normalizes the API base URL.
///
/// # Errors
/// Returns an error unless the value is an absolute `http(s)` URL.
pub fn parse_base_url(value: &str) -> Result<Url, ClientError> {
    let url = Url::parse(value.trim())
        .map_err(|err| ClientError::Config(format!("Invalid API base URL {value}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "API base URL must use http or https: {value}"
        )));
    }
    Ok(url)
}

/// Builds a URL from the base URL and a path, keeping any base path prefix.
fn build_url(base_url: &Url, path: &str) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    let path = path.trim();
    format!("{}/{}", base, path.trim_start_matches('/'))
}

/// Sends a request and maps transport errors.
pub(crate) async fn send(builder: RequestBuilder) -> Result<Response, ClientError> {
    builder.send().await.map_err(map_request_error)
}

/// Maps reqwest errors into `ClientError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ClientError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ClientError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
pub(crate) async fn handle_json_response<T: DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ClientError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Accepts any 2xx response and discards its body.
pub(crate) async fn handle_empty_response(response: Response) -> Result<(), ClientError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    debug!(status, "backend returned an error status");
    ClientError::Http {
        status,
        message: error_message(&body),
    }
}

/// Prefers the backend's `{"message": ...}` field, else the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => sanitize_body(&parsed.message),
        Err(_) => sanitize_body(body),
    }
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::MemoryTokenStore;

    fn client(base: &str, token: Option<&str>) -> ApiClient {
        let store = Arc::new(MemoryTokenStore::with_token(token.map(SecretString::from)));
        ApiClient::new(parse_base_url(base).unwrap(), DEFAULT_TIMEOUT, store).unwrap()
    }

    #[test]
    fn build_url_joins_without_double_slashes() {
        let base = Url::parse("http://backend.local:8080/").unwrap();
        assert_eq!(
            build_url(&base, "/api/auth/login"),
            "http://backend.local:8080/api/auth/login"
        );

        let prefixed = Url::parse("https://example.com/gateway/").unwrap();
        assert_eq!(
            build_url(&prefixed, "api/auth/me"),
            "https://example.com/gateway/api/auth/me"
        );
    }

    #[test]
    fn parse_base_url_rejects_non_http_schemes() {
        assert!(parse_base_url("http://localhost:8080").is_ok());
        assert!(parse_base_url(" https://api.example.com ").is_ok());
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn sanitize_body_trims_and_truncates() {
        assert_eq!(sanitize_body("   "), "Request failed.");
        assert_eq!(sanitize_body("  nope \n"), "nope");
        assert_eq!(sanitize_body(&"x".repeat(500)).len(), MAX_ERROR_CHARS);
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message":"Email already registered"}"#),
            "Email already registered"
        );
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[test]
    fn authorized_attaches_bearer_only_when_token_present() {
        let with_token = client("http://localhost:8080", Some("jwt-value"));
        let request = with_token
            .authorized(Method::GET, "/api/auth/me")
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Bearer jwt-value"
        );

        let without_token = client("http://localhost:8080", None);
        let request = without_token
            .authorized(Method::GET, "/api/auth/me")
            .build()
            .unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn anonymous_never_attaches_bearer() {
        let api = client("http://localhost:8080", Some("jwt-value"));
        let request = api
            .anonymous(Method::POST, "/api/auth/login")
            .build()
            .unwrap();
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(request.url().path(), "/api/auth/login");
    }
}
