//! Shared front-end state: compiled pages, the pooled HTTP client, and the
//! settings that shape cookies and backend calls.

use crate::client::{
    ApiClient, AuthClient, MemoryTokenStore,
    api::{DEFAULT_TIMEOUT, build_http_client},
};
use crate::web::{pages::Pages, session::CookiePolicy};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use url::Url;

/// Matches the backend's 24 hour token lifetime.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 86_400;

#[derive(Clone, Debug)]
pub struct FrontendConfig {
    api_url: Url,
    timeout: Duration,
    cookie_secure: bool,
    session_ttl_seconds: u64,
}

impl FrontendConfig {
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: DEFAULT_TIMEOUT,
            cookie_secure: false,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.session_ttl_seconds = ttl_seconds;
        self
    }

    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy {
            secure: self.cookie_secure,
            ttl_seconds: self.session_ttl_seconds,
        }
    }
}

pub struct AppState {
    config: FrontendConfig,
    pages: Pages,
    http: reqwest::Client,
}

impl AppState {
    /// # Errors
    /// Returns an error if the templates or the HTTP client cannot be built.
    pub fn new(config: FrontendConfig) -> Result<Self> {
        let pages = Pages::new()?;
        let http = build_http_client(config.timeout()).context("Failed to build HTTP client")?;
        Ok(Self {
            config,
            pages,
            http,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    #[must_use]
    pub fn pages(&self) -> &Pages {
        &self.pages
    }

    /// Auth helper scoped to one request, seeded with the request's token.
    #[must_use]
    pub fn auth_client(&self, token: Option<SecretString>) -> AuthClient {
        let store = Arc::new(MemoryTokenStore::with_token(token));
        AuthClient::new(ApiClient::with_http(
            self.http.clone(),
            self.config.api_url().clone(),
            store,
        ))
    }
}
