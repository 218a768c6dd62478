use std::time::Duration;
use url::Url;

/// Settings shared by every subcommand that talks to the backend.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: Url,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: Url, timeout: Duration) -> Self {
        Self { api_url, timeout }
    }
}
