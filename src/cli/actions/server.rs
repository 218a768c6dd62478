use crate::cli::globals::GlobalArgs;
use crate::web::{self, AppState, FrontendConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub globals: GlobalArgs,
    pub cookie_secure: bool,
    pub session_ttl_seconds: u64,
}

impl Args {
    #[must_use]
    pub fn frontend_config(&self) -> FrontendConfig {
        FrontendConfig::new(self.globals.api_url.clone())
            .with_timeout(self.globals.timeout)
            .with_cookie_secure(self.cookie_secure)
            .with_session_ttl_seconds(self.session_ttl_seconds)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the state cannot be built or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    let state = Arc::new(AppState::new(args.frontend_config())?);

    info!(
        api_url = %args.globals.api_url,
        cookie_secure = args.cookie_secure,
        "starting front end"
    );

    web::new(args.port, state).await
}
