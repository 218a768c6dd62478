use axum::{
    extract::Extension,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

use crate::web::{
    guard::HOME_PATH,
    session::{clear_token_cookie, extract_token},
    state::AppState,
};

#[instrument(skip_all)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    let client = state.auth_client(extract_token(&headers));
    if let Err(err) = client.logout().await {
        error!("Error during logout: {err}");
    }

    // Always clear the cookie, even if the backend call failed.
    let mut response = Redirect::to(HOME_PATH).into_response();
    match clear_token_cookie(state.config().cookie_policy()) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build clearing cookie: {err}"),
    }
    response
}
