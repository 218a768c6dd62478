use axum::{
    extract::Extension,
    http::{HeaderMap, Uri},
    response::Response,
};
use std::sync::Arc;

use crate::web::{session::extract_token, state::AppState};

/// Renders any page under `/protected`. The route guard has already ensured a
/// token is present; whether it is still valid is only known once the
/// profile request comes back.
pub async fn protected(
    headers: HeaderMap,
    uri: Uri,
    state: Extension<Arc<AppState>>,
) -> Response {
    let client = state.auth_client(extract_token(&headers));
    let user = client.current_user().await;
    state
        .pages()
        .protected(uri.path(), user.as_ref().map(|user| user.email.as_str()))
}
