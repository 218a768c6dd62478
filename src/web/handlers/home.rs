use axum::{extract::Extension, http::HeaderMap, response::Response};
use std::sync::Arc;

use crate::web::{session::extract_token, state::AppState};

pub async fn home(headers: HeaderMap, state: Extension<Arc<AppState>>) -> Response {
    state.pages().home(extract_token(&headers).is_some())
}

pub async fn not_found(
    headers: HeaderMap,
    uri: axum::http::Uri,
    state: Extension<Arc<AppState>>,
) -> Response {
    state
        .pages()
        .not_found(extract_token(&headers).is_some(), uri.path())
}
