//! Route guard middleware.
//!
//! Runs once per request and only looks at token presence. Protected paths
//! without a token go to `/login`; the login and register pages with a token go
//! to `/`. GET and HEAD are redirected with 307, other methods with 303.
//! Signature and expiry checks belong to the backend.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::session::extract_token;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";
const PROTECTED_PREFIX: &str = "/protected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Continue,
    Redirect(&'static str),
}

/// `/protected` and anything below it.
#[must_use]
pub fn is_protected_path(path: &str) -> bool {
    path.strip_prefix(PROTECTED_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn is_auth_path(path: &str) -> bool {
    path == LOGIN_PATH || path == REGISTER_PATH
}

#[must_use]
pub fn decide(path: &str, has_token: bool) -> GuardDecision {
    if is_protected_path(path) && !has_token {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    if is_auth_path(path) && has_token {
        return GuardDecision::Redirect(HOME_PATH);
    }
    GuardDecision::Continue
}

/// axum middleware applying [`decide`] to every request.
pub async fn route_guard(request: Request, next: Next) -> Response {
    let has_token = extract_token(request.headers()).is_some();
    match decide(request.uri().path(), has_token) {
        GuardDecision::Continue => next.run(request).await,
        GuardDecision::Redirect(target) => {
            debug!(path = request.uri().path(), target, "route guard redirect");
            redirect_for(request.method(), target).into_response()
        }
    }
}

/// 307 keeps the method, so only safe requests get it; anything else is sent
/// on with 303 and arrives as a GET.
fn redirect_for(method: &Method, target: &str) -> Redirect {
    if method == Method::GET || method == Method::HEAD {
        Redirect::temporary(target)
    } else {
        Redirect::to(target)
    }
}
