//! Login form. A successful login moves the backend token into the `token`
//! cookie; the per-request store never outlives the request.

use axum::{
    Form,
    extract::{Extension, Query},
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{CredentialsForm, form_error_status};
use crate::client::LoginCredentials;
use crate::web::{pages::FormState, session::token_cookie, state::AppState};

/// Where a fresh session lands.
pub const LOGIN_REDIRECT: &str = "/protected";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub registered: Option<String>,
}

pub async fn login_page(
    Query(query): Query<LoginQuery>,
    state: Extension<Arc<AppState>>,
) -> Response {
    let notice = query
        .registered
        .is_some()
        .then(|| "Account created. You can log in now.".to_string());
    let form = FormState {
        notice,
        ..FormState::default()
    };
    state.pages().login(StatusCode::OK, &form)
}

#[instrument(skip_all)]
pub async fn login(state: Extension<Arc<AppState>>, Form(form): Form<CredentialsForm>) -> Response {
    let email = match form.validate() {
        Ok(email) => email,
        Err(message) => {
            return state.pages().login(
                StatusCode::UNPROCESSABLE_ENTITY,
                &FormState {
                    email: form.email.trim().to_string(),
                    error: Some(message),
                    notice: None,
                },
            );
        }
    };

    let client = state.auth_client(None);
    let credentials = LoginCredentials::new(email.clone(), form.password);

    if let Err(err) = client.login(&credentials).await {
        warn!("Login failed: {err}");
        return state.pages().login(
            form_error_status(&err),
            &FormState {
                email,
                error: Some(err.message().to_string()),
                notice: None,
            },
        );
    }

    let Some(token) = client.api().store().get() else {
        warn!("Login succeeded without a session token");
        return state.pages().login(
            StatusCode::BAD_GATEWAY,
            &FormState {
                email,
                error: Some("Login did not return a session token".to_string()),
                notice: None,
            },
        );
    };

    match token_cookie(state.config().cookie_policy(), &token) {
        Ok(cookie) => {
            info!("session started");
            ([(SET_COOKIE, cookie)], Redirect::to(LOGIN_REDIRECT)).into_response()
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
