use axum::{
    Form,
    extract::Extension,
    http::StatusCode,
    response::{Redirect, Response, IntoResponse},
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{CredentialsForm, form_error_status};
use crate::client::RegisterCredentials;
use crate::web::{pages::FormState, state::AppState};

pub const REGISTER_REDIRECT: &str = "/login?registered=1";

pub async fn register_page(state: Extension<Arc<AppState>>) -> Response {
    state.pages().register(StatusCode::OK, &FormState::default())
}

#[instrument(skip_all)]
pub async fn register(
    state: Extension<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let email = match form.validate() {
        Ok(email) => email,
        Err(message) => {
            return state.pages().register(
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
    match client
        .register(&RegisterCredentials::new(email.clone(), form.password))
        .await
    {
        Ok(_) => {
            info!("account registered");
            Redirect::to(REGISTER_REDIRECT).into_response()
        }
        Err(err) => {
            warn!("Registration failed: {err}");
            state.pages().register(
                form_error_status(&err),
                &FormState {
                    email,
                    error: Some(err.message().to_string()),
                    notice: None,
                },
            )
        }
    }
}
