//! Server-rendered pages. Every page extends `base.html`, which includes the
//! navigation bar; the bar switches between the logout button and the
//! login/register links on the `authenticated` flag.

use anyhow::{Context as _, Result};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::error;

const TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("navbar.html", include_str!("../../templates/navbar.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("register.html", include_str!("../../templates/register.html")),
    ("protected.html", include_str!("../../templates/protected.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
];

pub const APP_TITLE: &str = "Authgate";

pub struct Pages {
    tera: Tera,
}

/// Values a form page echoes back after a failed submission.
#[derive(Debug, Default, Serialize)]
pub struct FormState {
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Pages {
    /// Compiles the embedded templates.
    ///
    /// # Errors
    /// Returns an error if a template fails to parse.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .context("Failed to compile page templates")?;
        Ok(Self { tera })
    }

    pub fn home(&self, authenticated: bool) -> Response {
        self.render("home.html", StatusCode::OK, base_context(authenticated))
    }

    pub fn login(&self, status: StatusCode, form: &FormState) -> Response {
        let mut context = base_context(false);
        context.insert("form", form);
        self.render("login.html", status, context)
    }

    pub fn register(&self, status: StatusCode, form: &FormState) -> Response {
        let mut context = base_context(false);
        context.insert("form", form);
        self.render("register.html", status, context)
    }

    /// `email` is `None` when the profile could not be loaded.
    pub fn protected(&self, path: &str, email: Option<&str>) -> Response {
        let mut context = base_context(true);
        context.insert("path", path);
        context.insert("email", &email);
        self.render("protected.html", StatusCode::OK, context)
    }

    pub fn not_found(&self, authenticated: bool, path: &str) -> Response {
        let mut context = base_context(authenticated);
        context.insert("path", path);
        self.render("not_found.html", StatusCode::NOT_FOUND, context)
    }

    fn render(&self, template: &str, status: StatusCode, context: Context) -> Response {
        match self.tera.render(template, &context) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => {
                error!("Failed to render {template}: {err:?}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn base_context(authenticated: bool) -> Context {
    let mut context = Context::new();
    context.insert("app_title", APP_TITLE);
    context.insert("authenticated", &authenticated);
    context
}
