//! # Authgate (session-aware front end)
//!
//! `authgate` serves a small set of pages in front of an external auth backend
//! and ships the client-side helper those pages (and the CLI) use to talk to it.
//!
//! ## Token flow
//!
//! 1. **Login:** credentials are posted to `/api/auth/login`; a returned `token`
//!    is persisted in a [`client::TokenStore`].
//! 2. **Requests:** every authorized call goes through the bearer interceptor,
//!    which adds `Authorization: Bearer <token>` while a token is stored.
//! 3. **Logout:** the store is cleared first, then `/api/auth/logout` is called
//!    best-effort.
//!
//! The server keeps the token in the `token` cookie; the CLI keeps it in a file.
//!
//! ## Route guard
//!
//! [`web::guard`] only checks for the presence of a token. It never validates
//! signatures or expiry; the backend remains the authority.

pub mod cli;
pub mod client;
pub mod web;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
