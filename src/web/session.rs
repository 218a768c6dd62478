//! Token extraction and cookie helpers for the front end.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};
use secrecy::{ExposeSecret, SecretString};

pub const TOKEN_COOKIE_NAME: &str = "token";

/// Cookie attributes shared by the set and clear paths.
#[derive(Clone, Copy, Debug)]
pub struct CookiePolicy {
    pub secure: bool,
    pub ttl_seconds: u64,
}

/// Finds the session token: the `token` cookie first, then the second
/// space-separated part of the `Authorization` header. Empty values count as
/// absent. The header scheme is not checked.
pub fn extract_token(headers: &HeaderMap) -> Option<SecretString> {
    cookie_value(headers, TOKEN_COOKIE_NAME)
        .or_else(|| authorization_token(headers))
        .map(SecretString::from)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let Some(key) = parts.next() else {
                continue;
            };
            if key.trim() != name {
                continue;
            }
            let val = parts.next().unwrap_or_default().trim();
            if !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

fn authorization_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}

/// Build an `HttpOnly` cookie carrying the session token.
pub fn token_cookie(
    policy: CookiePolicy,
    token: &SecretString,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{TOKEN_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token.expose_secret(),
        policy.ttl_seconds
    );
    if policy.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub fn clear_token_cookie(policy: CookiePolicy) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{TOKEN_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if policy.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
