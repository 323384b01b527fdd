//! Session cookie helpers

use axum::http::{HeaderMap, header::COOKIE};
use cookie::{Cookie, SameSite};
use time::Duration;

pub const SESSION_COOKIE_NAME: &str = "sacco_session";

const COOKIE_PATH: &str = "/";

/// `Set-Cookie` value carrying a fresh session token
pub fn build_session_cookie(token: &str, ttl_hours: i64, secure: bool) -> String {
    let mut builder = Cookie::build((SESSION_COOKIE_NAME, token.to_owned()))
        .path(COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(ttl_hours));

    if secure {
        builder = builder.secure(true);
    }

    builder.build().to_string()
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    let mut builder = Cookie::build(SESSION_COOKIE_NAME)
        .path(COOKIE_PATH)
        .http_only(true)
        .same_site(SameSite::Lax)
        .removal();

    if secure {
        builder = builder.secure(true);
    }

    builder.build().to_string()
}

pub(crate) fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for raw in headers.get_all(COOKIE) {
        let Ok(raw) = raw.to_str() else { continue };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == name && !cookie.value().is_empty() {
                return Some(cookie.value().to_owned());
            }
        }
    }
    None
}

pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie(headers, SESSION_COOKIE_NAME)
}
