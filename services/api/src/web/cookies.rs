//! services/api/src/web/cookies.rs
//!
//! Cookie and bearer-token helpers shared by the handlers and middleware.

use axum::http::{header, HeaderMap};

pub const ADMIN_SESSION_COOKIE: &str = "admin_session";
pub const VISITOR_COOKIE: &str = "visitor_id";

/// Visitor cookies live for a year; the visitor registry never forgets ids.
pub const VISITOR_COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

/// Reads a named cookie from the request headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (key, value) = c.trim().split_once('=')?;
            (key == name).then_some(value.trim())
        })
        .filter(|value| !value.is_empty())
}

/// Reads `Authorization: Bearer <token>`.
pub fn read_bearer(headers: &HeaderMap) -> Option<&str> {
    let text = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let prefix = text.get(..7)?;
    if !prefix.eq_ignore_ascii_case("bearer ") {
        return None;
    }
    let token = text.get(7..)?.trim();
    (!token.is_empty()).then_some(token)
}

/// The admin token from the bearer header, falling back to the session cookie.
/// An explicit header wins so a leftover cookie cannot mask it.
pub fn admin_token(headers: &HeaderMap) -> Option<&str> {
    read_bearer(headers).or_else(|| read_cookie(headers, ADMIN_SESSION_COOKIE))
}

/// Builds a `Set-Cookie` value. A `max_age_secs` of zero clears the cookie.
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { " Secure;" } else { "" };
    format!("{name}={value}; HttpOnly;{secure} SameSite=Lax; Path=/; Max-Age={max_age_secs}")
}
