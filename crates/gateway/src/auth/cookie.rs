//! The client-facing `auth` cookie

use axum::http::{header::COOKIE, HeaderMap};

use super::signer::{SignedToken, TOKEN_TTL_MS};

pub const AUTH_COOKIE_NAME: &str = "auth";

/// Cookie lifetime in seconds, matching the token lifetime
pub const AUTH_COOKIE_MAX_AGE: i64 = TOKEN_TTL_MS / 1000;

/// Extract the `auth` token from the request's `Cookie` header(s)
pub fn extract_auth_token(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", AUTH_COOKIE_NAME);

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()))
        .map(String::from)
}

/// `Set-Cookie` value issuing a freshly minted token
pub fn set_auth_cookie(token: &SignedToken) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Max-Age={}; Path=/",
        AUTH_COOKIE_NAME, token, AUTH_COOKIE_MAX_AGE
    )
}

/// `Set-Cookie` value instructing the client to discard its token
pub fn clear_auth_cookie() -> String {
    format!(
        "{}=; HttpOnly; Secure; SameSite=Strict; Max-Age=0; Path=/",
        AUTH_COOKIE_NAME
    )
}
