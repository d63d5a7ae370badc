//! Sign-in and sign-out

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    auth::{clear_auth_cookie, set_auth_cookie, CredentialSigner},
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

/// Log in to the upstream with the submitted credentials and hand the
/// resulting session back to the client inside a signed `auth` cookie
pub(super) async fn login(
    state: &AppState,
    signer: &CredentialSigner,
    body: &[u8],
) -> ApiResult<Response> {
    let upstream = state.upstream()?;

    let missing_fields = || ApiError::BadRequest("Username and password required".to_string());
    let request: LoginRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Unparseable login body");
        missing_fields()
    })?;

    let (username, password) = match (request.username, request.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => return Err(missing_fields()),
    };

    let credential = upstream
        .login(&username, &password)
        .await
        .map_err(|e| ApiError::Authentication(e.to_string()))?;

    let token = signer.mint(&credential);
    tracing::info!(cookie_name = %credential.name(), "Issued auth cookie");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, set_auth_cookie(&token))],
        "Authentication successful",
    )
        .into_response())
}

/// Clear the `auth` cookie and send the client home
pub(super) fn logout() -> Response {
    let mut response = super::redirect("/");
    if let Ok(value) = clear_auth_cookie().parse() {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}
