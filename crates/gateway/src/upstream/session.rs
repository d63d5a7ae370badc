//! Upstream session acquisition and liveness probing

use reqwest::{header::SET_COOKIE, Method};

use super::{UpstreamClient, LOGIN_PATH, VERSION_PATH};
use crate::auth::{AuthError, UpstreamCredential};

/// Session cookie names issued by known upstream deployments, in priority
/// order. Standard qBittorrent uses `SID`; Decypharr uses `sid`.
pub const SESSION_COOKIE_NAMES: &[&str] = &["SID", "sid"];

impl UpstreamClient {
    /// Exchange a username/password for an upstream session cookie
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UpstreamCredential, AuthError> {
        let response = self
            .request(Method::POST, LOGIN_PATH)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Upstream login request failed");
                AuthError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Upstream rejected login");
            return Err(AuthError::Upstream(format!(
                "Failed to authenticate with qBittorrent: {}",
                status.as_u16()
            )));
        }

        let set_cookies: Vec<&str> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        match find_session_cookie(&set_cookies) {
            Some(credential) => {
                tracing::debug!(cookie_name = %credential.name(), "Upstream session acquired");
                Ok(credential)
            }
            None => {
                tracing::warn!("Upstream login succeeded without a session cookie");
                Err(AuthError::Upstream(
                    "No SID/sid cookie returned from qBittorrent".to_string(),
                ))
            }
        }
    }

    /// Check that a session cookie is still accepted by the upstream
    pub async fn verify(&self, credential: &UpstreamCredential) -> bool {
        match self
            .authed(Method::GET, VERSION_PATH, credential)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Upstream session no longer accepted");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upstream liveness probe failed");
                false
            }
        }
    }
}

/// Pick the session cookie out of `Set-Cookie` header values.
///
/// Candidates are tried in [`SESSION_COOKIE_NAMES`] order across all
/// headers, so an uppercase `SID` wins even when a `sid` appears first.
fn find_session_cookie(set_cookies: &[&str]) -> Option<UpstreamCredential> {
    SESSION_COOKIE_NAMES.iter().find_map(|name| {
        set_cookies
            .iter()
            .find_map(|header| cookie_value(header, name))
            .and_then(|value| UpstreamCredential::new(*name, value))
    })
}

/// Value following the first non-empty `{name}=` occurrence, up to `;`
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=", name);
    header.match_indices(&needle).find_map(|(idx, _)| {
        let rest = &header[idx + needle.len()..];
        let value = rest.find(';').map_or(rest, |end| &rest[..end]);
        (!value.is_empty()).then_some(value)
    })
}
