//! Per-request resolution of an upstream session credential

use axum::http::HeaderMap;

use super::{cookie::extract_auth_token, credential::UpstreamCredential, signer::CredentialSigner};
use crate::config::Config;
use crate::upstream::UpstreamClient;

/// How a request earns an upstream credential
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Single-tenant deployment: the operator configured a fixed upstream
    /// login, used on every request
    StaticCredentials { username: String, password: String },
    /// Multi-visitor deployment: trust comes from the signed `auth` cookie
    CookieSession,
}

impl AuthMode {
    pub fn from_config(config: &Config) -> Self {
        match (&config.api_base_url, &config.api_username, &config.api_password) {
            (Some(_), Some(username), Some(password)) => AuthMode::StaticCredentials {
                username: username.clone(),
                password: password.clone(),
            },
            _ => AuthMode::CookieSession,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthMode::StaticCredentials { .. } => "static_credentials",
            AuthMode::CookieSession => "cookie_session",
        }
    }
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a cookie-derived credential is re-checked against the upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Skip,
    Probe,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid `auth` cookie, or the upstream no longer accepts its session
    #[error("Authentication required")]
    Unauthenticated,
    #[error("API_BASE_URL is not configured")]
    MissingBaseUrl,
    /// Upstream login failed; carries the upstream-derived message
    #[error("{0}")]
    Upstream(String),
}

/// Resolves the upstream credential for one request
pub struct AuthResolver<'a> {
    mode: AuthMode,
    signer: &'a CredentialSigner,
    upstream: Option<&'a UpstreamClient>,
}

impl<'a> AuthResolver<'a> {
    pub fn new(
        mode: AuthMode,
        signer: &'a CredentialSigner,
        upstream: Option<&'a UpstreamClient>,
    ) -> Self {
        Self {
            mode,
            signer,
            upstream,
        }
    }

    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    pub async fn resolve(
        &self,
        headers: &HeaderMap,
        liveness: Liveness,
    ) -> Result<UpstreamCredential, AuthError> {
        match &self.mode {
            AuthMode::StaticCredentials { username, password } => {
                let upstream = self.upstream.ok_or(AuthError::MissingBaseUrl)?;
                upstream.login(username, password).await
            }
            AuthMode::CookieSession => {
                let token = extract_auth_token(headers);
                let credential = match self.signer.verify(token.as_deref()) {
                    Some(credential) => credential,
                    None => {
                        tracing::debug!(has_cookie = token.is_some(), "No valid auth cookie");
                        return Err(AuthError::Unauthenticated);
                    }
                };

                if liveness == Liveness::Probe {
                    if let Some(upstream) = self.upstream {
                        if !upstream.verify(&credential).await {
                            tracing::info!(
                                cookie_name = %credential.name(),
                                "Signed cookie valid but upstream session expired"
                            );
                            return Err(AuthError::Unauthenticated);
                        }
                    }
                }

                Ok(credential)
            }
        }
    }
}
