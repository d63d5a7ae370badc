//! Application state

use reqwest::Client;
use std::sync::Arc;

use crate::{
    auth::{AuthMode, AuthResolver, CredentialSigner},
    config::Config,
    error::{ApiError, ApiResult},
    upstream::UpstreamClient,
};

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Cookie signer; absent when SECRET_KEY is not configured
    signer: Option<CredentialSigner>,
    /// Upstream API client; absent when API_BASE_URL is not configured
    upstream: Option<UpstreamClient>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let signer = match &config.secret_key {
            Some(secret) => Some(CredentialSigner::new(secret.as_bytes())?),
            None => {
                tracing::warn!("SECRET_KEY not configured - every request will fail with 500");
                None
            }
        };

        // Shared HTTP client for all upstream calls (no cookie store; the
        // upstream session travels explicitly with each request)
        let http_client = Client::new();

        let upstream = match &config.api_base_url {
            Some(base_url) => {
                tracing::info!(base_url = %base_url, "Upstream API configured");
                Some(UpstreamClient::new(http_client, base_url.clone()))
            }
            None => {
                tracing::warn!("API_BASE_URL not configured - login and torrent adds will fail");
                None
            }
        };

        if config.has_static_credentials() {
            tracing::info!("Static upstream credentials configured - sign-in page not required");
        } else if config.api_username.is_some() || config.api_password.is_some() {
            tracing::warn!(
                "API_USERNAME/API_PASSWORD ignored: static mode needs API_BASE_URL, API_USERNAME and API_PASSWORD"
            );
        }

        Ok(Self {
            config: Arc::new(config),
            signer,
            upstream,
        })
    }

    pub fn signer(&self) -> ApiResult<&CredentialSigner> {
        self.signer
            .as_ref()
            .ok_or(ApiError::Configuration("SECRET_KEY"))
    }

    pub fn upstream(&self) -> ApiResult<&UpstreamClient> {
        self.upstream
            .as_ref()
            .ok_or(ApiError::Configuration("API_BASE_URL"))
    }

    /// Auth mode for the current request, derived from configuration
    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::from_config(&self.config)
    }

    /// Get the resolver used by protected intents
    pub fn auth_resolver<'a>(&'a self, signer: &'a CredentialSigner) -> AuthResolver<'a> {
        AuthResolver::new(self.auth_mode(), signer, self.upstream.as_ref())
    }
}
