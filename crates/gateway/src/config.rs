//! Gateway configuration loaded from environment variables

use std::time::Duration;

/// Default delay between adding a torrent and listing its files
const DEFAULT_FILES_FETCH_DELAY_MS: u64 = 1000;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Gateway configuration.
///
/// Established once at startup and never modified afterwards. Values the
/// request path cannot do without (`secret_key`, `api_base_url`) stay
/// optional here so their absence is reported per request as a
/// configuration error instead of aborting the process.
#[derive(Clone)]
pub struct Config {
    /// Secret used to sign `auth` cookies (SECRET_KEY)
    pub secret_key: Option<String>,
    /// Base URL of the upstream qBittorrent Web API (API_BASE_URL)
    pub api_base_url: Option<String>,
    /// Operator-supplied upstream username (API_USERNAME)
    pub api_username: Option<String>,
    /// Operator-supplied upstream password (API_PASSWORD)
    pub api_password: Option<String>,
    /// Address the HTTP server binds to (BIND_ADDRESS)
    pub bind_address: String,
    /// Wait before listing files of a freshly added torrent (FILES_FETCH_DELAY_MS)
    pub files_fetch_delay: Duration,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        let files_fetch_delay_ms = match env_opt("FILES_FETCH_DELAY_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                anyhow::anyhow!("FILES_FETCH_DELAY_MS must be a number of milliseconds: {}", e)
            })?,
            None => DEFAULT_FILES_FETCH_DELAY_MS,
        };

        Ok(Self {
            secret_key: env_opt("SECRET_KEY"),
            api_base_url: env_opt("API_BASE_URL"),
            api_username: env_opt("API_USERNAME"),
            api_password: env_opt("API_PASSWORD"),
            bind_address: env_opt("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            files_fetch_delay: Duration::from_millis(files_fetch_delay_ms),
        })
    }

    /// Whether the operator configured a fixed upstream login
    pub fn has_static_credentials(&self) -> bool {
        self.api_base_url.is_some() && self.api_username.is_some() && self.api_password.is_some()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("api_username", &self.api_username)
            .field("api_password", &self.api_password.as_ref().map(|_| "<redacted>"))
            .field("bind_address", &self.bind_address)
            .field("files_fetch_delay", &self.files_fetch_delay)
            .finish()
    }
}

/// Read an environment variable, treating empty values as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
