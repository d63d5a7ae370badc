//! Client for the upstream qBittorrent Web API
//!
//! Every call carries `Referer` and `Origin` set to the configured base URL;
//! some deployments refuse to issue a session cookie without them.

pub mod session;
pub mod torrents;

use reqwest::{header, Client, Method, RequestBuilder};

use crate::auth::UpstreamCredential;

pub use session::SESSION_COOKIE_NAMES;
pub use torrents::{AddTorrentOutcome, RelayResult, RelayStatus, TorrentFile};

const LOGIN_PATH: &str = "/api/v2/auth/login";
const VERSION_PATH: &str = "/api/v2/app/version";
const ADD_TORRENT_PATH: &str = "/api/v2/torrents/add";
const TORRENT_FILES_PATH: &str = "/api/v2/torrents/files";

/// Handle to one upstream deployment.
///
/// Holds no session state; the credential is passed to each call.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Unauthenticated request with the origin headers set
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(header::REFERER, &self.base_url)
            .header(header::ORIGIN, &self.base_url)
    }

    /// Request authenticated with the upstream session cookie
    fn authed(&self, method: Method, path: &str, credential: &UpstreamCredential) -> RequestBuilder {
        self.request(method, path)
            .header(header::COOKIE, credential.cookie_header())
    }
}
