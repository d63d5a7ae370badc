//! Torrent relay: add a magnet and report its files

use reqwest::{multipart::Form, Method, StatusCode};
use serde::{Deserialize, Serialize};

use super::{UpstreamClient, ADD_TORRENT_PATH, TORRENT_FILES_PATH};
use crate::auth::UpstreamCredential;

/// Result of the upstream add call
#[derive(Debug, Clone, PartialEq)]
pub enum AddTorrentOutcome {
    Added,
    /// Upstream answered with a non-success status. Some implementations
    /// (Decypharr) return 500 yet still add the torrent, so this is a
    /// warning and not an error.
    Warning(String),
}

/// A file inside a torrent, as reported by `/api/v2/torrents/files`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStatus {
    Success,
    PartialSuccess,
}

impl RelayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayStatus::Success => "success",
            RelayStatus::PartialSuccess => "partial_success",
        }
    }
}

/// Outcome of the add-torrent flow, rendered as the result page
#[derive(Debug, Clone)]
pub struct RelayResult {
    pub status: RelayStatus,
    pub message: &'static str,
    /// Lowercased infohash, or `unknown`
    pub infohash: String,
    pub api_error: Option<String>,
    pub files: Vec<TorrentFile>,
}

impl RelayResult {
    pub fn new(outcome: AddTorrentOutcome, infohash: Option<String>, files: Vec<TorrentFile>) -> Self {
        let (status, message, api_error) = match outcome {
            AddTorrentOutcome::Added => (RelayStatus::Success, "Magnet added successfully", None),
            AddTorrentOutcome::Warning(warning) => (
                RelayStatus::PartialSuccess,
                "Magnet add request completed with warnings",
                Some(warning),
            ),
        };

        Self {
            status,
            message,
            infohash: infohash.unwrap_or_else(|| "unknown".to_string()),
            api_error,
            files,
        }
    }

    /// 200 for success, 207 Multi-Status for partial success
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            RelayStatus::Success => StatusCode::OK,
            RelayStatus::PartialSuccess => StatusCode::MULTI_STATUS,
        }
    }
}

impl UpstreamClient {
    /// Submit a magnet URI to the upstream.
    ///
    /// Transport failures are errors; a non-success status is reported as
    /// [`AddTorrentOutcome::Warning`].
    pub async fn add_torrent(
        &self,
        credential: &UpstreamCredential,
        magnet: &str,
    ) -> Result<AddTorrentOutcome, reqwest::Error> {
        let form = Form::new().text("urls", magnet.to_string());

        let response = self
            .authed(Method::POST, ADD_TORRENT_PATH, credential)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(AddTorrentOutcome::Added);
        }

        let body = response.text().await.unwrap_or_default();
        let details = if body.trim().is_empty() {
            "No error details"
        } else {
            body.as_str()
        };

        tracing::warn!(status = %status, "Upstream add-torrent returned an error status");
        Ok(AddTorrentOutcome::Warning(format!(
            "API returned {}: {}",
            status.as_u16(),
            details
        )))
    }

    /// List the files of a torrent. Any failure yields an empty list.
    pub async fn torrent_files(
        &self,
        credential: &UpstreamCredential,
        infohash: &str,
    ) -> Vec<TorrentFile> {
        match self.fetch_torrent_files(credential, infohash).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(infohash = %infohash, error = %e, "Failed to fetch torrent files");
                Vec::new()
            }
        }
    }

    async fn fetch_torrent_files(
        &self,
        credential: &UpstreamCredential,
        infohash: &str,
    ) -> Result<Vec<TorrentFile>, reqwest::Error> {
        self.authed(Method::GET, TORRENT_FILES_PATH, credential)
            .query(&[("hash", infohash)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<TorrentFile>>()
            .await
    }
}
