//! Add-torrent flow

use axum::{
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};

use crate::{
    auth::{AuthResolver, Liveness},
    error::ApiResult,
    magnet, pages,
    state::AppState,
    upstream::RelayResult,
};

/// Resolve a credential, add the torrent upstream, then report its files
pub(super) async fn add_torrent(
    state: &AppState,
    resolver: &AuthResolver<'_>,
    headers: &HeaderMap,
    identifier: &str,
) -> ApiResult<Response> {
    let credential = resolver.resolve(headers, Liveness::Skip).await?;
    let upstream = state.upstream()?;

    let magnet = magnet::normalize_identifier(identifier);
    let outcome = upstream.add_torrent(&credential, &magnet).await?;
    let infohash = magnet::extract_infohash(&magnet);

    tracing::info!(
        auth_mode = resolver.mode().label(),
        infohash = infohash.as_deref().unwrap_or("unknown"),
        outcome = ?outcome,
        "Torrent add relayed"
    );

    let files = match &infohash {
        Some(hash) => {
            // Give the upstream a moment to register the torrent
            tokio::time::sleep(state.config.files_fetch_delay).await;
            upstream.torrent_files(&credential, hash).await
        }
        None => Vec::new(),
    };

    let result = RelayResult::new(outcome, infohash, files);
    Ok((result.http_status(), Html(pages::result_page(&result))).into_response())
}
