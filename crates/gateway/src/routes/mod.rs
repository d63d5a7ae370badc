//! Request routing
//!
//! Every request goes through a single entry point that classifies it into a
//! [`RequestIntent`] and dispatches on it. Magnet links are taken verbatim
//! from the path because their colons and query string would otherwise be
//! split up like ordinary path segments.

mod session;
mod torrent;

#[cfg(test)]
mod router_tests;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};

use crate::{
    auth::{AuthMode, Liveness},
    error::ApiResult,
    pages,
    state::AppState,
};

/// What a request asks the gateway to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestIntent {
    /// `POST /api/login`
    Login,
    /// `/logout`
    Logout,
    /// `/auth`
    ShowAuthPage,
    /// `/`
    ShowHomePage,
    /// Anything else: the raw torrent identifier from the path
    AddTorrent(String),
}

impl RequestIntent {
    pub fn classify(method: &Method, uri: &Uri) -> Self {
        let path = uri.path();

        if let Some(magnet) = path.strip_prefix('/').filter(|p| p.starts_with("magnet:")) {
            let identifier = match uri.query() {
                Some(query) => format!("{}?{}", magnet, query),
                None => magnet.to_string(),
            };
            return RequestIntent::AddTorrent(identifier);
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["api", "login", ..] if method == Method::POST => RequestIntent::Login,
            ["logout", ..] => RequestIntent::Logout,
            ["auth", ..] => RequestIntent::ShowAuthPage,
            [] => RequestIntent::ShowHomePage,
            [first, ..] => RequestIntent::AddTorrent(first.to_string()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestIntent::Login => "login",
            RequestIntent::Logout => "logout",
            RequestIntent::ShowAuthPage => "show_auth_page",
            RequestIntent::ShowHomePage => "show_home_page",
            RequestIntent::AddTorrent(_) => "add_torrent",
        }
    }
}

/// Build the gateway router
pub fn create_router(state: AppState) -> Router {
    Router::new().fallback(handle_request).with_state(state)
}

async fn handle_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let intent = RequestIntent::classify(&method, &uri);
    tracing::debug!(method = %method, path = %uri.path(), intent = intent.label(), "Routing request");

    match dispatch(&state, intent, &headers, &body).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn dispatch(
    state: &AppState,
    intent: RequestIntent,
    headers: &HeaderMap,
    body: &[u8],
) -> ApiResult<Response> {
    let signer = state.signer()?;

    match intent {
        RequestIntent::Login => session::login(state, signer, body).await,
        RequestIntent::Logout => Ok(session::logout()),
        RequestIntent::ShowAuthPage => Ok(Html(pages::auth_page()).into_response()),
        RequestIntent::ShowHomePage => {
            let resolver = state.auth_resolver(signer);
            if let AuthMode::CookieSession = resolver.mode() {
                resolver.resolve(headers, Liveness::Probe).await?;
            }
            Ok(Html(pages::home_page()).into_response())
        }
        RequestIntent::AddTorrent(identifier) => {
            torrent::add_torrent(state, &state.auth_resolver(signer), headers, &identifier).await
        }
    }
}

/// 302 Found to `location`
pub(crate) fn redirect(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location)],
        "Redirecting...",
    )
        .into_response()
}
