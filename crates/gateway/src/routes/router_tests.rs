//! End-to-end tests for the gateway router
//!
//! Tests cover:
//! - Static-credential mode (login per request, add, partial success)
//! - Cookie-session mode (redirects, liveness probe on the home page)
//! - Login/logout cookie issuance
//! - Configuration errors

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use mockito::{Matcher, Server};
use std::time::Duration;
use tower::ServiceExt;

use super::create_router;
use crate::{
    auth::{CredentialSigner, UpstreamCredential},
    config::Config,
    state::AppState,
};

const SECRET: &str = "router-test-secret";
const HASH: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

fn cookie_mode_config(base_url: Option<String>) -> Config {
    Config {
        secret_key: Some(SECRET.to_string()),
        api_base_url: base_url,
        api_username: None,
        api_password: None,
        bind_address: "127.0.0.1:0".to_string(),
        files_fetch_delay: Duration::ZERO,
    }
}

fn static_mode_config(base_url: String) -> Config {
    Config {
        api_username: Some("admin".to_string()),
        api_password: Some("adminadmin".to_string()),
        ..cookie_mode_config(Some(base_url))
    }
}

fn app(config: Config) -> Router {
    create_router(AppState::new(config).unwrap())
}

fn auth_cookie_for(cred: &UpstreamCredential) -> String {
    let token = CredentialSigner::new(SECRET.as_bytes()).unwrap().mint(cred);
    format!("auth={}", token)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_login(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn mock_login(server: &mut Server, set_cookie: &str) -> mockito::Mock {
    server
        .mock("POST", "/api/v2/auth/login")
        .with_status(200)
        .with_header("set-cookie", set_cookie)
        .with_body("Ok.")
        .create_async()
        .await
}

// =========================================================================
// Static-credential mode
// =========================================================================

#[tokio::test]
async fn test_static_mode_add_infohash_success() {
    let mut server = Server::new_async().await;
    let login = mock_login(&mut server, "SID=static-session; HttpOnly; path=/").await;
    let add = server
        .mock("POST", "/api/v2/torrents/add")
        .match_header("cookie", "SID=static-session")
        .match_body(Matcher::Regex(format!("magnet:\\?xt=urn:btih:{}", HASH)))
        .with_status(200)
        .with_body("Ok.")
        .create_async()
        .await;
    let files = server
        .mock("GET", "/api/v2/torrents/files")
        .match_query(Matcher::UrlEncoded("hash".into(), HASH.into()))
        .match_header("cookie", "SID=static-session")
        .with_status(200)
        .with_body(r#"[{"name":"ubuntu-24.04.iso","size":1536,"progress":0}]"#)
        .create_async()
        .await;

    let (status, _, body) = send(app(static_mode_config(server.url())), get(&format!("/{}", HASH))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("infohash: {}", HASH)));
    assert!(body.contains("status: success"));
    assert!(body.contains("ubuntu-24.04.iso <code>1.5 KB</code>"));
    login.assert_async().await;
    add.assert_async().await;
    files.assert_async().await;
}

#[tokio::test]
async fn test_static_mode_partial_success() {
    let mut server = Server::new_async().await;
    mock_login(&mut server, "SID=s").await;
    server
        .mock("POST", "/api/v2/torrents/add")
        .with_status(500)
        .with_body("Torrent could not be added")
        .create_async()
        .await;
    server
        .mock("GET", "/api/v2/torrents/files")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let (status, _, body) = send(app(static_mode_config(server.url())), get(&format!("/{}", HASH))).await;

    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert!(body.contains("status: partial_success"));
    assert!(body.contains("api_error: API returned 500: Torrent could not be added"));
}

#[tokio::test]
async fn test_static_mode_login_failure_is_server_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v2/auth/login")
        .with_status(403)
        .create_async()
        .await;

    let (status, headers, body) = send(app(static_mode_config(server.url())), get(&format!("/{}", HASH))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers.get(header::LOCATION).is_none());
    assert_eq!(body, "Failed to authenticate with qBittorrent: 403");
}

#[tokio::test]
async fn test_static_mode_home_needs_no_cookie_or_upstream() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("POST", "/api/v2/auth/login")
        .expect(0)
        .create_async()
        .await;

    let (status, _, body) = send(app(static_mode_config(server.url())), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Add Magnet Link"));
    upstream.assert_async().await;
}

#[tokio::test]
async fn test_raw_magnet_path_relayed_verbatim() {
    let mut server = Server::new_async().await;
    mock_login(&mut server, "SID=s").await;
    let add = server
        .mock("POST", "/api/v2/torrents/add")
        .match_body(Matcher::Regex(format!(
            "magnet:\\?xt=urn:btih:{}&dn=Ubuntu%20ISO",
            HASH.to_uppercase()
        )))
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v2/torrents/files")
        .match_query(Matcher::UrlEncoded("hash".into(), HASH.into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let uri = format!("/magnet:?xt=urn:btih:{}&dn=Ubuntu%20ISO", HASH.to_uppercase());
    let (status, _, body) = send(app(static_mode_config(server.url())), get(&uri)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!("infohash: {}", HASH)));
    add.assert_async().await;
}

#[tokio::test]
async fn test_unknown_infohash_skips_file_listing() {
    let mut server = Server::new_async().await;
    mock_login(&mut server, "SID=s").await;
    server
        .mock("POST", "/api/v2/torrents/add")
        .with_status(200)
        .create_async()
        .await;
    let files = server
        .mock("GET", "/api/v2/torrents/files")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (status, _, body) = send(app(static_mode_config(server.url())), get("/not-a-hash")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("infohash: unknown"));
    files.assert_async().await;
}

// =========================================================================
// Cookie-session mode
// =========================================================================

#[tokio::test]
async fn test_cookie_mode_home_without_cookie_redirects() {
    let (status, headers, _) = send(app(cookie_mode_config(None)), get("/")).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/auth");
}

#[tokio::test]
async fn test_cookie_mode_add_without_cookie_redirects() {
    let server = Server::new_async().await;
    let (status, headers, _) =
        send(app(cookie_mode_config(Some(server.url()))), get(&format!("/{}", HASH))).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/auth");
}

#[tokio::test]
async fn test_cookie_mode_tampered_cookie_redirects() {
    let cred = UpstreamCredential::new("SID", "abc").unwrap();
    let mut cookie = auth_cookie_for(&cred);
    cookie.push('0');

    let (status, headers, _) = send(app(cookie_mode_config(None)), get_with_cookie("/", &cookie)).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/auth");
}

#[tokio::test]
async fn test_cookie_mode_home_with_live_session() {
    let mut server = Server::new_async().await;
    let probe = server
        .mock("GET", "/api/v2/app/version")
        .match_header("cookie", "sid=visitor")
        .with_status(200)
        .with_body("v4.6.2")
        .create_async()
        .await;

    let cred = UpstreamCredential::new("sid", "visitor").unwrap();
    let (status, _, body) = send(
        app(cookie_mode_config(Some(server.url()))),
        get_with_cookie("/", &format!("theme=dark; {}", auth_cookie_for(&cred))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Add Magnet Link"));
    probe.assert_async().await;
}

#[tokio::test]
async fn test_cookie_mode_home_with_expired_upstream_session() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v2/app/version")
        .with_status(403)
        .with_body("Forbidden")
        .create_async()
        .await;

    let cred = UpstreamCredential::new("SID", "stale").unwrap();
    let (status, headers, _) = send(
        app(cookie_mode_config(Some(server.url()))),
        get_with_cookie("/", &auth_cookie_for(&cred)),
    )
    .await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/auth");
}

#[tokio::test]
async fn test_cookie_mode_add_uses_embedded_session_without_probe() {
    let mut server = Server::new_async().await;
    let probe = server
        .mock("GET", "/api/v2/app/version")
        .expect(0)
        .create_async()
        .await;
    let add = server
        .mock("POST", "/api/v2/torrents/add")
        .match_header("cookie", "sid=visitor")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v2/torrents/files")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let cred = UpstreamCredential::new("sid", "visitor").unwrap();
    let (status, _, body) = send(
        app(cookie_mode_config(Some(server.url()))),
        get_with_cookie(&format!("/{}", HASH), &auth_cookie_for(&cred)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("status: success"));
    add.assert_async().await;
    probe.assert_async().await;
}

#[tokio::test]
async fn test_cookie_mode_add_without_base_url() {
    let cred = UpstreamCredential::new("SID", "abc").unwrap();
    let (status, _, body) = send(
        app(cookie_mode_config(None)),
        get_with_cookie(&format!("/{}", HASH), &auth_cookie_for(&cred)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Server configuration error: API_BASE_URL required");
}

#[tokio::test]
async fn test_auth_page_always_served() {
    let (status, headers, body) = send(app(cookie_mode_config(None)), get("/auth")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(body.contains("Sign In"));
}

// =========================================================================
// Login / logout
// =========================================================================

#[tokio::test]
async fn test_login_issues_signed_cookie() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/api/v2/auth/login")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "visitor".into()),
            Matcher::UrlEncoded("password".into(), "pw".into()),
        ]))
        .with_status(200)
        .with_header("set-cookie", "sid=bbb; path=/")
        .with_header("set-cookie", "SID=AAA; path=/")
        .create_async()
        .await;

    let (status, headers, body) = send(
        app(cookie_mode_config(Some(server.url()))),
        post_login(r#"{"username":"visitor","password":"pw"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Authentication successful");
    login.assert_async().await;

    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.ends_with("; HttpOnly; Secure; SameSite=Strict; Max-Age=31536000; Path=/"));

    let token = set_cookie
        .strip_prefix("auth=")
        .and_then(|rest| rest.split(';').next())
        .unwrap();
    let signer = CredentialSigner::new(SECRET.as_bytes()).unwrap();
    let cred = signer.verify(Some(token)).unwrap();
    assert_eq!(cred.name(), "SID");
    assert_eq!(cred.value(), "AAA");
}

#[tokio::test]
async fn test_login_rejected_by_upstream() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v2/auth/login")
        .with_status(401)
        .create_async()
        .await;

    let (status, headers, body) = send(
        app(cookie_mode_config(Some(server.url()))),
        post_login(r#"{"username":"visitor","password":"wrong"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert_eq!(
        body,
        "Failed to verify credentials: Failed to authenticate with qBittorrent: 401"
    );
}

#[tokio::test]
async fn test_login_missing_fields() {
    let server = Server::new_async().await;

    for body in [
        r#"{"username":"visitor"}"#,
        r#"{"username":"","password":"pw"}"#,
        "{}",
        "not json",
    ] {
        let (status, _, text) = send(app(cookie_mode_config(Some(server.url()))), post_login(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(text, "Username and password required");
    }
}

#[tokio::test]
async fn test_login_without_base_url() {
    let (status, _, body) = send(
        app(cookie_mode_config(None)),
        post_login(r#"{"username":"visitor","password":"pw"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Server configuration error: API_BASE_URL required");
}

#[tokio::test]
async fn test_login_cookie_then_add() {
    let mut server = Server::new_async().await;
    mock_login(&mut server, "SID=from-login; HttpOnly").await;
    let add = server
        .mock("POST", "/api/v2/torrents/add")
        .match_header("cookie", "SID=from-login")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v2/torrents/files")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let app = app(cookie_mode_config(Some(server.url())));
    let (_, headers, _) = send(
        app.clone(),
        post_login(r#"{"username":"visitor","password":"pw"}"#),
    )
    .await;
    let cookie = headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let (status, _, _) = send(app, get_with_cookie(&format!("/{}", HASH), &cookie)).await;

    assert_eq!(status, StatusCode::OK);
    add.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (status, headers, _) = send(app(cookie_mode_config(None)), get("/logout")).await;

    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "/");
    assert_eq!(
        headers[header::SET_COOKIE],
        "auth=; HttpOnly; Secure; SameSite=Strict; Max-Age=0; Path=/"
    );
}

// =========================================================================
// Configuration
// =========================================================================

#[tokio::test]
async fn test_missing_secret_fails_every_intent() {
    let config = Config {
        secret_key: None,
        ..cookie_mode_config(None)
    };
    let app = app(config);

    for uri in ["/", "/auth", "/logout", "/deadbeef"] {
        let (status, headers, body) = send(app.clone(), get(uri)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "uri {}", uri);
        assert_eq!(
            headers[header::CONTENT_TYPE],
            "text/plain"
        );
        assert_eq!(body, "Server configuration error: SECRET_KEY required");
    }
}
