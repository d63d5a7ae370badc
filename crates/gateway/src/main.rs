//! qBittorrent Gateway Server

use std::net::SocketAddr;

use qbit_gateway::{create_router, AppState, Config};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,qbit_gateway=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting qBittorrent Gateway v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");

    let addr: SocketAddr = config.bind_address.parse()?;
    let state = AppState::new(config)?;
    tracing::info!(auth_mode = state.auth_mode().label(), "Auth mode selected");

    let app = create_router(state).layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
