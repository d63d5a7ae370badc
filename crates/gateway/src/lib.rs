// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! qBittorrent Gateway Library
//!
//! A stateless edge gateway in front of the qBittorrent Web API. Visitors
//! either ride on operator-configured upstream credentials or sign in once
//! and carry their upstream session inside a signed `auth` cookie.

pub mod auth;
pub mod config;
pub mod error;
pub mod magnet;
pub mod pages;
pub mod routes;
pub mod state;
pub mod upstream;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
