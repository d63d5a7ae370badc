//! Request-level error type

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::auth::AuthError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that end a request.
///
/// Every variant renders as a `text/plain` body. Upstream add-torrent
/// warnings and file-list failures never become an `ApiError`; they are
/// reported in the result page instead.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required configuration value is missing
    #[error("Server configuration error: {0} required")]
    Configuration(&'static str),

    #[error("{0}")]
    BadRequest(String),

    /// Upstream rejected the credentials submitted to the login endpoint
    #[error("Failed to verify credentials: {0}")]
    Authentication(String),

    /// Caller has no usable session; routed back to the sign-in page
    #[error("Authentication required")]
    Unauthenticated,

    /// Operator-configured upstream login failed
    #[error("{0}")]
    StaticLogin(String),

    #[error("Error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::Unauthenticated => StatusCode::FOUND,
            ApiError::StaticLogin(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    /// Map a failed resolution on a protected intent
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => ApiError::Unauthenticated,
            AuthError::MissingBaseUrl => ApiError::Configuration("API_BASE_URL"),
            AuthError::Upstream(message) => ApiError::StaticLogin(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Unauthenticated = self {
            return crate::routes::redirect("/auth");
        }

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain")],
            self.to_string(),
        )
            .into_response()
    }
}
