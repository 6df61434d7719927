//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use survivor_core::playback::PlaybackError;
use survivor_rollouts::{BridgeError, RepositoryError};

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was well-formed but not acceptable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The operation needs a loaded rollout.
    #[error("no rollout loaded")]
    NoRolloutLoaded,

    /// The rollout repository failed or returned malformed data.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ObserverError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => Self::NotFound(format!("rollout {id}")),
            RepositoryError::InvalidIdentifier(_) => Self::InvalidRequest(e.to_string()),
            RepositoryError::Config(msg) => Self::Internal(msg),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<BridgeError> for ObserverError {
    fn from(e: BridgeError) -> Self {
        let BridgeError::Fetch { source, .. } = e;
        source.into()
    }
}

impl From<PlaybackError> for ObserverError {
    fn from(e: PlaybackError) -> Self {
        match e {
            PlaybackError::IntervalTooShort { .. } => Self::InvalidRequest(e.to_string()),
            PlaybackError::NoRuntime(_) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoRolloutLoaded => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_statuses() {
        let cases = [
            (RepositoryError::NotFound(String::from("g")), StatusCode::NOT_FOUND),
            (
                RepositoryError::InvalidIdentifier(String::from("../g")),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepositoryError::Status {
                    url: String::from("http://x/rollouts/"),
                    status: 500,
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (error, expected) in cases {
            let response = ObserverError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn short_interval_is_a_bad_request() {
        let error = PlaybackError::IntervalTooShort {
            requested: std::time::Duration::from_millis(10),
            minimum: std::time::Duration::from_millis(100),
        };
        let response = ObserverError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
