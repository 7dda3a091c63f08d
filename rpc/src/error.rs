//! RPC error types and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use proshow_utils::CorrelationId;
use proshow_verification::VerificationError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    /// Outcome label recorded in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Verification(e) => e.kind(),
            Self::MalformedBody(_) => "invalid_request",
            _ => "internal",
        }
    }
}

impl From<std::io::Error> for RpcError {
    fn from(e: std::io::Error) -> Self {
        RpcError::Server(e.to_string())
    }
}

impl From<proshow_crypto::CryptoError> for RpcError {
    fn from(e: proshow_crypto::CryptoError) -> Self {
        RpcError::Config(e.to_string())
    }
}

/// Generic 500 body. The detail only goes to the log, under the same id.
pub(crate) fn internal_error_response(detail: &dyn std::fmt::Display) -> Response {
    let correlation_id = CorrelationId::new();
    tracing::error!(%correlation_id, error = %detail, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "message": "Internal server error",
            "correlationId": correlation_id,
        })),
    )
        .into_response()
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RpcError::Verification(VerificationError::InvalidRequest(m)) => {
                (StatusCode::BAD_REQUEST, m.clone())
            }
            RpcError::MalformedBody(_) => {
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            RpcError::Verification(VerificationError::Unauthenticated) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            _ => return internal_error_response(&self),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_labels() {
        assert_eq!(RpcError::MalformedBody("x".into()).kind(), "invalid_request");
        assert_eq!(
            RpcError::from(VerificationError::Unauthenticated).kind(),
            "unauthenticated"
        );
        assert_eq!(
            RpcError::from(VerificationError::StorageUnavailable("down".into())).kind(),
            "storage_unavailable"
        );
        assert_eq!(RpcError::Server("bind".into()).kind(), "internal");
    }

    #[test]
    fn status_codes() {
        let status = |e: RpcError| e.into_response().status();
        assert_eq!(
            status(VerificationError::InvalidRequest("m".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(RpcError::MalformedBody("eof".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(VerificationError::Unauthenticated.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(VerificationError::StorageUnavailable("down".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(VerificationError::Internal("boom".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
