use thiserror::Error;

use proshow_store::StoreError;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no valid session")]
    Unauthenticated,

    #[error("participant store unavailable: {0}")]
    StorageUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl VerificationError {
    /// Stable label, used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Unauthenticated => "unauthenticated",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for VerificationError {
    fn from(e: StoreError) -> Self {
        if e.is_unavailable() {
            VerificationError::StorageUnavailable(e.to_string())
        } else {
            VerificationError::Internal(e.to_string())
        }
    }
}

impl From<proshow_crypto::CryptoError> for VerificationError {
    fn from(e: proshow_crypto::CryptoError) -> Self {
        VerificationError::Internal(format!("sealing failed: {e}"))
    }
}

impl From<proshow_types::TypesError> for VerificationError {
    fn from(e: proshow_types::TypesError) -> Self {
        VerificationError::Internal(e.to_string())
    }
}
