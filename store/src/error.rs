use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage query timed out after {0} ms")]
    Timeout(u64),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored record is corrupted: {0}")]
    Corruption(String),
}

impl StoreError {
    /// Whether the failure is about reaching the store rather than its data.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}
