//! Top-level error type shared across crates.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("email is empty")]
    EmptyEmail,

    #[error("serialization error: {0}")]
    Serialization(String),
}
