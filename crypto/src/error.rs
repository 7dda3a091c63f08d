use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("shared secret is empty")]
    EmptySecret,

    #[error("payload is not valid base64: {0}")]
    Encoding(String),

    #[error("payload truncated: expected at least {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid KDF parameters: {0}")]
    KdfParams(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("encryption failed")]
    Encryption,

    #[error("decryption failed: wrong secret or corrupted payload")]
    Decryption,

    #[error("decrypted payload is not UTF-8")]
    NotUtf8,
}
