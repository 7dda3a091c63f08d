//! Symmetric sealing of participant records for delivery to the dashboard.
//!
//! - **Argon2id** derives a 256-bit key from the pre-shared secret and a random salt
//! - **AES-256-GCM** encrypts and authenticates the serialized record
//! - The payload is a single base64 string that carries its own salt, nonce and
//!   KDF parameters, so the shared secret alone is enough to open it later

pub mod envelope;
pub mod error;
pub mod secret;

pub use envelope::{open, open_to_string, seal, KdfParams};
pub use error::CryptoError;
pub use secret::SharedSecret;
