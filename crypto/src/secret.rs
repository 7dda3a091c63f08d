//! The pre-shared secret used to seal and open payloads.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CryptoError;

/// Secret bytes shared between this service and the dashboard.
///
/// Zeroized on drop and redacted from `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    /// Generate a random 32-byte secret, rendered as 64 hex characters.
    ///
    /// Only used for throwaway secrets in development mode.
    pub fn generate_ephemeral() -> Self {
        use rand::RngCore;
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let text: String = raw.iter().map(|b| format!("{:02x}", b)).collect();
        raw.zeroize();
        Self(text.into_bytes())
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&str> for SharedSecret {
    type Error = CryptoError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s.as_bytes().to_vec())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_rejected() {
        assert_eq!(SharedSecret::new(Vec::new()).unwrap_err(), CryptoError::EmptySecret);
        assert!(SharedSecret::try_from("").is_err());
    }

    #[test]
    fn debug_is_redacted() {
        let secret = SharedSecret::try_from("supersecret").unwrap();
        let shown = format!("{secret:?}");
        assert!(!shown.contains("supersecret"));
    }

    #[test]
    fn ephemeral_secrets_differ() {
        let a = SharedSecret::generate_ephemeral();
        let b = SharedSecret::generate_ephemeral();
        assert_eq!(a.expose().len(), 64);
        assert_ne!(a.expose(), b.expose());
    }
}
