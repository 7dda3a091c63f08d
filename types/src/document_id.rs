//! 12-byte document identifier, as assigned by the document store.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 12-byte document identifier.
///
/// The textual form is exactly 24 hex characters. Parsing accepts either case;
/// display is always lowercase.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId([u8; 12]);

impl DocumentId {
    /// Length of the textual (hex) form.
    pub const HEX_LEN: usize = 24;

    pub fn new(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }

    /// Parse the 24-character hex form.
    pub fn parse_hex(s: &str) -> Result<Self, TypesError> {
        if s.len() != Self::HEX_LEN {
            return Err(TypesError::InvalidDocumentId(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }
        let mut out = [0u8; 12];
        hex::decode_to_slice(s, &mut out)
            .map_err(|e| TypesError::InvalidDocumentId(format!("{s:?}: {e}")))?;
        Ok(Self(out))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for DocumentId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.to_hex())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
