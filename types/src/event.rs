//! Reference from a participant to its event.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::DocumentId;

/// The stored form of a participant's `eventId`.
///
/// Legacy records hold the event reference either as a plain string or as a
/// 12-byte document identifier. Both render to the same JSON string, so a
/// serialized record does not reveal which encoding the store used.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventRef {
    Text(String),
    Document(DocumentId),
}

impl EventRef {
    /// The textual form: the raw string, or the hex form of the identifier.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Document(id) => id.to_hex(),
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Document(id) => write!(f, "{id}"),
        }
    }
}

impl From<DocumentId> for EventRef {
    fn from(id: DocumentId) -> Self {
        Self::Document(id)
    }
}

impl From<&str> for EventRef {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl Serialize for EventRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_encodings_render_as_strings() {
        let text = EventRef::from("evt1");
        let doc = EventRef::from(DocumentId::new([1; 12]));
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"evt1\"");
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            "\"010101010101010101010101\""
        );
        assert!(doc.is_document());
        assert!(!text.is_document());
    }
}
