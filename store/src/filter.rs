//! Lookup filter for participant records.

use proshow_types::{DocumentId, EventRef, NormalizedEmail, Participant};

/// Accepts a stored `eventId` in either of its two encodings.
///
/// `raw` always matches a text-encoded reference. `document` is present only
/// when the caller's input parsed as a document identifier; if it did not,
/// the identifier alternative is left out and the raw comparison still applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMatch {
    pub raw: String,
    pub document: Option<DocumentId>,
}

impl EventMatch {
    pub fn from_input(input: &str) -> Self {
        Self {
            raw: input.to_string(),
            document: DocumentId::parse_hex(input).ok(),
        }
    }

    pub fn matches(&self, stored: &EventRef) -> bool {
        match stored {
            EventRef::Text(s) => *s == self.raw,
            EventRef::Document(id) => self.document.as_ref() == Some(id),
        }
    }
}

/// `email == <normalized>` AND (`eventId == raw` OR `eventId == document`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantFilter {
    pub email: NormalizedEmail,
    pub event: EventMatch,
}

impl ParticipantFilter {
    pub fn new(email: NormalizedEmail, event: EventMatch) -> Self {
        Self { email, event }
    }

    /// Reference semantics that every backend must reproduce.
    ///
    /// Stored emails are compared as-is: the store keeps them normalized.
    pub fn matches(&self, participant: &Participant) -> bool {
        participant.email == self.email.as_str() && self.event.matches(&participant.event_id)
    }
}
