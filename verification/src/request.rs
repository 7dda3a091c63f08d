//! Inbound verification request and its validation.

use serde::Deserialize;

use proshow_store::{EventMatch, ParticipantFilter};
use proshow_types::NormalizedEmail;

use crate::VerificationError;

pub const MISSING_FIELDS_MESSAGE: &str = "Email and Event ID are required";

/// Request body as the dashboard sends it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerificationRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "eventId")]
    pub event_id: Option<String>,
}

impl VerificationRequest {
    pub fn new(email: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            event_id: Some(event_id.into()),
        }
    }

    /// Build the store filter. Absent and empty fields are both rejected;
    /// an email of only whitespace counts as empty.
    pub fn into_filter(self) -> Result<ParticipantFilter, VerificationError> {
        let missing = || VerificationError::InvalidRequest(MISSING_FIELDS_MESSAGE.to_string());

        let email = self.email.filter(|e| !e.is_empty()).ok_or_else(missing)?;
        let event_id = self.event_id.filter(|e| !e.is_empty()).ok_or_else(missing)?;
        let email = NormalizedEmail::parse(&email).map_err(|_| missing())?;

        Ok(ParticipantFilter::new(email, EventMatch::from_input(&event_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_invalid(r: Result<ParticipantFilter, VerificationError>) -> bool {
        matches!(r, Err(VerificationError::InvalidRequest(ref m)) if m == MISSING_FIELDS_MESSAGE)
    }

    #[test]
    fn both_fields_present() {
        let filter = VerificationRequest::new(" JANE@x.com", "evt1").into_filter().unwrap();
        assert_eq!(filter.email.as_str(), "jane@x.com");
        assert_eq!(filter.event.raw, "evt1");
        assert!(filter.event.document.is_none());
    }

    #[test]
    fn absent_fields_rejected() {
        let no_email = VerificationRequest {
            email: None,
            event_id: Some("evt1".into()),
        };
        let no_event = VerificationRequest {
            email: Some("jane@x.com".into()),
            event_id: None,
        };
        assert!(is_invalid(no_email.into_filter()));
        assert!(is_invalid(no_event.into_filter()));
        assert!(is_invalid(VerificationRequest::default().into_filter()));
    }

    #[test]
    fn empty_fields_rejected() {
        assert!(is_invalid(VerificationRequest::new("", "evt1").into_filter()));
        assert!(is_invalid(VerificationRequest::new("jane@x.com", "").into_filter()));
        assert!(is_invalid(VerificationRequest::new("   ", "evt1").into_filter()));
    }

    #[test]
    fn event_id_is_not_trimmed() {
        let filter = VerificationRequest::new("jane@x.com", " evt1").into_filter().unwrap();
        assert_eq!(filter.event.raw, " evt1");
    }
}
