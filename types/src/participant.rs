//! The participant record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Attendance, DocumentId, EventRef, TypesError};

/// A registered event participant, as stored in the `participants` collection.
///
/// Field order is the canonical serialization order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub name: String,
    pub registration_number: String,
    pub contact_number: String,
    /// Stored lowercase and trimmed by the registration flow.
    pub email: String,
    pub event_id: EventRef,
    pub attendance: Attendance,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    pub const COLLECTION: &'static str = "participants";

    /// Compact JSON in canonical field order.
    pub fn to_canonical_json(&self) -> Result<String, TypesError> {
        serde_json::to_string(self).map_err(|e| TypesError::Serialization(e.to_string()))
    }
}
