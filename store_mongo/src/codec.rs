//! Translation between participant types and BSON documents.

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};

use proshow_store::ParticipantFilter;
use proshow_types::{Attendance, DocumentId, EventRef, Participant};

use crate::MongoStoreError;

/// `{ email, $or: [ {eventId: raw}, {eventId: ObjectId(..)} ] }`.
///
/// The identifier alternative is present only when the input parsed as one.
pub fn filter_document(filter: &ParticipantFilter) -> Document {
    let mut alternatives = vec![doc! { "eventId": filter.event.raw.as_str() }];
    if let Some(id) = filter.event.document {
        alternatives.push(doc! { "eventId": ObjectId::from_bytes(*id.as_bytes()) });
    }
    doc! {
        "email": filter.email.as_str(),
        "$or": alternatives,
    }
}

/// Oldest record first; `_id` breaks ties.
pub fn sort_document() -> Document {
    doc! { "createdAt": 1, "_id": 1 }
}

/// Decode candidates returned oldest first.
///
/// The first candidate is the one a lookup answers with, so its failure is
/// fatal. A later one is only a duplicate: if it is unreadable it is skipped
/// with a warning rather than failing the whole lookup.
pub fn decode_candidates(docs: &[Document]) -> Result<Vec<Participant>, MongoStoreError> {
    let Some((first, rest)) = docs.split_first() else {
        return Ok(Vec::new());
    };
    let mut out = vec![decode_participant(first)?];
    for doc in rest {
        match decode_participant(doc) {
            Ok(p) => out.push(p),
            Err(e) => {
                tracing::warn!(id = ?doc.get("_id"), error = %e, "skipping unreadable duplicate");
            }
        }
    }
    Ok(out)
}

pub fn decode_participant(doc: &Document) -> Result<Participant, MongoStoreError> {
    let id = match doc.get("_id") {
        Some(Bson::ObjectId(oid)) => Some(DocumentId::new(oid.bytes())),
        _ => None,
    };

    let event_id = match doc.get("eventId") {
        Some(Bson::ObjectId(oid)) => EventRef::Document(DocumentId::new(oid.bytes())),
        Some(Bson::String(s)) => EventRef::Text(s.clone()),
        Some(Bson::Null) | None => return Err(MongoStoreError::MissingField("eventId")),
        Some(other) => {
            return Err(MongoStoreError::UnexpectedType {
                field: "eventId",
                found: format!("{:?}", other.element_type()),
            })
        }
    };

    let attendance = match doc.get("attendance") {
        Some(Bson::String(s)) => Attendance::from(s.as_str()),
        _ => Attendance::default(),
    };

    // Legacy rows without a creation time sort first, at the epoch.
    let created_at = match doc.get("createdAt") {
        Some(Bson::DateTime(dt)) => {
            DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis()).unwrap_or_default()
        }
        Some(Bson::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default(),
        _ => DateTime::<Utc>::default(),
    };

    Ok(Participant {
        id,
        name: required_str(doc, "name")?,
        registration_number: required_str(doc, "registrationNumber")?,
        contact_number: required_str(doc, "contactNumber")?,
        email: required_str(doc, "email")?,
        event_id,
        attendance,
        created_at,
    })
}

fn required_str(doc: &Document, field: &'static str) -> Result<String, MongoStoreError> {
    match doc.get(field) {
        Some(Bson::String(s)) => Ok(s.clone()),
        Some(Bson::Null) | None => Err(MongoStoreError::MissingField(field)),
        Some(other) => Err(MongoStoreError::UnexpectedType {
            field,
            found: format!("{:?}", other.element_type()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime as BsonDateTime;
    use proshow_store::EventMatch;
    use proshow_types::NormalizedEmail;

    const HEX: &str = "65a1f0c2b3d4e5f601234567";

    fn stored(event_id: Bson) -> Document {
        doc! {
            "_id": ObjectId::parse_str("65a1f0c2b3d4e5f6012345ff").unwrap(),
            "name": "Jane",
            "registrationNumber": "23BCE0001",
            "contactNumber": "9999999999",
            "email": "jane@x.com",
            "eventId": event_id,
            "attendance": "present",
            "createdAt": BsonDateTime::from_millis(1_738_405_800_000),
        }
    }

    #[test]
    fn filter_with_text_input_has_single_alternative() {
        let filter = ParticipantFilter::new(
            NormalizedEmail::parse("JANE@x.com ").unwrap(),
            EventMatch::from_input("evt1"),
        );
        assert_eq!(
            filter_document(&filter),
            doc! { "email": "jane@x.com", "$or": [ { "eventId": "evt1" } ] }
        );
    }

    #[test]
    fn filter_with_identifier_input_has_both_alternatives() {
        let filter = ParticipantFilter::new(
            NormalizedEmail::parse("jane@x.com").unwrap(),
            EventMatch::from_input(HEX),
        );
        assert_eq!(
            filter_document(&filter),
            doc! {
                "email": "jane@x.com",
                "$or": [
                    { "eventId": HEX },
                    { "eventId": ObjectId::parse_str(HEX).unwrap() },
                ],
            }
        );
    }

    #[test]
    fn decodes_string_event_id() {
        let p = decode_participant(&stored(Bson::String("evt1".into()))).unwrap();
        assert_eq!(p.event_id, EventRef::Text("evt1".into()));
        assert_eq!(p.name, "Jane");
        assert_eq!(p.attendance, Attendance::Present);
        assert_eq!(p.created_at.timestamp_millis(), 1_738_405_800_000);
        assert_eq!(p.id.unwrap().to_hex(), "65a1f0c2b3d4e5f6012345ff");
    }

    #[test]
    fn decodes_object_id_event_id() {
        let oid = ObjectId::parse_str(HEX).unwrap();
        let p = decode_participant(&stored(Bson::ObjectId(oid))).unwrap();
        assert_eq!(p.event_id, EventRef::Document(DocumentId::parse_hex(HEX).unwrap()));
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let mut d = stored(Bson::String("evt1".into()));
        d.remove("attendance");
        d.remove("createdAt");
        let p = decode_participant(&d).unwrap();
        assert_eq!(p.attendance, Attendance::Absent);
        assert_eq!(p.created_at.timestamp(), 0);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let mut d = stored(Bson::String("evt1".into()));
        d.remove("registrationNumber");
        assert!(matches!(
            decode_participant(&d),
            Err(MongoStoreError::MissingField("registrationNumber"))
        ));
    }

    #[test]
    fn numeric_event_id_is_unexpected() {
        let d = stored(Bson::Int32(7));
        assert!(matches!(
            decode_participant(&d),
            Err(MongoStoreError::UnexpectedType { field: "eventId", .. })
        ));
    }

    #[test]
    fn unreadable_duplicate_is_skipped() {
        let good = stored(Bson::String("evt1".into()));
        let mut broken = stored(Bson::String("evt1".into()));
        broken.remove("name");
        let decoded = decode_candidates(&[good, broken]).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].name, "Jane");
    }

    #[test]
    fn unreadable_first_candidate_fails() {
        let good = stored(Bson::String("evt1".into()));
        let mut broken = stored(Bson::String("evt1".into()));
        broken.remove("name");
        assert!(matches!(
            decode_candidates(&[broken, good]),
            Err(MongoStoreError::MissingField("name"))
        ));
        assert!(decode_candidates(&[]).unwrap().is_empty());
    }
}
