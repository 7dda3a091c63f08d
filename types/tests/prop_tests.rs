use proptest::prelude::*;

use proshow_types::{DocumentId, EventRef, NormalizedEmail};

proptest! {
    /// DocumentId: display -> parse yields the same identifier.
    #[test]
    fn document_id_hex_roundtrip(bytes in prop::array::uniform12(0u8..)) {
        let id = DocumentId::new(bytes);
        let parsed = DocumentId::parse_hex(&id.to_string()).unwrap();
        prop_assert_eq!(parsed, id);
    }

    /// DocumentId: parsing never panics, whatever the input.
    #[test]
    fn document_id_parse_never_panics(s in "\\PC{0,40}") {
        let _ = DocumentId::parse_hex(&s);
    }

    /// DocumentId: only 24-character inputs can parse.
    #[test]
    fn document_id_rejects_other_lengths(s in "[0-9a-f]{0,23}|[0-9a-f]{25,40}") {
        prop_assert!(DocumentId::parse_hex(&s).is_err());
    }

    /// Both encodings of the same identifier share one textual form.
    #[test]
    fn event_ref_text_form_agrees(bytes in prop::array::uniform12(0u8..)) {
        let id = DocumentId::new(bytes);
        let as_doc = EventRef::Document(id);
        let as_text = EventRef::Text(id.to_hex());
        prop_assert_eq!(as_doc.to_text(), as_text.to_text());
    }

    /// Normalization is idempotent.
    #[test]
    fn email_normalization_idempotent(raw in "[ \\t]{0,3}[A-Za-z0-9._%+-]{1,20}@[A-Za-z0-9.-]{1,20}[ \\t]{0,3}") {
        let once = NormalizedEmail::parse(&raw).unwrap();
        let twice = NormalizedEmail::parse(once.as_str()).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Case and surrounding whitespace never affect equality.
    #[test]
    fn email_case_and_padding_insensitive(
        local in "[a-z0-9]{1,12}",
        domain in "[a-z]{1,12}\\.com",
        pad in "[ \\t]{0,4}",
    ) {
        let stored = NormalizedEmail::parse(&format!("{local}@{domain}")).unwrap();
        let claimed = NormalizedEmail::parse(&format!("{pad}{}@{}{pad}", local.to_uppercase(), domain.to_uppercase())).unwrap();
        prop_assert_eq!(stored, claimed);
    }
}
