//! # Log Content Codec
//!
//! Stored log content is UTF-8 JSON: an array of objects with exactly the
//! string fields `message` and `timestamp`, in append order.
//!
//! Empty or whitespace-only content decodes to an empty log. Anything else
//! that fails to decode is an error. Objects with additional fields are
//! rejected too, since re-encoding would drop those fields.

use crate::error::CodecError;
use crate::record::LogRecord;

/// Decode stored content into records.
pub fn decode_records(raw: &[u8]) -> Result<Vec<LogRecord>, CodecError> {
    let text = std::str::from_utf8(raw)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text)?)
}

/// Encode records as compact JSON.
pub fn encode_records(records: &[LogRecord]) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(message: &str, timestamp: &str) -> LogRecord {
        LogRecord {
            message: message.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn blank_content_is_an_empty_log() {
        assert!(decode_records(b"").unwrap().is_empty());
        assert!(decode_records(b"  \n\t ").unwrap().is_empty());
        assert!(decode_records(b"[]").unwrap().is_empty());
    }

    #[test]
    fn encodes_compact_array_in_order() {
        let records = vec![
            record("hi", "2024-03-01T00:00:00"),
            record("bye", "2024-03-02T00:00:00"),
        ];
        let encoded = encode_records(&records).unwrap();
        assert_eq!(
            std::str::from_utf8(&encoded).unwrap(),
            r#"[{"message":"hi","timestamp":"2024-03-01T00:00:00"},{"message":"bye","timestamp":"2024-03-02T00:00:00"}]"#
        );
    }

    #[test]
    fn decodes_spaced_layout_with_legacy_timestamps() {
        // Spaced separators and microsecond timestamps, as older logs were written.
        let raw = br#"[{"message": "hello", "timestamp": "2023-09-04 18:22:01.123456"}]"#;
        let records = decode_records(raw).unwrap();
        assert_eq!(records, vec![record("hello", "2023-09-04 18:22:01.123456")]);
    }

    #[test]
    fn rejects_non_array_content() {
        assert!(matches!(decode_records(b"{}"), Err(CodecError::Json(_))));
        assert!(matches!(decode_records(b"not json"), Err(CodecError::Json(_))));
        assert!(matches!(decode_records(b"[1, 2]"), Err(CodecError::Json(_))));
    }

    #[test]
    fn rejects_records_with_missing_or_extra_fields() {
        assert!(decode_records(br#"[{"message":"hi"}]"#).is_err());
        assert!(decode_records(br#"[{"message":"hi","timestamp":"t","from":"+1"}]"#).is_err());
        assert!(decode_records(br#"[{"message":1,"timestamp":"t"}]"#).is_err());
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            decode_records(&[b'[', 0xff, b']']),
            Err(CodecError::Utf8(_))
        ));
    }

    #[test]
    fn unicode_and_escapes_survive() {
        let records = vec![record("caf\u{e9} \"quoted\"\n\u{1f600}", "2024-03-01T00:00:00")];
        let decoded = decode_records(&encode_records(&records).unwrap()).unwrap();
        assert_eq!(decoded, records);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(entries in prop::collection::vec((".*", "[0-9T:. -]{0,26}"), 1..20)) {
            let records: Vec<LogRecord> = entries
                .iter()
                .map(|(m, t)| record(m, t))
                .collect();
            let decoded = decode_records(&encode_records(&records).unwrap()).unwrap();
            prop_assert_eq!(decoded, records);
        }
    }
}
