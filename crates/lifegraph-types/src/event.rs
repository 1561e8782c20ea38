//! Event types: what agents submit, what the store accepts, and what the
//! dashboard reads back.
//!
//! An event is keyed by the tuple (`source`, `context`, `timestamp`). The
//! `metadata` payload is held as raw JSON text, so key order, whitespace
//! and number precision survive storage byte for byte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use ts_rs::TS;

/// Stored payload for an event submitted without `metadata`.
pub const EMPTY_METADATA: &str = "{}";

/// A persisted event as returned by the query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Producing category, e.g. `git` or `fitness`.
    pub source: String,
    /// Free-form qualifier within the source (may be empty).
    pub context: String,
    /// The moment the activity occurred, normalized to UTC.
    pub timestamp: DateTime<Utc>,
    /// Opaque payload, returned exactly as it was submitted.
    #[ts(type = "unknown")]
    pub metadata: Box<RawValue>,
    /// When the store accepted the event.
    pub created_at: DateTime<Utc>,
}

/// One element of a `POST /api/contributions` batch, before validation.
///
/// Every field is optional at the wire level so that a single bad element
/// is skipped rather than rejecting the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventSubmission {
    /// Producing category. Required and non-empty to be accepted.
    #[serde(default)]
    pub source: Option<String>,
    /// Sub-label. Missing or `null` is stored as an empty string.
    #[serde(default)]
    pub context: Option<String>,
    /// Date-time text. Required and parseable to be accepted.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Opaque payload. `None` only when the field is absent; an explicit
    /// `null` is kept as the raw text `null`.
    #[serde(default, deserialize_with = "present")]
    #[ts(type = "unknown")]
    pub metadata: Option<Box<RawValue>>,
}

/// Deserialize a field that is present, including a literal `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// A validated event ready for insertion.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Non-empty source.
    pub source: String,
    /// Context, empty when none was given.
    pub context: String,
    /// Parsed timestamp in UTC.
    pub timestamp: DateTime<Utc>,
    /// Raw payload, `None` when the submission had no `metadata` field.
    pub metadata: Option<Box<RawValue>>,
}

impl NewEvent {
    /// The payload text to store, [`EMPTY_METADATA`] when none was given.
    pub fn metadata_json(&self) -> &str {
        self.metadata.as_deref().map_or(EMPTY_METADATA, RawValue::get)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn submission_tolerates_missing_fields() {
        let raw = r#"[{"source":"git"},{},{"context":null}]"#;
        let batch: Vec<EventSubmission> = serde_json::from_str(raw).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].source.as_deref(), Some("git"));
        assert!(batch[0].timestamp.is_none());
        assert!(batch[1].source.is_none());
        assert!(batch[1].metadata.is_none());
        assert!(batch[2].context.is_none());
        assert!(batch[2].metadata.is_none());
    }

    #[test]
    fn submission_keeps_metadata_text_verbatim() {
        let raw = r#"{"source":"git","metadata":{"z":1,"a":123456789012345678901234567890}}"#;
        let sub: EventSubmission = serde_json::from_str(raw).unwrap();
        assert_eq!(
            sub.metadata.unwrap().get(),
            r#"{"z":1,"a":123456789012345678901234567890}"#
        );
    }

    #[test]
    fn explicit_null_metadata_is_present() {
        let sub: EventSubmission = serde_json::from_str(r#"{"metadata":null}"#).unwrap();
        assert_eq!(sub.metadata.unwrap().get(), "null");
    }

    #[test]
    fn new_event_defaults_metadata_to_empty_object() {
        let event = NewEvent {
            source: "git".to_owned(),
            context: String::new(),
            timestamp: Utc::now(),
            metadata: None,
        };
        assert_eq!(event.metadata_json(), EMPTY_METADATA);
    }

    #[test]
    fn event_serializes_timestamp_as_rfc3339() {
        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let event = Event {
            source: "fitness".to_owned(),
            context: String::new(),
            timestamp: ts,
            metadata: RawValue::from_string(r#"{"b":2,"a":1}"#.to_owned()).unwrap(),
            created_at: ts,
        };
        let text = serde_json::to_string(&event).unwrap();
        assert!(text.contains(r#""metadata":{"b":2,"a":1}"#));

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
        assert_eq!(json["context"], "");
    }
}
