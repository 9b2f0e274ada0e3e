//! Extraction engine: raw backend JSON to canonical clinical records.
//!
//! Every transform is a pure function of the raw item and an `ExtractionContext`.
//! Missing fields degrade to defaults; only structural faults (wrong JSON shape
//! where a mapping or sequence is required) reject an item, and a rejected item
//! never aborts its batch.

pub mod evolution;
pub mod exam;
pub mod fields;
pub mod prescription;
pub mod vitals;

pub use evolution::*;
pub use exam::*;
pub use prescription::*;
pub use vitals::*;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Record is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },

    #[error("Required section missing: {0}")]
    MissingSection(&'static str),

    #[error("Section {section} has the wrong shape (expected {expected}, found {found})")]
    InvalidSection {
        section: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

/// Request-scoped inputs shared by every item of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionContext {
    /// Patient identifier used in the request; fallback for records lacking one.
    pub patient_id: String,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractionContext {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self::at(patient_id, Utc::now())
    }

    pub fn at(patient_id: impl Into<String>, extracted_at: DateTime<Utc>) -> Self {
        Self {
            patient_id: patient_id.into(),
            extracted_at,
        }
    }

    /// Extraction timestamp in RFC 3339 form.
    pub fn timestamp(&self) -> String {
        self.extracted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Result of transforming one raw item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome<T> {
    Extracted(T),
    Skipped { index: usize, reason: ExtractionError },
}

impl<T> ItemOutcome<T> {
    pub fn from_result(index: usize, result: Result<T, ExtractionError>) -> Self {
        match result {
            Ok(record) => ItemOutcome::Extracted(record),
            Err(reason) => ItemOutcome::Skipped { index, reason },
        }
    }

    pub fn into_record(self) -> Option<T> {
        match self {
            ItemOutcome::Extracted(record) => Some(record),
            ItemOutcome::Skipped { .. } => None,
        }
    }
}

/// Transform every raw item in order, dropping the ones that fail.
pub fn extract_batch<T, F>(kind: &str, items: &[Value], mut transform: F) -> Vec<T>
where
    F: FnMut(usize, &Value) -> Result<T, ExtractionError>,
{
    let outcomes = items
        .iter()
        .enumerate()
        .map(|(index, raw)| ItemOutcome::from_result(index, transform(index, raw)));
    collect_extracted(kind, outcomes)
}

/// Fold outcomes into records, logging each skipped item.
pub fn collect_extracted<T>(kind: &str, outcomes: impl IntoIterator<Item = ItemOutcome<T>>) -> Vec<T> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for outcome in outcomes {
        match outcome {
            ItemOutcome::Extracted(record) => records.push(record),
            ItemOutcome::Skipped { index, reason } => {
                skipped += 1;
                tracing::warn!(kind, index, error = %reason, "Skipping malformed record");
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(kind, extracted = records.len(), skipped, "Batch extracted with skips");
    }
    records
}

/// Require the raw item to be a JSON object.
pub(crate) fn require_object(raw: &Value) -> Result<&serde_json::Map<String, Value>, ExtractionError> {
    raw.as_object().ok_or(ExtractionError::NotAnObject {
        found: fields::type_name(raw),
    })
}

/// Optional nested mapping: missing or null is fine, any other non-object is a fault.
pub(crate) fn optional_object<'a>(
    raw: &'a Value,
    section: &'static str,
) -> Result<Option<&'a Value>, ExtractionError> {
    match raw.get(section) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if value.is_object() => Ok(Some(value)),
        Some(other) => Err(ExtractionError::InvalidSection {
            section,
            expected: "object",
            found: fields::type_name(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn batch_preserves_order_and_drops_failures() {
        let items = vec![json!(1), json!("bad"), json!(3)];
        let out = extract_batch("numbers", &items, |_, raw| {
            raw.as_i64().ok_or(ExtractionError::NotAnObject { found: "string" })
        });
        assert_eq!(out, vec![1, 3]);
    }

    #[test]
    fn transform_receives_raw_index() {
        let items = vec![json!("a"), json!("b")];
        let out = extract_batch("letters", &items, |index, _| Ok(index));
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn outcome_from_result() {
        let ok: ItemOutcome<u8> = ItemOutcome::from_result(0, Ok(5));
        assert_eq!(ok.into_record(), Some(5));

        let skipped: ItemOutcome<u8> =
            ItemOutcome::from_result(2, Err(ExtractionError::MissingSection("status")));
        assert_eq!(
            skipped,
            ItemOutcome::Skipped {
                index: 2,
                reason: ExtractionError::MissingSection("status")
            }
        );
        assert_eq!(skipped.into_record(), None);
    }

    #[test]
    fn optional_object_shapes() {
        let raw = json!({"ok": {}, "bad": "x"});
        assert!(optional_object(&raw, "ok").unwrap().is_some());
        assert!(optional_object(&raw, "missing").unwrap().is_none());
        assert_eq!(
            optional_object(&raw, "bad").unwrap_err(),
            ExtractionError::InvalidSection {
                section: "bad",
                expected: "object",
                found: "string"
            }
        );
    }

    #[test]
    fn require_object_reports_type() {
        assert_eq!(
            require_object(&json!([1])).unwrap_err(),
            ExtractionError::NotAnObject { found: "array" }
        );
    }

    #[test]
    fn context_timestamp_is_rfc3339() {
        let at = Utc.with_ymd_and_hms(2025, 9, 2, 0, 36, 41).unwrap();
        let ctx = ExtractionContext::at("40380", at);
        assert_eq!(ctx.timestamp(), "2025-09-02T00:36:41.000Z");
    }
}
