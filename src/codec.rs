// Blob encoding for an ordered record collection

use crate::record::Record;
use eyre::{Context, Result, eyre};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Encode records as a JSON array, preserving order
pub fn encode<T: Serialize>(records: &[T]) -> Result<String> {
    serde_json::to_string(records).context("Failed to serialize collection")
}

/// Decode a JSON array blob back into records
///
/// Unlike a line-oriented log, a blob is all-or-nothing: any malformed record
/// or a repeated id fails the whole decode instead of being skipped.
pub fn decode<T: Record>(blob: &str) -> Result<Vec<T>> {
    let records: Vec<T> = serde_json::from_str(blob).context("Failed to parse stored collection")?;

    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if !seen.insert(record.id()) {
            return Err(eyre!("Duplicate id '{}' at position {}", record.id(), index));
        }
    }

    debug!(
        collection = T::collection_name(),
        count = records.len(),
        "Decoded collection"
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Task};
    use chrono::{DateTime, NaiveDate};

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            due_date: None,
            priority: Priority::Medium,
            completed: false,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            updated_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_encode_preserves_order() {
        let tasks = vec![task("b", "Second"), task("a", "First")];
        let blob = encode(&tasks).unwrap();

        assert!(blob.starts_with('['));
        assert!(blob.find("\"id\":\"b\"").unwrap() < blob.find("\"id\":\"a\"").unwrap());

        let decoded: Vec<Task> = decode(&blob).unwrap();
        assert_eq!(decoded, tasks);
    }

    #[test]
    fn test_decode_full_record() {
        let mut full = task("x", "Full");
        full.description = "with everything".to_string();
        full.due_date = NaiveDate::from_ymd_opt(2026, 1, 31);
        full.priority = Priority::Low;
        full.completed = true;
        full.updated_at = DateTime::from_timestamp_millis(1_700_000_100_000);
        full.completed_at = DateTime::from_timestamp_millis(1_700_000_200_000);

        let blob = encode(std::slice::from_ref(&full)).unwrap();
        let decoded: Vec<Task> = decode(&blob).unwrap();
        assert_eq!(decoded, vec![full]);
    }

    #[test]
    fn test_decode_empty_array() {
        let decoded: Vec<Task> = decode("[]").unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_null_optionals_as_absent() {
        let blob = r#"[{"id":"a","title":"t","createdAt":"2024-01-01T00:00:00Z","updatedAt":null,"completedAt":null,"date":null}]"#;
        let decoded: Vec<Task> = decode(blob).unwrap();

        assert_eq!(decoded[0].updated_at, None);
        assert_eq!(decoded[0].completed_at, None);
        assert_eq!(decoded[0].due_date, None);

        // Re-encoding drops the nulls entirely
        let blob = encode(&decoded).unwrap();
        assert!(!blob.contains("null"));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(decode::<Task>("{malformed json}").is_err());
        assert!(decode::<Task>(r#"{"id":"a"}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_missing_title() {
        let blob = r#"[{"id":"a","createdAt":"2024-01-01T00:00:00Z"}]"#;
        assert!(decode::<Task>(blob).is_err());
    }

    #[test]
    fn test_decode_rejects_duplicate_ids() {
        let blob = encode(&[task("a", "One"), task("a", "Two")]).unwrap();
        let err = decode::<Task>(&blob).unwrap_err();
        assert!(err.to_string().contains("Duplicate id 'a'"));
    }
}
