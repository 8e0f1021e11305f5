// Record trait for anything stored as an ordered collection under one key

use serde::{Deserialize, Serialize};

/// Core trait that any storable record must implement
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + 'static {
    /// Unique identifier for this record within its collection
    fn id(&self) -> &str;

    /// Collection name for this record type (e.g., "tasks")
    /// Used as the default backend key for the whole collection
    fn collection_name() -> &'static str
    where
        Self: Sized;
}

impl Record for crate::models::Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "tasks"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestRecord {
        id: String,
        name: String,
    }

    impl Record for TestRecord {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "test"
        }
    }

    #[test]
    fn test_record_trait_implementation() {
        let record = TestRecord {
            id: "test-1".to_string(),
            name: "Test".to_string(),
        };

        assert_eq!(record.id(), "test-1");
        assert_eq!(record.name, "Test");
        assert_eq!(TestRecord::collection_name(), "test");
    }

    #[test]
    fn test_task_collection_name() {
        assert_eq!(crate::models::Task::collection_name(), "tasks");
    }
}
