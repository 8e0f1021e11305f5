// Data models for the task list

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A single unit of work
///
/// Field names on the wire are camelCase and the due date is stored under
/// `date`, so blobs written by the browser version of the app can be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "date", default, with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a fresh pending task from an already validated draft
    pub(crate) fn from_draft(draft: TaskDraft, title: String) -> Self {
        Self {
            id: new_task_id(),
            title,
            description: draft.description.trim().to_string(),
            due_date: draft.due_date,
            priority: draft.priority.unwrap_or_default(),
            completed: false,
            created_at: now(),
            updated_at: None,
            completed_at: None,
        }
    }

    /// Flip completion, keeping `completed_at` in step with `completed`
    pub(crate) fn toggle(&mut self) {
        self.completed = !self.completed;
        self.completed_at = if self.completed { Some(now()) } else { None };
    }

    /// Bring `completed_at` back in line with `completed`, returning true if it changed
    ///
    /// A pending task loses its completion time. A completed task with none
    /// takes its last known timestamp.
    pub(crate) fn reconcile_completion(&mut self) -> bool {
        match (self.completed, self.completed_at) {
            (false, Some(_)) => {
                self.completed_at = None;
                true
            }
            (true, None) => {
                self.completed_at = Some(self.updated_at.unwrap_or(self.created_at));
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "alta")]
    #[value(alias = "alta")]
    High,
    #[default]
    #[serde(alias = "media")]
    #[value(alias = "media")]
    Medium,
    #[serde(alias = "baixa")]
    #[value(alias = "baixa")]
    Low,
}

impl Priority {
    pub fn icon(self) -> &'static str {
        match self {
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Intake data for `add` and `update`, as submitted by a task form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    /// `None` means medium on add and "keep the current value" on update
    pub priority: Option<Priority>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Counts shown next to the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn pending(&self) -> usize {
        self.total - self.completed
    }
}

/// Generate a fresh task id (UUIDv7, so ids also sort by creation time)
pub fn new_task_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Current wall-clock time, truncated to milliseconds to match the stored precision
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Serde adapter for the `date` field: `YYYY-MM-DD`, with `""` and `null` read as absent
mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid date '{}': {}", s, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "task-1".to_string(),
            title: "Buy milk".to_string(),
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
    fn test_reconcile_completion() {
        let mut task = sample();
        assert!(!task.reconcile_completion());

        task.completed_at = DateTime::from_timestamp_millis(1_700_000_500_000);
        assert!(task.reconcile_completion());
        assert_eq!(task.completed_at, None);

        task.completed = true;
        assert!(task.reconcile_completion());
        assert_eq!(task.completed_at, Some(task.created_at));

        task.completed_at = None;
        task.updated_at = DateTime::from_timestamp_millis(1_700_000_900_000);
        assert!(task.reconcile_completion());
        assert_eq!(task.completed_at, task.updated_at);
        assert!(!task.reconcile_completion());
    }

    #[test]
    fn test_now_is_millisecond_precision() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts.timestamp_millis() > 1_600_000_000_000);
    }

    #[test]
    fn test_new_task_id_is_unique() {
        let a = new_task_id();
        let b = new_task_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");

        let p: Priority = serde_json::from_str("\"alta\"").unwrap();
        assert_eq!(p, Priority::High);
        let p: Priority = serde_json::from_str("\"media\"").unwrap();
        assert_eq!(p, Priority::Medium);
        let p: Priority = serde_json::from_str("\"baixa\"").unwrap();
        assert_eq!(p, Priority::Low);
    }

    #[test]
    fn test_priority_from_cli_value() {
        assert_eq!(Priority::from_str("high", true).unwrap(), Priority::High);
        assert_eq!(Priority::from_str("baixa", true).unwrap(), Priority::Low);
        assert!(Priority::from_str("urgent", true).is_err());
    }

    #[test]
    fn test_optional_fields_serialize_as_absent() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("date"));
        assert!(!obj.contains_key("updatedAt"));
        assert!(!obj.contains_key("completedAt"));
        assert_eq!(obj["description"], "");
        assert_eq!(obj["priority"], "medium");
        assert!(obj.contains_key("createdAt"));
    }

    #[test]
    fn test_task_reads_browser_record() {
        let json = r#"{
            "id": "lq2x9k1abc",
            "title": "Estudar",
            "description": "",
            "date": "",
            "priority": "alta",
            "completed": false,
            "createdAt": "2024-03-01T12:30:00.000Z",
            "completedAt": null
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "lq2x9k1abc");
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.completed_at, None);
        assert_eq!(task.updated_at, None);
    }

    #[test]
    fn test_due_date_round_trip() {
        let mut task = sample();
        task.due_date = NaiveDate::from_ymd_opt(2025, 12, 24);

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"date\":\"2025-12-24\""));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_invalid_due_date_rejected() {
        let json = r#"{"id":"a","title":"t","date":"24/12/2025","createdAt":"2024-03-01T12:30:00Z"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn test_toggle_keeps_completed_at_in_step() {
        let mut task = sample();

        task.toggle();
        assert!(task.completed);
        assert!(task.completed_at.is_some());

        task.toggle();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_stats_pending() {
        let stats = TaskStats { total: 5, completed: 2 };
        assert_eq!(stats.pending(), 3);
    }
}
