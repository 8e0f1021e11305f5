// Query filtering for the task list

use crate::models::{Priority, Task};
use clap::ValueEnum;

/// Completion status filter
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    #[default]
    #[value(alias = "todas")]
    All,
    #[value(alias = "pendentes")]
    Pending,
    #[value(alias = "concluidas")]
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

/// Priority filter
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityFilter {
    #[default]
    #[value(alias = "todas")]
    All,
    #[value(alias = "alta")]
    High,
    #[value(alias = "media")]
    Medium,
    #[value(alias = "baixa")]
    Low,
}

impl PriorityFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::High => task.priority == Priority::High,
            PriorityFilter::Medium => task.priority == Priority::Medium,
            PriorityFilter::Low => task.priority == Priority::Low,
        }
    }
}

impl From<Priority> for PriorityFilter {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::High => PriorityFilter::High,
            Priority::Medium => PriorityFilter::Medium,
            Priority::Low => PriorityFilter::Low,
        }
    }
}

/// Filter criteria for listing tasks
///
/// All criteria must hold. The default query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive substring matched against title or description
    pub search: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl TaskQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn priority(mut self, priority: impl Into<PriorityFilter>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Check a single task against every criterion
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_search(task) && self.status.matches(task) && self.priority.matches(task)
    }

    fn matches_search(&self, task: &Task) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
    }
}
