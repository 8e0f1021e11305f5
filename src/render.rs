// Terminal rendering for tasks and stats

use crate::models::{Priority, Task, TaskStats};
use colored::{ColoredString, Colorize};

/// Length of the id prefix shown in listings
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn priority_badge(priority: Priority) -> ColoredString {
    let label = format!("{} {}", priority.icon(), priority);
    match priority {
        Priority::High => label.as_str().red().bold(),
        Priority::Medium => label.as_str().yellow(),
        Priority::Low => label.as_str().green(),
    }
}

/// Render one task as one or two lines (description goes on the second)
pub fn render_task(task: &Task) -> String {
    let checkbox = if task.completed { "[x]" } else { "[ ]" };
    let title = if task.completed {
        task.title.as_str().dimmed().strikethrough()
    } else {
        task.title.as_str().bold()
    };

    let mut line = format!(
        "{} {} {}  {}",
        checkbox,
        short_id(&task.id).cyan(),
        title,
        priority_badge(task.priority)
    );

    if let Some(date) = task.due_date {
        line.push_str(&format!("  📅 {}", date.format("%d/%m/%Y")));
    }

    if !task.description.is_empty() {
        line.push('\n');
        line.push_str(&format!("      {}", task.description.as_str().dimmed()));
    }

    line
}

/// Render a list of tasks, or an empty-state message
pub fn render_list(tasks: &[&Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".dimmed().to_string();
    }
    tasks.iter().map(|task| render_task(task)).collect::<Vec<_>>().join("\n")
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", count, if count == 1 { singular } else { plural })
}

/// e.g. "3 tasks, 1 completed"
pub fn render_stats(stats: &TaskStats) -> String {
    format!("{}, {} completed", plural(stats.total, "task", "tasks"), stats.completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};

    fn plain() {
        colored::control::set_override(false);
    }

    fn task() -> Task {
        Task {
            id: "0190f3a2-7b1c-7000-8000-000000000000".to_string(),
            title: "Write report".to_string(),
            description: String::new(),
            due_date: None,
            priority: Priority::High,
            completed: false,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            updated_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0190f3a2-7b1c"), "0190f3a2");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("lq2x9k1a"), "lq2x9k1a");
    }

    #[test]
    fn test_render_pending_task() {
        plain();
        let line = render_task(&task());
        assert_eq!(line, "[ ] 0190f3a2 Write report  🔴 high");
    }

    #[test]
    fn test_render_with_date_and_description() {
        plain();
        let mut t = task();
        t.completed = true;
        t.priority = Priority::Low;
        t.due_date = NaiveDate::from_ymd_opt(2026, 3, 9);
        t.description = "Q1 numbers".to_string();

        let rendered = render_task(&t);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[x] 0190f3a2 Write report  🟢 low  📅 09/03/2026");
        assert_eq!(lines[1], "      Q1 numbers");
    }

    #[test]
    fn test_render_empty_list() {
        plain();
        assert_eq!(render_list(&[]), "No tasks found.");
    }

    #[test]
    fn test_render_list_keeps_order() {
        plain();
        let a = task();
        let mut b = task();
        b.id = "ffffffff-0000".to_string();
        b.title = "Second".to_string();

        let rendered = render_list(&[&b, &a]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].contains("Second"));
        assert!(lines[1].contains("Write report"));
    }

    #[test]
    fn test_render_stats_pluralizes() {
        assert_eq!(render_stats(&TaskStats { total: 1, completed: 0 }), "1 task, 0 completed");
        assert_eq!(render_stats(&TaskStats { total: 3, completed: 1 }), "3 tasks, 1 completed");
    }
}
