//! Example 02: Filtering
//!
//! This example demonstrates combining a text search with status and
//! priority filters. Filtering never reorders: results keep list order.
//!
//! Run with: cargo run --example 02_filtering

use eyre::Result;
use tasklist::{MemoryBackend, Priority, PriorityFilter, StatusFilter, TaskDraft, TaskQuery, TaskStore};

fn main() -> Result<()> {
    println!("tasklist Filtering Example");
    println!("==========================\n");

    let mut store = TaskStore::open(MemoryBackend::new())?;

    let drafts = vec![
        TaskDraft::new("Write documentation").description("API reference"),
        TaskDraft::new("Fix critical bug").priority(Priority::High),
        TaskDraft::new("Code review").description("docs PR").priority(Priority::Low),
        TaskDraft::new("Deploy release").priority(Priority::High),
    ];
    for draft in drafts {
        store.add(draft)?.into_saved()?;
    }

    // Complete the bug fix
    let bug = store
        .filter(&TaskQuery::all().search("bug"))
        .first()
        .map(|task| task.id.clone());
    if let Some(id) = bug {
        store.toggle_completion(&id).into_saved()?;
    }

    let queries = vec![
        ("All tasks", TaskQuery::all()),
        ("Search 'doc' (title or description)", TaskQuery::all().search("DOC")),
        ("Pending only", TaskQuery::all().status(StatusFilter::Pending)),
        ("Completed only", TaskQuery::all().status(StatusFilter::Completed)),
        ("High priority", TaskQuery::all().priority(PriorityFilter::High)),
        (
            "Pending + high priority",
            TaskQuery::all().status(StatusFilter::Pending).priority(Priority::High),
        ),
    ];

    for (label, query) in queries {
        let found = store.filter(&query);
        println!("{} ({} found):", label, found.len());
        for task in found {
            println!("   - {} [{}]{}", task.title, task.priority, if task.completed { " done" } else { "" });
        }
        println!();
    }

    println!("Example complete!");
    Ok(())
}
