//! Example 01: Basic Usage
//!
//! This example walks through the task list lifecycle: add, edit, toggle,
//! reorder and delete, re-reading the list after every change the way a
//! UI would.
//!
//! Run with: cargo run --example 01_basic_usage

use eyre::Result;
use tasklist::{FileBackend, Priority, TaskDraft, TaskQuery, TaskStore};

fn main() -> Result<()> {
    // Create a temporary directory for this example
    let temp_dir = tempfile::tempdir()?;

    println!("tasklist Basic Usage Example");
    println!("============================\n");
    println!("Store path: {}\n", temp_dir.path().display());

    let mut store = TaskStore::open(FileBackend::open(temp_dir.path())?)?;

    // ADD: new tasks go to the front
    println!("1. ADD - Adding three tasks...");
    let milk = store
        .add(TaskDraft::new("Buy milk").priority(Priority::High))?
        .into_saved()?
        .ok_or_else(|| eyre::eyre!("add reported not-found"))?;
    store.add(TaskDraft::new("Call the plumber"))?.into_saved()?;
    store
        .add(TaskDraft::new("Read a chapter").priority(Priority::Low))?
        .into_saved()?;
    print_list(&store);

    // Blank titles are rejected before anything changes
    println!("2. VALIDATE - Adding a blank task...");
    match store.add(TaskDraft::new("   ")) {
        Err(err) => println!("   Rejected: {}\n", err),
        Ok(_) => println!("   Unexpectedly accepted!\n"),
    }

    // EDIT: begin_edit loads the task, submit applies the form
    println!("3. EDIT - Renaming '{}'...", milk.title);
    if let Some(task) = store.begin_edit(&milk.id) {
        let draft = TaskDraft::new("Buy oat milk").description(task.description.clone());
        store.submit(draft)?.into_saved()?;
    }
    print_list(&store);

    // TOGGLE
    println!("4. TOGGLE - Completing the milk task...");
    if let Some(task) = store.toggle_completion(&milk.id).into_saved()? {
        println!("   completed = {}, completed_at = {:?}\n", task.completed, task.completed_at);
    }

    // REORDER: move the last task into the first slot
    println!("5. REORDER - Moving the last task to the top...");
    let first = store.tasks()[0].id.clone();
    let last = store.tasks()[store.len() - 1].id.clone();
    if let Some(index) = store.reorder(&last, &first).into_saved()? {
        println!("   Now at position {}", index);
    }
    print_list(&store);

    // DELETE
    println!("6. DELETE - Removing the milk task...");
    if let Some(task) = store.delete(&milk.id).into_saved()? {
        println!("   Deleted '{}'\n", task.title);
    }

    // Reopen from disk to show the list survived
    drop(store);
    let store = TaskStore::open(FileBackend::open(temp_dir.path())?)?;
    println!("7. RELOAD - Reopened store:");
    print_list(&store);

    let stats = store.stats();
    println!("Total: {}, completed: {}, pending: {}", stats.total, stats.completed, stats.pending());
    println!("\nExample complete!");
    Ok(())
}

fn print_list(store: &TaskStore<FileBackend>) {
    for task in store.filter(&TaskQuery::all()) {
        let mark = if task.completed { "x" } else { " " };
        println!("   [{}] {} ({})", mark, task.title, task.priority);
    }
    println!();
}
