//! Example 03: Backends and Failure Handling
//!
//! This example shows the same list stored in SQLite, a write that fails
//! because of a storage quota, and recovery from a corrupt blob.
//!
//! Run with: cargo run --example 03_backends

use eyre::Result;
use tasklist::{MemoryBackend, Outcome, SqliteBackend, TaskDraft, TaskStore};

fn main() -> Result<()> {
    println!("tasklist Backends Example");
    println!("=========================\n");

    // SQLITE: the blob lives in a key-value table
    println!("1. SQLITE - Storing tasks in SQLite...");
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("tasklist.db");
    {
        let mut store = TaskStore::open(SqliteBackend::open(&db_path)?)?;
        store.add(TaskDraft::new("Persisted in SQLite"))?.into_saved()?;
    }
    let store = TaskStore::open(SqliteBackend::open(&db_path)?)?;
    println!("   Reopened with {} task(s)\n", store.len());

    // QUOTA: the write fails, the change stays in memory
    println!("2. QUOTA - Writing past a 64 byte quota...");
    let mut store = TaskStore::open(MemoryBackend::with_quota(64))?;
    match store.add(TaskDraft::new("This task will not fit in the quota"))? {
        Outcome::Applied(_) => println!("   Saved"),
        Outcome::Unsaved(task, err) => {
            println!("   '{}' kept in memory only", task.title);
            println!("   Error: {}", err);
        }
        Outcome::NotFound => println!("   Not found"),
    }
    println!("   In memory: {} task(s)\n", store.len());

    // CORRUPT: explicit reset instead of silently losing data
    println!("3. CORRUPT - Opening a damaged blob...");
    let mut backend = MemoryBackend::new();
    backend.insert_raw("tasks", "[{\"title\": \"no id\"");
    match TaskStore::open(backend.clone()) {
        Ok(_) => println!("   Unexpectedly opened"),
        Err(err) => println!("   open() failed: {} ({})", err, err.code()),
    }
    let (store, reset) = TaskStore::open_or_reset(backend, "tasks")?;
    if let Some(err) = reset {
        println!("   open_or_reset() started empty after: {}", err.code());
    }
    println!("   Tasks: {}\n", store.len());

    println!("Example complete!");
    Ok(())
}
