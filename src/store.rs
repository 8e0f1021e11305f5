// Ordered task collection backed by a durable key-value blob

use crate::backend::Backend;
use crate::codec;
use crate::error::StoreError;
use crate::filter::TaskQuery;
use crate::models::{Task, TaskDraft, TaskStats, now};
use crate::record::Record;
use tracing::{debug, info, warn};

/// Result of a mutation that references an existing task
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    /// Change applied and written to the backend
    Applied(T),
    /// Change applied in memory, but the backend write failed
    Unsaved(T, StoreError),
    /// No task with that id; nothing changed
    NotFound,
}

impl<T> Outcome<T> {
    /// True when the change took effect in memory, saved or not
    pub fn is_applied(&self) -> bool {
        !self.is_not_found()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Applied(value) | Outcome::Unsaved(value, _) => Some(value),
            Outcome::NotFound => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Applied(value) | Outcome::Unsaved(value, _) => Some(value),
            Outcome::NotFound => None,
        }
    }

    /// Treat a failed write as an error; `NotFound` becomes `None`
    pub fn into_saved(self) -> Result<Option<T>, StoreError> {
        match self {
            Outcome::Applied(value) => Ok(Some(value)),
            Outcome::Unsaved(_, err) => Err(err),
            Outcome::NotFound => Ok(None),
        }
    }

    pub fn persist_error(&self) -> Option<&StoreError> {
        match self {
            Outcome::Unsaved(_, err) => Some(err),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Applied(value) => Outcome::Applied(f(value)),
            Outcome::Unsaved(value, err) => Outcome::Unsaved(f(value), err),
            Outcome::NotFound => Outcome::NotFound,
        }
    }
}

/// What a form submission turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Added(Task),
    Updated(Task),
}

/// The ordered task collection plus the edit cursor
///
/// Order is display order: new tasks go to the front and only `reorder`
/// moves existing ones. Every mutation writes the whole collection back to
/// the backend before returning.
pub struct TaskStore<B: Backend> {
    backend: B,
    key: String,
    tasks: Vec<Task>,
    editing: Option<String>,
}

impl<B: Backend> TaskStore<B> {
    /// Open a store under the default `tasks` key
    pub fn open(backend: B) -> Result<Self, StoreError> {
        Self::open_with_key(backend, Task::collection_name())
    }

    /// Open a store under `key`, failing on unreadable or corrupt data
    pub fn open_with_key(backend: B, key: &str) -> Result<Self, StoreError> {
        let tasks = Self::load(&backend, key)?;
        info!(key, count = tasks.len(), "Loaded tasks");

        Ok(Self {
            backend,
            key: key.to_string(),
            tasks,
            editing: None,
        })
    }

    /// Open a store, starting empty if the stored blob is corrupt
    ///
    /// The corrupt blob is returned as an error alongside the store and stays
    /// in the backend until the next successful save overwrites it.
    pub fn open_or_reset(backend: B, key: &str) -> Result<(Self, Option<StoreError>), StoreError> {
        let (tasks, reset) = match Self::load(&backend, key) {
            Ok(tasks) => (tasks, None),
            Err(err @ StoreError::Corrupt { .. }) => {
                warn!(key, error = %err, "Stored tasks are corrupt, starting with an empty list");
                (Vec::new(), Some(err))
            }
            Err(err) => return Err(err),
        };

        let store = Self {
            backend,
            key: key.to_string(),
            tasks,
            editing: None,
        };
        Ok((store, reset))
    }

    /// Read and decode the blob under `key`; absent means empty
    fn load(backend: &B, key: &str) -> Result<Vec<Task>, StoreError> {
        let blob = backend.read(key).map_err(|report| StoreError::Unavailable {
            key: key.to_string(),
            report,
        })?;

        let Some(blob) = blob else {
            return Ok(Vec::new());
        };
        let mut tasks: Vec<Task> = codec::decode(&blob).map_err(|report| StoreError::Corrupt {
            key: key.to_string(),
            report,
        })?;

        let repaired = tasks.iter_mut().map(|task| task.reconcile_completion()).filter(|fixed| *fixed).count();
        if repaired > 0 {
            warn!(key, repaired, "Fixed completion timestamps that disagreed with completion state");
        }
        Ok(tasks)
    }

    /// Write the whole collection, replacing whatever was stored
    pub fn save(&mut self) -> Result<(), StoreError> {
        let bytes = codec::encode(&self.tasks)
            .and_then(|blob| self.backend.write(&self.key, &blob).map(|_| blob.len()))
            .map_err(|report| StoreError::Persistence {
                key: self.key.clone(),
                report,
            })?;

        debug!(key = %self.key, count = self.tasks.len(), bytes, "Saved tasks");
        Ok(())
    }

    /// Save, folding a write failure into the outcome
    fn commit<T>(&mut self, value: T) -> Outcome<T> {
        match self.save() {
            Ok(()) => Outcome::Applied(value),
            Err(err) => {
                warn!(key = %self.key, error = %err, "Change kept in memory but not persisted");
                Outcome::Unsaved(value, err)
            }
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn validated_title(draft: &TaskDraft) -> Result<String, StoreError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(StoreError::validation("title is required"));
        }
        Ok(title.to_string())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a task at the front of the list
    pub fn add(&mut self, draft: TaskDraft) -> Result<Outcome<Task>, StoreError> {
        let title = Self::validated_title(&draft)?;
        let task = Task::from_draft(draft, title);

        debug!(id = %task.id, "add");
        self.tasks.insert(0, task.clone());
        Ok(self.commit(task))
    }

    /// Replace the editable fields of an existing task
    ///
    /// Title, description and due date come from the draft; a draft without a
    /// priority keeps the current one. Id, creation time and completion state
    /// are never touched.
    pub fn update(&mut self, id: &str, draft: TaskDraft) -> Result<Outcome<Task>, StoreError> {
        let title = Self::validated_title(&draft)?;

        let Some(index) = self.position(id) else {
            debug!(id, "update: not found");
            return Ok(Outcome::NotFound);
        };

        let task = &mut self.tasks[index];
        task.title = title;
        task.description = draft.description.trim().to_string();
        task.due_date = draft.due_date;
        if let Some(priority) = draft.priority {
            task.priority = priority;
        }
        task.updated_at = Some(now());

        debug!(id, "update");
        let updated = task.clone();
        Ok(self.commit(updated))
    }

    /// Remove a task, returning it
    pub fn delete(&mut self, id: &str) -> Outcome<Task> {
        let Some(index) = self.position(id) else {
            debug!(id, "delete: not found");
            return Outcome::NotFound;
        };

        let removed = self.tasks.remove(index);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }

        debug!(id, "delete");
        self.commit(removed)
    }

    /// Flip completion, returning the task in its new state
    pub fn toggle_completion(&mut self, id: &str) -> Outcome<Task> {
        let Some(index) = self.position(id) else {
            debug!(id, "toggle: not found");
            return Outcome::NotFound;
        };

        let task = &mut self.tasks[index];
        task.toggle();

        debug!(id, completed = task.completed, "toggle");
        let toggled = task.clone();
        self.commit(toggled)
    }

    /// Move `dragged_id` into the slot `target_id` occupies, returning the new index
    pub fn reorder(&mut self, dragged_id: &str, target_id: &str) -> Outcome<usize> {
        if dragged_id == target_id {
            return Outcome::NotFound;
        }
        let (Some(from), Some(to)) = (self.position(dragged_id), self.position(target_id)) else {
            debug!(dragged_id, target_id, "reorder: not found");
            return Outcome::NotFound;
        };

        let dragged = self.tasks.remove(from);
        self.tasks.insert(to, dragged);

        debug!(dragged_id, from, to, "reorder");
        self.commit(to)
    }

    // ========================================================================
    // Edit cursor
    // ========================================================================

    /// Start editing an existing task, returning it to populate a form
    pub fn begin_edit(&mut self, id: &str) -> Option<&Task> {
        let index = self.position(id)?;
        self.editing = Some(id.to_string());
        Some(&self.tasks[index])
    }

    /// Leave edit mode without touching any task
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Id of the task being edited, if any
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Submit a form: updates the task under edit, or adds a new one when idle
    ///
    /// The cursor returns to idle once the submission is applied. A rejected
    /// draft leaves the cursor where it was.
    pub fn submit(&mut self, draft: TaskDraft) -> Result<Outcome<Submitted>, StoreError> {
        let outcome = match self.editing.clone() {
            Some(id) => self.update(&id, draft)?.map(Submitted::Updated),
            None => self.add(draft)?.map(Submitted::Added),
        };
        self.editing = None;
        Ok(outcome)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tasks matching `query`, in list order
    pub fn filter(&self, query: &TaskQuery) -> Vec<&Task> {
        self.tasks.iter().filter(|task| query.matches(task)).collect()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|task| task.completed).count(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Find a task by exact id, or else by a prefix only one id starts with
    ///
    /// A prefix shared by several ids is a validation error.
    pub fn resolve_prefix(&self, input: &str) -> Result<Option<&Task>, StoreError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        if let Some(task) = self.get(input) {
            return Ok(Some(task));
        }

        let mut matches = self.tasks.iter().filter(|task| task.id.starts_with(input));
        match (matches.next(), matches.count()) {
            (None, _) => Ok(None),
            (Some(task), 0) => Ok(Some(task)),
            (Some(_), rest) => Err(StoreError::validation(format!(
                "id prefix '{}' matches {} tasks",
                input,
                rest + 1
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Backend key the collection is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
