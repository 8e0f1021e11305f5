// Durable key-value storage for collection blobs

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A string-keyed blob store
///
/// Every write fully replaces the value under its key.
pub trait Backend {
    /// Read the blob under `key`, `None` if nothing was ever written
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob under `key`
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Volatile backend, with an optional per-value size quota
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes whose value is larger than `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    /// Seed a raw value, bypassing the quota
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota
            && value.len() > quota
        {
            return Err(eyre!(
                "Quota exceeded: {} bytes for '{}' (max {})",
                value.len(),
                key,
                quota
            ));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// File backend
// ============================================================================

/// One `<key>.json` file per key inside a directory
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Open or create a file backend rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(path = ?base_path, "Opened file backend");
        Ok(Self { base_path })
    }

    /// Get the base path of this backend
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }

    /// Sidecar lock for `key`; the value file itself is replaced by rename on every write
    fn lock_file(&self, key: &str) -> Result<File> {
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(format!("{}.lock", key)))
            .context("Failed to open lock file")
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(eyre!("Key cannot be empty"));
        }
        if key.len() > 64 {
            return Err(eyre!("Key too long: {} (max 64 chars)", key));
        }
        if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
        }
        Ok(())
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Self::validate_key(key)?;

        let lock = self.lock_file(key)?;
        lock.lock_shared().context("Failed to acquire shared lock")?;

        let path = self.value_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).with_context(|| format!("Failed to read {}", path.display())),
        };

        // Lock is released when `lock` is dropped
        Ok(Some(content))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        Self::validate_key(key)?;

        let lock = self.lock_file(key)?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let path = self.value_path(key);
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        let mut tmp = File::create(&tmp_path).context("Failed to create temp file")?;
        tmp.write_all(value.as_bytes())?;
        tmp.sync_all()?; // Ensure data is flushed to disk before the rename

        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(key, bytes = value.len(), "Wrote blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_read_missing() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.read("tasks").unwrap(), None);
    }

    #[test]
    fn test_memory_write_replaces() {
        let mut backend = MemoryBackend::new();
        backend.write("tasks", "[1]").unwrap();
        backend.write("tasks", "[2]").unwrap();
        assert_eq!(backend.read("tasks").unwrap().as_deref(), Some("[2]"));
        assert_eq!(backend.read("other").unwrap(), None);
    }

    #[test]
    fn test_memory_quota_rejects_large_writes() {
        let mut backend = MemoryBackend::with_quota(4);
        backend.write("k", "1234").unwrap();

        let err = backend.write("k", "12345").unwrap_err();
        assert!(err.to_string().contains("Quota exceeded"));

        // Previous value untouched
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("1234"));

        backend.set_quota(None);
        backend.write("k", "12345").unwrap();
    }

    #[test]
    fn test_file_backend_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("store");

        let backend = FileBackend::open(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(backend.base_path(), dir.as_path());
    }

    #[test]
    fn test_file_backend_round_trip() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::open(temp.path()).unwrap();

        assert_eq!(backend.read("tasks").unwrap(), None);

        backend.write("tasks", "[\"first\"]").unwrap();
        backend.write("tasks", "[\"second\"]").unwrap();

        assert_eq!(backend.read("tasks").unwrap().as_deref(), Some("[\"second\"]"));
        assert!(temp.path().join("tasks.json").exists());
        assert!(!temp.path().join("tasks.json.tmp").exists());

        // A fresh handle sees the same data
        let reopened = FileBackend::open(temp.path()).unwrap();
        assert_eq!(reopened.read("tasks").unwrap().as_deref(), Some("[\"second\"]"));
    }

    #[test]
    fn test_file_backend_missing_value_with_lock_present() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();

        // First read leaves the lock sidecar behind but no value file
        assert_eq!(backend.read("tasks").unwrap(), None);
        assert!(temp.path().join("tasks.lock").exists());
        assert!(!temp.path().join("tasks.json").exists());
        assert_eq!(backend.read("tasks").unwrap(), None);
    }

    #[test]
    fn test_file_backend_value_deleted_between_reads() {
        let temp = TempDir::new().unwrap();
        let mut backend = FileBackend::open(temp.path()).unwrap();

        backend.write("tasks", "[]").unwrap();
        assert_eq!(backend.read("tasks").unwrap().as_deref(), Some("[]"));

        fs::remove_file(temp.path().join("tasks.json")).unwrap();
        assert_eq!(backend.read("tasks").unwrap(), None);
    }

    #[test]
    fn test_file_backend_unreadable_value_is_error() {
        let temp = TempDir::new().unwrap();
        let backend = FileBackend::open(temp.path()).unwrap();

        fs::create_dir(temp.path().join("tasks.json")).unwrap();
        assert!(backend.read("tasks").is_err());
    }

    #[test]
    fn test_file_backend_key_validation() {
        assert!(FileBackend::validate_key("tasks").is_ok());
        assert!(FileBackend::validate_key("my-tasks_2").is_ok());

        assert!(FileBackend::validate_key("").is_err());
        assert!(FileBackend::validate_key("../escape").is_err());
        assert!(FileBackend::validate_key("a/b").is_err());
        assert!(FileBackend::validate_key(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_boxed_backend_delegates() {
        let mut backend: Box<dyn Backend> = Box::new(MemoryBackend::new());
        backend.write("k", "v").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
    }
}
