//! Persistence backends behind the record stores.
//!
//! # Responsibility
//! - Define the raw `read`/`write` contract the stores consume.
//! - Provide the SQLite key-value, JSON file and in-memory realizations.
//!
//! # Invariants
//! - `read` distinguishes "never written" (`Ok(None)`) from failures.
//! - `write` overwrites the whole blob; there is no append.

use crate::db::kv::{kv_get, kv_set};
use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Transport-level persistence failure.
#[derive(Debug)]
pub enum BackendError {
    Io { path: PathBuf, source: io::Error },
    Db(DbError),
    /// Records could not be encoded as JSON.
    Encode(serde_json::Error),
    /// Stored value is not valid UTF-8 text.
    NotText,
    /// In-memory buffer lock was poisoned by a panicking writer.
    Poisoned,
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode records: {err}"),
            Self::NotText => write!(f, "stored value is not valid UTF-8"),
            Self::Poisoned => write!(f, "in-memory storage lock poisoned"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NotText | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Raw blob storage consumed by a record store.
pub trait StorageBackend {
    /// Returns the stored blob, or `None` when nothing was ever written.
    fn read(&self) -> Result<Option<Vec<u8>>, BackendError>;

    /// Replaces the stored blob.
    fn write(&self, bytes: &[u8]) -> Result<(), BackendError>;

    /// Short label used in log events.
    fn describe(&self) -> &'static str;

    /// Whether stores should write indented JSON.
    fn pretty_json(&self) -> bool {
        false
    }
}

/// One value in the `kv_store` table, addressed by a fixed key.
pub struct SqliteKvBackend<'conn> {
    conn: &'conn rusqlite::Connection,
    key: String,
}

impl<'conn> SqliteKvBackend<'conn> {
    pub fn new(conn: &'conn rusqlite::Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl StorageBackend for SqliteKvBackend<'_> {
    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(kv_get(self.conn, &self.key)?.map(String::into_bytes))
    }

    fn write(&self, bytes: &[u8]) -> Result<(), BackendError> {
        let text = std::str::from_utf8(bytes).map_err(|_| BackendError::NotText)?;
        kv_set(self.conn, &self.key, text)?;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "sqlite_kv"
    }
}

/// A whole JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BackendError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| BackendError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, bytes).map_err(|source| BackendError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> &'static str {
        "json_file"
    }

    /// Matches the layout the array resource handlers write.
    fn pretty_json(&self) -> bool {
        true
    }
}

/// Process-local blob, useful for tests and session-only stores.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `bytes` already stored.
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Mutex::new(Some(bytes.into())),
        }
    }

    /// Copy of the current blob.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.blob.lock().ok().and_then(|blob| blob.clone())
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        let blob = self.blob.lock().map_err(|_| BackendError::Poisoned)?;
        Ok(blob.clone())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), BackendError> {
        let mut blob = self.blob.lock().map_err(|_| BackendError::Poisoned)?;
        *blob = Some(bytes.to_vec());
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "memory"
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).read()
    }

    fn write(&self, bytes: &[u8]) -> Result<(), BackendError> {
        (**self).write(bytes)
    }

    fn describe(&self) -> &'static str {
        (**self).describe()
    }

    fn pretty_json(&self) -> bool {
        (**self).pretty_json()
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFileBackend, MemoryBackend, SqliteKvBackend, StorageBackend};
    use crate::db::open_db_in_memory;

    #[test]
    fn kv_backend_reads_absent_key_as_none() {
        let conn = open_db_in_memory().unwrap();
        let backend = SqliteKvBackend::new(&conn, "proTaskManagerTasks");

        assert!(backend.read().unwrap().is_none());
        backend.write(b"[]").unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn json_file_backend_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("data").join("schedule.json"));

        assert!(backend.read().unwrap().is_none());
        backend.write(b"[]").unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn json_file_backend_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten as a file.
        let backend = JsonFileBackend::new(dir.path());
        assert!(backend.write(b"[]").is_err());
    }

    #[test]
    fn memory_backend_overwrites() {
        let backend = MemoryBackend::with_contents("old");
        backend.write(b"new").unwrap();
        assert_eq!(backend.snapshot().as_deref(), Some(&b"new"[..]));
    }
}
