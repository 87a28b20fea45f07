//! Generic in-memory record store mirrored to a storage backend.
//!
//! # Responsibility
//! - Own the authoritative, newest-first record collection.
//! - Persist the whole collection after every successful mutation.
//!
//! # Invariants
//! - A failed validation leaves the collection untouched.
//! - A failed write keeps the in-memory change; the store is best-effort
//!   durable and reports `PersistenceWrite` to the caller.
//! - Loading never fails: absent or corrupt data yields an empty store.

use crate::model::{Record, ValidationError};
use crate::store::backend::{BackendError, StorageBackend};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store failure taxonomy.
#[derive(Debug)]
pub enum StoreError {
    /// Required field missing; nothing changed.
    Validation(ValidationError),
    /// Backend unreadable or its content undecodable.
    PersistenceRead(String),
    /// Backend unwritable; the in-memory change was kept.
    PersistenceWrite(BackendError),
    /// No record carries this id.
    NotFound(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::PersistenceRead(message) => write!(f, "failed to load records: {message}"),
            Self::PersistenceWrite(err) => write!(f, "failed to save records: {err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::PersistenceWrite(err) => Some(err),
            Self::PersistenceRead(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Ordered record collection plus the backend it mirrors to.
pub struct RecordStore<R: Record, B: StorageBackend> {
    records: Vec<R>,
    backend: B,
}

impl<R: Record, B: StorageBackend> RecordStore<R, B> {
    /// Loads every record from `backend`.
    ///
    /// Returns the store and, when the stored data could not be read or
    /// decoded, the warning to surface. The store is empty in that case.
    pub fn load(backend: B) -> (Self, Option<StoreError>) {
        let (records, warning) = match read_records(&backend) {
            Ok(records) => (records, None),
            Err(err) => (Vec::new(), Some(err)),
        };
        (Self { records, backend }, warning)
    }

    /// Creates an empty store without reading the backend.
    pub fn empty(backend: B) -> Self {
        Self {
            records: Vec::new(),
            backend,
        }
    }

    /// Re-reads the backend and replaces the whole collection.
    ///
    /// On failure the current collection is kept and the error returned.
    pub fn reload(&mut self) -> StoreResult<()> {
        self.records = read_records(&self.backend)?;
        Ok(())
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates and inserts `record` at the front, then persists.
    pub fn add(&mut self, record: R) -> StoreResult<()> {
        record.validate()?;
        if self.get(record.id()).is_some() {
            return Err(ValidationError::DuplicateId(record.id().to_string()).into());
        }
        self.records.insert(0, record);
        self.persist("add")
    }

    /// Replaces the mutable fields of the record with `id`, then persists.
    pub fn update(&mut self, id: &str, changes: R::Changes) -> StoreResult<()> {
        let record = self.find_mut(id)?;
        record.apply_changes(changes)?;
        self.persist("update")
    }

    /// Removes the first record with `id`, then persists.
    pub fn remove(&mut self, id: &str) -> StoreResult<R> {
        let index = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = self.records.remove(index);
        self.persist("remove")?;
        Ok(removed)
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> StoreResult<&mut R> {
        self.records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<R> {
        &mut self.records
    }

    /// Writes the whole collection, overwriting the previous blob.
    pub(crate) fn persist(&self, op: &'static str) -> StoreResult<()> {
        let encoded = if self.backend.pretty_json() {
            serde_json::to_vec_pretty(&self.records)
        } else {
            serde_json::to_vec(&self.records)
        };
        let bytes =
            encoded.map_err(|err| StoreError::PersistenceWrite(BackendError::Encode(err)))?;

        match self.backend.write(&bytes) {
            Ok(()) => {
                info!(
                    "event=store_persist module=store status=ok kind={} op={op} backend={} records={}",
                    R::KIND,
                    self.backend.describe(),
                    self.records.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=store_persist module=store status=error kind={} op={op} backend={} error={}",
                    R::KIND,
                    self.backend.describe(),
                    err
                );
                Err(StoreError::PersistenceWrite(err))
            }
        }
    }
}

fn read_records<R: Record, B: StorageBackend>(backend: &B) -> StoreResult<Vec<R>> {
    let bytes = match backend.read() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            info!(
                "event=store_load module=store status=ok kind={} backend={} records=0 source=absent",
                R::KIND,
                backend.describe()
            );
            return Ok(Vec::new());
        }
        Err(err) => {
            warn!(
                "event=store_load module=store status=warn kind={} backend={} error_code=read_failed error={}",
                R::KIND,
                backend.describe(),
                err
            );
            return Err(StoreError::PersistenceRead(err.to_string()));
        }
    };

    match serde_json::from_slice::<Vec<R>>(&bytes) {
        Ok(records) => {
            info!(
                "event=store_load module=store status=ok kind={} backend={} records={}",
                R::KIND,
                backend.describe(),
                records.len()
            );
            Ok(records)
        }
        Err(err) => {
            warn!(
                "event=store_load module=store status=warn kind={} backend={} error_code=corrupt_data line={} column={}",
                R::KIND,
                backend.describe(),
                err.line(),
                err.column()
            );
            Err(StoreError::PersistenceRead(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, StoreError};
    use crate::model::event::{Event, EventChanges};
    use crate::model::ValidationError;
    use crate::store::backend::{JsonFileBackend, MemoryBackend, StorageBackend};
    use chrono::{NaiveDate, NaiveTime};

    fn event(title: &str) -> Event {
        Event::new(
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            title,
        )
    }

    #[test]
    fn add_inserts_newest_first_and_persists() {
        let backend = MemoryBackend::new();
        let mut store: RecordStore<Event, _> = RecordStore::empty(&backend);

        store.add(event("first")).unwrap();
        store.add(event("second")).unwrap();

        let titles: Vec<_> = store.records().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);

        let (reloaded, warning) = RecordStore::<Event, _>::load(&backend);
        assert!(warning.is_none());
        assert_eq!(reloaded.records(), store.records());
    }

    #[test]
    fn add_rejects_blank_title_and_duplicate_id() {
        let mut store: RecordStore<Event, _> = RecordStore::empty(MemoryBackend::new());

        let err = store.add(event("  ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::EmptyTitle)));
        assert!(store.is_empty());
        assert!(store.backend().snapshot().is_none());

        let original = event("once");
        store.add(original.clone()).unwrap();
        let err = store.add(original).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::DuplicateId(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_ids_surface_not_found() {
        let mut store: RecordStore<Event, _> = RecordStore::empty(MemoryBackend::new());
        store.add(event("only")).unwrap();

        let err = store.remove("missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref id) if id == "missing"));

        let err = store
            .update(
                "missing",
                EventChanges {
                    time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                    title: "x".to_string(),
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_blob_loads_as_empty_with_warning() {
        let backend = MemoryBackend::with_contents("{not json");
        let (store, warning) = RecordStore::<Event, _>::load(backend);

        assert!(store.is_empty());
        assert!(matches!(warning, Some(StoreError::PersistenceRead(_))));
    }

    #[test]
    fn write_failure_keeps_in_memory_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut store: RecordStore<Event, _> = RecordStore::empty(JsonFileBackend::new(dir.path()));

        let err = store.add(event("unsaved")).unwrap_err();
        assert!(matches!(err, StoreError::PersistenceWrite(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn file_backend_writes_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        let mut store: RecordStore<Event, _> = RecordStore::empty(JsonFileBackend::new(&path));
        store.add(event("standup")).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("[\n  {"), "unexpected layout: {written}");

        let memory = MemoryBackend::new();
        let mut compact: RecordStore<Event, _> = RecordStore::empty(&memory);
        compact.add(event("standup")).unwrap();
        let snapshot = String::from_utf8(memory.snapshot().unwrap()).unwrap();
        assert!(snapshot.starts_with("[{"));
    }

    #[test]
    fn reload_failure_keeps_current_records() {
        let backend = MemoryBackend::new();
        let mut store: RecordStore<Event, _> = RecordStore::empty(&backend);
        store.add(event("kept")).unwrap();

        backend.write(b"garbage").unwrap();

        assert!(store.reload().is_err());
        assert_eq!(store.len(), 1);
    }
}
