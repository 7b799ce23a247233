//! Durable local cache backend.
//!
//! A single keyed JSON record (`users`, `projects`, `current_session`)
//! that becomes the entire store when the remote API is unreachable.
//! Every write is a whole-record read-modify-write under one lock - no
//! partial-field races - persisted atomically via a temp file rename.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::CurrentUser;
use crate::store::Catalog;

/// Errors persisting the cache record.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem failure reading or writing the record.
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The single persisted record.
///
/// Missing or malformed fields deserialize to empty defaults; the adapter
/// never crashes on a partially-shaped record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Users and projects.
    #[serde(flatten)]
    pub catalog: Catalog,
    /// Cached session identity, if any.
    #[serde(default)]
    pub current_session: Option<CurrentUser>,
}

/// Handle to the durable local record.
pub struct LocalStore {
    path: PathBuf,
    record: Mutex<CacheRecord>,
}

impl LocalStore {
    /// Open the record at `path`.
    ///
    /// A missing file is an empty record; a malformed one is recovered by
    /// starting empty rather than propagating the error.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = load_record(&path);
        Self {
            path,
            record: Mutex::new(record),
        }
    }

    /// Where the record is persisted.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a read-only closure against the record.
    pub fn read<T>(&self, f: impl FnOnce(&CacheRecord) -> T) -> T {
        f(&self.lock())
    }

    /// Run a mutation as a whole-record read-modify-write, persisting the
    /// result before the lock is released. Increments racing within the
    /// same process serialize here, so none are lost.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the updated record cannot be written out.
    pub fn mutate<T>(&self, f: impl FnOnce(&mut CacheRecord) -> T) -> Result<T, CacheError> {
        let mut record = self.lock();
        let out = f(&mut record);
        self.persist(&record)?;
        Ok(out)
    }

    /// The cached session identity.
    #[must_use]
    pub fn cached_session(&self) -> Option<CurrentUser> {
        self.read(|r| r.current_session.clone())
    }

    /// Replace (or with `None`, clear) the cached session identity.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the record cannot be written out.
    pub fn set_session(&self, session: Option<CurrentUser>) -> Result<(), CacheError> {
        self.mutate(|r| r.current_session = session)
    }

    fn lock(&self) -> MutexGuard<'_, CacheRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, record: &CacheRecord) -> Result<(), CacheError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(record)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| CacheError::Io(e.error))?;

        Ok(())
    }
}

fn load_record(path: &Path) -> CacheRecord {
    match std::fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed cache record, starting empty");
                CacheRecord::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheRecord::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable cache record, starting empty");
            CacheRecord::default()
        }
    }
}
