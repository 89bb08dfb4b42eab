//! Score persistence.
//!
//! [`MemoryStore`] keeps everything in a vector; [`JsonFileStore`] wraps it
//! and rewrites a JSON file after every insert.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::protocol::ScoreRecord;
use crate::types::Mode;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score store io: {0}")]
    Io(#[from] io::Error),
    #[error("score store format: {0}")]
    Format(#[from] serde_json::Error),
}

pub trait ScoreStore: Send + Sync {
    /// Persist a record and return it as stored.
    fn insert(&self, record: ScoreRecord) -> Result<ScoreRecord, StoreError>;

    /// Best `limit` records of `mode`, highest score first. Ties keep
    /// submission order.
    fn top(&self, mode: Mode, limit: usize) -> Result<Vec<ScoreRecord>, StoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ScoreRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ScoreRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ScoreRecord>> {
        // A panic mid-push leaves the vector intact.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn top_of(records: &[ScoreRecord], mode: Mode, limit: usize) -> Vec<ScoreRecord> {
    let mut matching: Vec<ScoreRecord> = records.iter().filter(|r| r.mode == mode).cloned().collect();
    matching.sort_by(|a, b| b.score.cmp(&a.score));
    matching.truncate(limit);
    matching
}

impl ScoreStore for MemoryStore {
    fn insert(&self, record: ScoreRecord) -> Result<ScoreRecord, StoreError> {
        self.lock().push(record.clone());
        Ok(record)
    }

    fn top(&self, mode: Mode, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        Ok(top_of(&self.lock(), mode, limit))
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Scores kept in one JSON array on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open `path`, loading existing records. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), records = records.len(), "score store opened");
        Ok(Self {
            path,
            inner: MemoryStore::with_records(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &[ScoreRecord]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ScoreStore for JsonFileStore {
    fn insert(&self, record: ScoreRecord) -> Result<ScoreRecord, StoreError> {
        let mut records = self.inner.lock();
        records.push(record.clone());
        if let Err(e) = self.persist(&records) {
            records.pop();
            return Err(e);
        }
        Ok(record)
    }

    fn top(&self, mode: Mode, limit: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        self.inner.top(mode, limit)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
