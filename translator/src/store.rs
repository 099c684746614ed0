//! Translation history sinks.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::{TranslationRecord, TranslatorError};

/// Persists translation records.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use; the auto-saver writes
/// from a spawned task.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Stores a record and returns its id.
    async fn insert(&self, record: TranslationRecord) -> Result<u64, TranslatorError>;
}

impl fmt::Debug for dyn TranslationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TranslationStore {{ ... }}")
    }
}

/// A record with the id assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: u64,
    #[serde(flatten)]
    pub record: TranslationRecord,
}

/// In-memory store. Ids start at 1.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<StoredRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn insert(&self, record: TranslationRecord) -> Result<u64, TranslatorError> {
        let mut records = self.records.lock();
        let id = records.len() as u64 + 1;
        records.push(StoredRecord { id, record });
        Ok(id)
    }
}

/// Append-only JSON lines file, one [`StoredRecord`] per line.
pub struct JsonlStore {
    path: PathBuf,
    next_id: tokio::sync::Mutex<u64>,
}

impl JsonlStore {
    /// Opens (or creates) the history file, continuing the id sequence of
    /// any records already in it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TranslatorError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let last_id = match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_lines(&content)?
                .iter()
                .map(|r| r.id)
                .max()
                .unwrap_or(0),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            next_id: tokio::sync::Mutex::new(last_id + 1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored record in file order.
    pub async fn load(&self) -> Result<Vec<StoredRecord>, TranslatorError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => parse_lines(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}

fn parse_lines(content: &str) -> Result<Vec<StoredRecord>, TranslatorError> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(TranslatorError::from))
        .collect()
}

#[async_trait]
impl TranslationStore for JsonlStore {
    async fn insert(&self, record: TranslationRecord) -> Result<u64, TranslatorError> {
        // Held across the write so ids land in file order.
        let mut next_id = self.next_id.lock().await;
        let id = *next_id;

        let mut line = serde_json::to_string(&StoredRecord { id, record })?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        *next_id += 1;
        Ok(id)
    }
}
