//! Single-slot storage for the task being tracked.
//!
//! The record is read once at startup so a restarted client can pick up a
//! running job instead of orphaning it. Both fields are written and removed
//! together; a record missing either one is treated as absent and wiped.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use adgen_logging::{adgen_debug, adgen_warn};
use serde::Deserialize;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::TaskRecord;

/// Storage key of the task id.
pub const TASK_ID_KEY: &str = "activeTaskId";
/// Storage key of the preview reference.
pub const PREVIEW_KEY: &str = "tempImageURL";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode session record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub trait TaskStore: Send + Sync {
    /// Replaces whatever record is stored.
    fn save(&self, record: &TaskRecord) -> Result<(), StoreError>;

    /// The stored record, if both fields are present and non-empty. A partial
    /// record is cleared and reported as absent.
    fn load(&self) -> Option<TaskRecord>;

    /// Removes the record unconditionally.
    fn clear(&self) -> Result<(), StoreError>;

    /// Removes the record unless it names a different task. Returns whether a
    /// clear was issued.
    fn clear_task(&self, task_id: &str) -> Result<bool, StoreError> {
        match self.load() {
            Some(record) if record.task_id != task_id => {
                adgen_debug!(
                    "Session record now names task {}; leaving it in place",
                    record.task_id
                );
                Ok(false)
            }
            _ => self.clear().map(|()| true),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(rename = "activeTaskId")]
    task_id: Option<String>,
    #[serde(rename = "tempImageURL")]
    preview_url: Option<String>,
}

impl RawRecord {
    fn complete(self) -> Option<TaskRecord> {
        match (self.task_id, self.preview_url) {
            (Some(task_id), Some(preview_url))
                if !task_id.is_empty() && !preview_url.is_empty() =>
            {
                Some(TaskRecord {
                    task_id,
                    preview_url,
                })
            }
            _ => None,
        }
    }
}

/// Key/value store living only as long as the process, shaped like browser
/// session storage.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with raw key/value pairs, complete or not.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let slots = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskStore for MemoryTaskStore {
    fn save(&self, record: &TaskRecord) -> Result<(), StoreError> {
        let mut slots = self.lock();
        slots.insert(TASK_ID_KEY.to_string(), record.task_id.clone());
        slots.insert(PREVIEW_KEY.to_string(), record.preview_url.clone());
        Ok(())
    }

    fn load(&self) -> Option<TaskRecord> {
        let mut slots = self.lock();
        let raw = RawRecord {
            task_id: slots.get(TASK_ID_KEY).cloned(),
            preview_url: slots.get(PREVIEW_KEY).cloned(),
        };
        let record = raw.complete();
        if record.is_none() {
            slots.remove(TASK_ID_KEY);
            slots.remove(PREVIEW_KEY);
        }
        record
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slots = self.lock();
        slots.remove(TASK_ID_KEY);
        slots.remove(PREVIEW_KEY);
        Ok(())
    }
}

/// One JSON file per session under `{state_dir}/sessions/`.
#[derive(Debug, Clone)]
pub struct SessionFileStore {
    dir: PathBuf,
    file_name: String,
}

impl SessionFileStore {
    pub fn new(state_dir: &Path, session: &str) -> Self {
        Self {
            dir: state_dir.join("sessions"),
            file_name: format!("{}.json", sanitize_session(session)),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    fn discard_unreadable(&self, reason: &str) {
        adgen_warn!(
            "Discarding session record {:?}: {}",
            self.path(),
            reason
        );
        if let Err(err) = self.clear() {
            adgen_warn!("Failed to remove session record {:?}: {}", self.path(), err);
        }
    }
}

impl TaskStore for SessionFileStore {
    fn save(&self, record: &TaskRecord) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(record)?;
        AtomicFileWriter::new(self.dir.clone()).write(&self.file_name, &content)?;
        adgen_debug!("Saved session record for task {}", record.task_id);
        Ok(())
    }

    fn load(&self) -> Option<TaskRecord> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                adgen_warn!("Failed to read session record from {:?}: {}", path, err);
                return None;
            }
        };

        let raw: RawRecord = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(err) => {
                self.discard_unreadable(&err.to_string());
                return None;
            }
        };
        let record = raw.complete();
        if record.is_none() {
            self.discard_unreadable("partial record");
        }
        record
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn sanitize_session(session: &str) -> String {
    let cleaned: String = session
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}
