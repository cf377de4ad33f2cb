//! Session-scoped slot holding the most recent evaluation result.
//!
//! # Semantics
//!
//! - One slot, last writer wins. Each write bumps a version counter.
//! - Writes go through [`SubmissionCoordinator`](crate::SubmissionCoordinator)
//!   only; `set_result` is not part of the public API.
//! - When backed by a directory, the slot is mirrored to
//!   `evaluation-result-storage.json` and rehydrated verbatim on open.
//! - The record is a single small JSON file, written synchronously while the
//!   write lock is held, so a reader never observes memory and disk
//!   disagreeing. This runs on the caller's thread, including runtime
//!   worker threads; the write is one file of a few kilobytes.
//! - Clearing removes the file first and only empties the slot once the
//!   removal succeeded.
//! - A failed disk write is logged and does not roll back the in-memory
//!   value: the session keeps working without durability.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ideascore_types::EvaluationResult;

use crate::atomic_write::{atomic_write, remove_if_exists};

/// File name of the persisted record inside a session directory.
pub const RECORD_FILENAME: &str = "evaluation-result-storage.json";
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to remove {}: {source}", .path.display())]
    Remove { path: PathBuf, source: io::Error },
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema: u32,
    version: u64,
    result: &'a EvaluationResult,
}

#[derive(Deserialize)]
struct Envelope {
    schema: u32,
    version: u64,
    result: EvaluationResult,
}

#[derive(Debug, Default)]
struct Slot {
    version: u64,
    result: Option<EvaluationResult>,
}

#[derive(Debug, Clone)]
pub struct ResultStore {
    slot: Arc<RwLock<Slot>>,
    path: Option<Arc<Path>>,
}

impl ResultStore {
    /// A store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot::default())),
            path: None,
        }
    }

    /// Open the store for `session_dir`, rehydrating any persisted record.
    ///
    /// An unreadable or unrecognized record is logged and ignored.
    #[must_use]
    pub fn open(session_dir: &Path) -> Self {
        let path = session_dir.join(RECORD_FILENAME);
        let slot = match load(&path) {
            Ok(Some(envelope)) => {
                tracing::info!(
                    path = %path.display(),
                    version = envelope.version,
                    result = %envelope.result.id(),
                    "Rehydrated evaluation result"
                );
                Slot {
                    version: envelope.version,
                    result: Some(envelope.result),
                }
            }
            Ok(None) => Slot::default(),
            Err(reason) => {
                tracing::warn!(path = %path.display(), "Ignoring stored result: {reason}");
                Slot::default()
            }
        };
        Self {
            slot: Arc::new(RwLock::new(slot)),
            path: Some(path.into()),
        }
    }

    /// `{data_dir}/sessions/{session}`. Characters outside `[A-Za-z0-9_-]`
    /// in the session name are replaced.
    #[must_use]
    pub fn session_dir(data_dir: &Path, session: &str) -> PathBuf {
        let name: String = session
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let name = if name.is_empty() {
            "default".to_string()
        } else {
            name
        };
        data_dir.join("sessions").join(name)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn get_result(&self) -> Option<EvaluationResult> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .result
            .clone()
    }

    /// Number of writes (sets and clears) since the slot was created.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).version
    }

    /// Replace the slot. Returns the new version.
    ///
    /// The record is one small JSON file and is written synchronously while
    /// the write lock is held. Callers on the runtime pay for one short
    /// blocking write per finished job.
    pub(crate) fn set_result(&self, result: EvaluationResult) -> u64 {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        let version = slot.version + 1;

        if let Some(path) = &self.path
            && let Err(err) = persist(path, version, &result)
        {
            tracing::warn!("Result kept in memory only: {err}");
        }

        slot.version = version;
        slot.result = Some(result);
        version
    }

    /// Remove the persisted record, then empty the slot.
    ///
    /// If the record cannot be removed the slot is left untouched, so the
    /// value that would come back on the next open is still the one served.
    pub fn clear_result(&self) -> Result<(), PersistError> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(path) = &self.path {
            remove_if_exists(path).map_err(|source| PersistError::Remove {
                path: path.to_path_buf(),
                source,
            })?;
        }

        slot.version += 1;
        slot.result = None;
        Ok(())
    }
}

fn persist(path: &Path, version: u64, result: &EvaluationResult) -> Result<(), PersistError> {
    let bytes = serde_json::to_vec_pretty(&EnvelopeRef {
        schema: SCHEMA_VERSION,
        version,
        result,
    })?;
    atomic_write(path, &bytes).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn load(path: &Path) -> Result<Option<Envelope>, String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.to_string()),
    };
    let envelope: Envelope = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;
    if envelope.schema != SCHEMA_VERSION {
        return Err(format!("unknown schema version {}", envelope.schema));
    }
    Ok(Some(envelope))
}
