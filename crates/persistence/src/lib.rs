#![deny(warnings)]

//! Persistence layer: the simulation history as a single JSON blob.
//!
//! The whole history lives under one well-known slot and is always written
//! as a full array, newest record first. Reads are fail-soft: a missing,
//! unparseable, or non-array blob is an empty history, never an error.

use estimator_core::SimulationRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Well-known slot name for the persisted history. The `v3` suffix matches
/// the richer, shipping-aware record shape; older slots are simply ignored.
pub const HISTORY_SLOT: &str = "simulacionesConstruccion_v3";

/// Errors produced when writing the history. Reads never fail.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Filesystem failure while writing the slot.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The history could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Returns the default path of the local history slot.
pub fn default_history_path() -> PathBuf {
    PathBuf::from("./saves").join(format!("{HISTORY_SLOT}.json"))
}

/// Return a new history with `record` first and all prior records after it,
/// in unchanged order. Past records are never mutated.
pub fn prepend(
    record: SimulationRecord,
    history: Vec<SimulationRecord>,
) -> Vec<SimulationRecord> {
    let mut next = Vec::with_capacity(history.len() + 1);
    next.push(record);
    next.extend(history);
    next
}

/// File-backed store for the simulation history.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted history. Absent slot means empty; a corrupt or
    /// non-array blob is logged and treated as empty.
    pub fn load(&self) -> Vec<SimulationRecord> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history slot unreadable, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<SimulationRecord>>(&raw) {
            Ok(history) => {
                debug!(records = history.len(), "history loaded");
                history
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history slot corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Serialize the full sequence and overwrite the slot. The blob is
    /// written to a sibling temp file and renamed into place so the slot is
    /// never observed half-written.
    pub fn save(&self, history: &[SimulationRecord]) -> Result<(), HistoryError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let blob = serde_json::to_string_pretty(history)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &self.path)?;
        debug!(records = history.len(), "history saved");
        Ok(())
    }

    /// Persist an empty sequence. The history stays empty until the next
    /// successful simulation.
    pub fn clear(&self) -> Result<(), HistoryError> {
        self.save(&[])
    }
}
