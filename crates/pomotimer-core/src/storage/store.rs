//! Best-effort persistence for the history and settings documents.
//!
//! Reads never fail: a missing, unreadable or malformed document is replaced
//! by its default. Writes are logged and dropped on failure, never retried.
//! Each write goes to a sibling temp file which is then renamed over the
//! target, so an interrupted write leaves the previous document intact.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{data_dir, Settings};
use crate::counters::CounterSet;
use crate::error::StorageError;
use crate::timer::IntervalKind;

pub const HISTORY_FILE: &str = "history.json";
pub const SETTINGS_FILE: &str = "settings.toml";

/// Handle on the directory holding the two documents.
#[derive(Debug, Clone)]
pub struct PersistenceStore {
    dir: PathBuf,
}

impl PersistenceStore {
    /// Open the store in the resolved data directory.
    ///
    /// # Errors
    /// Returns an error if no candidate data directory is usable.
    pub fn open() -> Result<Self, StorageError> {
        Ok(Self::at(data_dir()?))
    }

    /// Store rooted at an explicit directory. The directory is created on
    /// first write.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    /// Load both documents.
    pub fn load(&self) -> (CounterSet, Settings) {
        (self.load_history(), self.load_settings())
    }

    /// Load all-time history, or all zeros.
    pub fn load_history(&self) -> CounterSet {
        let path = self.history_path();
        let Some(content) = read_document(&path) else {
            return CounterSet::default();
        };
        match serde_json::from_str(&content) {
            Ok(history) => history,
            Err(e) => {
                let e = StorageError::Parse {
                    path,
                    message: e.to_string(),
                };
                warn!(error = %e, "history unusable, using zeros");
                CounterSet::default()
            }
        }
    }

    /// Load settings, or defaults. Out-of-range values are replaced.
    pub fn load_settings(&self) -> Settings {
        let path = self.settings_path();
        let Some(content) = read_document(&path) else {
            return Settings::default();
        };
        match toml::from_str::<Settings>(&content) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                let e = StorageError::Parse {
                    path,
                    message: e.to_string(),
                };
                warn!(error = %e, "settings unusable, using defaults");
                Settings::default()
            }
        }
    }

    /// Write the history document.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn try_save_history(&self, history: &CounterSet) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(history)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        write_atomic(&self.history_path(), &content)
    }

    /// Write the settings document.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn try_save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let content = toml::to_string_pretty(settings)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        write_atomic(&self.settings_path(), &content)
    }

    /// Best-effort history write.
    pub fn save_history(&self, history: &CounterSet) {
        if let Err(e) = self.try_save_history(history) {
            warn!(error = %e, "history not saved");
        }
    }

    /// Best-effort settings write.
    pub fn save_settings(&self, settings: &Settings) {
        if let Err(e) = self.try_save_settings(settings) {
            warn!(error = %e, "settings not saved");
        }
    }

    /// Move every pending session count into history.
    ///
    /// History is written only if something moved; a second call with no
    /// new session counts is a no-op. Returns whether a write was attempted.
    pub fn flush_session_counters(&self, session: &mut CounterSet, history: &mut CounterSet) -> bool {
        let mut changed = false;
        for kind in IntervalKind::ALL {
            let pending = session.take(kind);
            if pending > 0 {
                history.add(kind, pending);
                changed = true;
            }
        }
        if changed {
            debug!(?history, "flushing session counters");
            self.save_history(history);
        }
        changed
    }
}

/// Read a document, logging anything other than "not found".
fn read_document(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => {
            let e = StorageError::Read {
                path: path.to_path_buf(),
                source,
            };
            warn!(error = %e, "document unreadable, using defaults");
            None
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), StorageError> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, content).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)
}
