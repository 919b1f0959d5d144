mod settings;
mod store;

pub use settings::Settings;
pub use store::{PersistenceStore, HISTORY_FILE, SETTINGS_FILE};

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;

/// Explicit data directory override.
pub const DATA_DIR_ENV: &str = "POMOTIMER_DATA_DIR";
/// Set to `dev` to keep development data apart from real data.
pub const APP_ENV: &str = "POMOTIMER_ENV";

fn app_dir_name() -> String {
    let env = std::env::var(APP_ENV).unwrap_or_else(|_| "production".to_string());
    if env == "dev" {
        "pomotimer-dev".to_string()
    } else {
        "pomotimer".to_string()
    }
}

/// Data directory candidates in priority order: the `POMOTIMER_DATA_DIR`
/// override, the platform user-data directory, a directory next to the
/// running executable, and finally `~/.pomotimer`.
pub fn candidate_dirs() -> Vec<PathBuf> {
    let name = app_dir_name();
    let mut candidates = Vec::new();

    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        candidates.push(PathBuf::from(dir));
    }
    if let Some(base) = dirs::data_dir() {
        candidates.push(base.join(&name));
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(format!("{name}-data")));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(format!(".{name}")));
    }

    candidates
}

/// Returns the first candidate directory that exists or can be created.
///
/// # Errors
/// Returns [`StorageError::NoDataDir`] if no candidate is usable.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let candidates = candidate_dirs();
    let tried = candidates.len();
    for dir in candidates {
        match std::fs::create_dir_all(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) => debug!(dir = %dir.display(), error = %e, "data dir candidate unusable"),
        }
    }
    Err(StorageError::NoDataDir { tried })
}
