pub mod config;
pub mod run;
pub mod stats;

use pomotimer_core::PersistenceStore;

pub type CliResult<T = ()> = pomotimer_core::error::Result<T>;

/// Open the store in the resolved data directory.
pub fn open_store() -> CliResult<PersistenceStore> {
    Ok(PersistenceStore::open()?)
}
