use clap::Subcommand;
use pomotimer_core::{ConfigError, Settings};

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "muted", "durations.work")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset preferences to defaults (today's counts are kept)
    Reset,
}

pub fn run(action: ConfigAction) -> CliResult {
    let store = open_store()?;
    match action {
        ConfigAction::Get { key } => {
            let settings = store.load_settings();
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = store.load_settings();
            settings.set(&key, &value)?;
            store.try_save_settings(&settings)?;
            println!("ok");
        }
        ConfigAction::List => {
            let settings = store.load_settings();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        ConfigAction::Reset => {
            let current = store.load_settings();
            let settings = Settings {
                daily_counts: current.daily_counts,
                ..Settings::default()
            };
            store.try_save_settings(&settings)?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
