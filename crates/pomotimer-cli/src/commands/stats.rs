use clap::Subcommand;
use pomotimer_core::DailyCounterTracker;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's completions
    Today,
    /// All-time completions
    All,
}

pub fn run(action: StatsAction) -> CliResult {
    let store = open_store()?;

    match action {
        StatsAction::Today => {
            let mut settings = store.load_settings();
            DailyCounterTracker::system().check_daily_reset(&mut settings, &store);
            println!("{}", serde_json::to_string_pretty(&settings.daily_counts)?);
        }
        StatsAction::All => {
            let history = store.load_history();
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }
    Ok(())
}
