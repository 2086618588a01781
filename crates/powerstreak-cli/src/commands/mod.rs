pub mod badges;
pub mod calendar;
pub mod checkin;
pub mod config;
pub mod preview;
pub mod ranks;
pub mod stats;
pub mod status;
pub mod wait;

use std::sync::Arc;

use chrono::Duration;
use powerstreak_core::{Config, SqliteStreakStore, StreakEngine, SystemClock};
use tracing::debug;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the engine over the default data directory and config file.
pub async fn open_engine() -> Result<StreakEngine, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    debug!(profile = ?config.timing.profile, "opening streak engine");
    let store = Arc::new(SqliteStreakStore::open()?);
    let engine = StreakEngine::from_config(&config, store, Arc::new(SystemClock)).await?;
    Ok(engine)
}

/// `1h 02m 03s`, dropping leading zero units
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

/// `$1.50` from a cent amount
pub fn format_worth(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Text progress bar, `width` cells wide
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
