mod config;
pub mod database;
mod memory;

pub use config::{Config, TimingConfig, TimingProfile};
pub use database::{CheckInRecord, CheckInStats, Database, SqliteStreakStore};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::engine::CheckInResult;
use crate::error::StoreError;
use crate::state::StreakState;

/// Key-value persistence for the streak state.
///
/// `load` returning `None` means first run. Implementations do their own
/// retrying, if any; the engine never retries.
pub trait StreakStore: Send + Sync {
    fn load(&self) -> Result<Option<StreakState>, StoreError>;

    fn save(&self, state: &StreakState) -> Result<(), StoreError>;

    /// Persist a completed check-in. Stores that keep a log override this
    /// to write the log entry and the state together.
    fn record(&self, result: &CheckInResult) -> Result<(), StoreError> {
        self.save(&result.new_state)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `POWERSTREAK_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/powerstreak[-dev]/` depending on `POWERSTREAK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("POWERSTREAK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("POWERSTREAK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("powerstreak-dev")
            } else {
                base_dir.join("powerstreak")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
