//! # Powerstreak Core Library
//!
//! This library provides the core logic for Powerstreak, a daily check-in
//! streak tracker with escalating rewards, badges and attendance ranks.
//! All operations are available through the standalone `powerstreak` CLI,
//! which is a thin presentation layer over this crate.
//!
//! ## Architecture
//!
//! - **Gate**: Wall-clock cooldown/reset windows deciding whether a
//!   check-in is allowed, plus a one-shot timer that reopens it
//! - **Processor**: Pure transition from one [`StreakState`] to the next,
//!   with reward, badge, rank and boost resolution
//! - **Engine**: Async owner of the live state, serialising check-ins and
//!   broadcasting [`Event`]s
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Projector**: Read-only milestone, progress, preview and calendar views
//!
//! ## Key Components
//!
//! - [`StreakEngine`]: Check-in front end
//! - [`CheckInProcessor`]: Deterministic check-in transition
//! - [`SqliteStreakStore`]: Durable state and check-in log
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod gate;
pub mod projector;
pub mod ranks;
pub mod rewards;
pub mod state;
pub mod storage;

pub use clock::{Clock, ManualClock, RandomSource, SeededRandom, SystemClock, ThreadRandom};
pub use engine::{CheckInProcessor, CheckInResult, StreakEngine};
pub use error::{CheckInError, ConfigError, CoreError, StoreError};
pub use events::Event;
pub use gate::{CooldownGate, GateResult};
pub use ranks::{RankKey, RankTable, RankTier};
pub use rewards::{BadgeId, Boost, MysteryRoll, RewardEntry, RewardTable, Special};
pub use state::{CheckInHistory, StreakState};
pub use storage::{Config, Database, MemoryStore, SqliteStreakStore, StreakStore};
