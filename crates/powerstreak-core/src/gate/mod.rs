//! Cooldown gate.
//!
//! Decides from the last check-in instant and the current time whether a
//! check-in is allowed, still cooling down, or allowed but breaking the
//! streak.
//!
//! ## Windows
//!
//! ```text
//! last check-in      +cooldown              +reset
//!       |--- Cooling ---|------ Allowed ------|--- StreakBroken --->
//! ```
//!
//! Both ends of the grace window are inclusive. The timer that flips
//! `Cooling` to `Allowed` without a new attempt lives in [`timer`].

mod timer;

pub use timer::GateTimer;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Gate evaluation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateResult {
    /// Check-in permitted, streak continues
    Allowed,
    /// Check-in forbidden for `remaining`
    Cooling {
        #[serde(with = "duration_ms")]
        remaining: Duration,
    },
    /// Check-in permitted, but the streak restarts from zero
    StreakBroken,
}

impl GateResult {
    /// Whether a check-in may be processed now
    pub fn is_open(&self) -> bool {
        !matches!(self, GateResult::Cooling { .. })
    }

    /// Time left before the gate opens (zero when open)
    pub fn remaining(&self) -> Duration {
        match self {
            GateResult::Cooling { remaining } => *remaining,
            _ => Duration::zero(),
        }
    }
}

/// Cooldown and reset windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GateRecord")]
pub struct CooldownGate {
    #[serde(with = "duration_ms")]
    cooldown: Duration,
    #[serde(with = "duration_ms")]
    reset: Duration,
}

/// Unchecked wire form; loading goes through [`CooldownGate::new`]
#[derive(Deserialize)]
struct GateRecord {
    #[serde(with = "duration_ms")]
    cooldown: Duration,
    #[serde(with = "duration_ms")]
    reset: Duration,
}

impl TryFrom<GateRecord> for CooldownGate {
    type Error = ConfigError;

    fn try_from(record: GateRecord) -> Result<Self, Self::Error> {
        Self::new(record.cooldown, record.reset)
    }
}

impl CooldownGate {
    /// Create a gate.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` unless `0 < cooldown < reset`.
    pub fn new(cooldown: Duration, reset: Duration) -> Result<Self, ConfigError> {
        if cooldown <= Duration::zero() {
            return Err(ConfigError::InvalidConfiguration(format!(
                "cooldown must be positive, got {}s",
                cooldown.num_seconds()
            )));
        }
        if reset <= cooldown {
            return Err(ConfigError::InvalidConfiguration(format!(
                "reset window ({}s) must be longer than cooldown ({}s)",
                reset.num_seconds(),
                cooldown.num_seconds()
            )));
        }
        Ok(Self { cooldown, reset })
    }

    /// 24h cooldown, 48h reset
    pub fn production() -> Self {
        Self {
            cooldown: Duration::hours(24),
            reset: Duration::hours(48),
        }
    }

    /// 5s cooldown, 15s reset, for demos and manual testing
    pub fn fast() -> Self {
        Self {
            cooldown: Duration::seconds(5),
            reset: Duration::seconds(15),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn reset(&self) -> Duration {
        self.reset
    }

    /// Evaluate the gate at `now`
    pub fn evaluate(&self, last_check_in_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> GateResult {
        let Some(last) = last_check_in_at else {
            return GateResult::Allowed;
        };
        let elapsed = now - last;

        if elapsed < self.cooldown {
            // A clock that ran backwards still waits at most one cooldown
            let remaining = (self.cooldown - elapsed).min(self.cooldown);
            GateResult::Cooling { remaining }
        } else if elapsed > self.reset {
            GateResult::StreakBroken
        } else {
            GateResult::Allowed
        }
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::production()
    }
}

mod duration_ms {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        i64::deserialize(d).map(Duration::milliseconds)
    }
}
