//! Streak badge catalog.
//!
//! Badges are cosmetic and permanent. Each one is earned on the streak day
//! equal to its threshold; the reward table may also declare them on an
//! entry. Identifiers serialize as their emoji so stored state stays
//! readable and compatible with older records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable badge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BadgeId {
    /// 3-day streak
    #[serde(rename = "🪫")]
    Spark,
    /// 5-day streak
    #[serde(rename = "🔋")]
    Charged,
    /// 14-day streak
    #[serde(rename = "⚡")]
    PowerUser,
}

impl BadgeId {
    /// All badges in evaluation order (ascending threshold)
    pub const ALL: [BadgeId; 3] = [BadgeId::Spark, BadgeId::Charged, BadgeId::PowerUser];

    /// Streak day on which the badge is awarded
    pub fn threshold(self) -> u32 {
        match self {
            BadgeId::Spark => 3,
            BadgeId::Charged => 5,
            BadgeId::PowerUser => 14,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BadgeId::Spark => "🪫",
            BadgeId::Charged => "🔋",
            BadgeId::PowerUser => "⚡",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BadgeId::Spark => "Spark",
            BadgeId::Charged => "Charged",
            BadgeId::PowerUser => "Power User",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BadgeId::Spark => "3-day streak",
            BadgeId::Charged => "5-day streak",
            BadgeId::PowerUser => "14-day streak",
        }
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
