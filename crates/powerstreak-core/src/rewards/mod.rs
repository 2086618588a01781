//! Per-day reward table and mystery payouts.
//!
//! The table covers the first N days of a streak cycle. Days past the end of
//! the table get a flat fallback entry with no badge and no special reward.

mod badges;
mod boost;

pub use badges::BadgeId;
pub use boost::{Boost, STREAK_BOOST_DAY};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Special reward types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Special {
    /// Payout drawn from [`MYSTERY_BANDS`] instead of the table value
    Mystery,
}

/// One day of the reward table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    /// 1-based streak day
    pub day: u32,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<Special>,
}

impl RewardEntry {
    pub const fn plain(day: u32, points: u32) -> Self {
        Self {
            day,
            points,
            badge: None,
            special: None,
        }
    }

    /// Display value of the reward; one point is worth one cent.
    pub fn worth_cents(&self) -> u32 {
        self.points
    }

    pub fn is_mystery(&self) -> bool {
        self.special == Some(Special::Mystery)
    }
}

/// Points awarded when a roll lands below the band's upper bound, first match wins.
pub const MYSTERY_BANDS: [(f64, u32); 3] = [(0.05, 500), (0.20, 300), (0.40, 150)];

/// Points awarded when the roll clears every band.
pub const MYSTERY_FLOOR: u32 = 100;

/// Outcome of a mystery draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MysteryRoll {
    /// Raw draw in `[0, 1)`
    pub roll: f64,
    pub payout: u32,
}

impl MysteryRoll {
    pub fn draw(roll: f64) -> Self {
        let payout = MYSTERY_BANDS
            .iter()
            .find(|(bound, _)| roll < *bound)
            .map(|(_, payout)| *payout)
            .unwrap_or(MYSTERY_FLOOR);
        Self { roll, payout }
    }

    /// Rarity label shown alongside the payout
    pub fn rarity(&self) -> &'static str {
        if self.payout >= 300 {
            "legendary"
        } else if self.payout >= 150 {
            "rare"
        } else {
            "common"
        }
    }
}

const DEFAULT_FALLBACK_POINTS: u32 = 100;

/// Static per-day reward lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RewardTableRecord")]
pub struct RewardTable {
    entries: Vec<RewardEntry>,
    fallback_points: u32,
}

/// Unchecked wire form; loading goes through [`RewardTable::new`]
#[derive(Deserialize)]
struct RewardTableRecord {
    entries: Vec<RewardEntry>,
    #[serde(default = "default_fallback_points")]
    fallback_points: u32,
}

fn default_fallback_points() -> u32 {
    DEFAULT_FALLBACK_POINTS
}

impl TryFrom<RewardTableRecord> for RewardTable {
    type Error = ConfigError;

    fn try_from(record: RewardTableRecord) -> Result<Self, Self::Error> {
        Self::new(record.entries, record.fallback_points)
    }
}

impl RewardTable {
    /// Build a table from custom entries.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if the table is empty or its days are
    /// not exactly `1..=N` in order.
    pub fn new(entries: Vec<RewardEntry>, fallback_points: u32) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "reward table has no entries".into(),
            ));
        }
        for (index, entry) in entries.iter().enumerate() {
            let expected = index as u32 + 1;
            if entry.day != expected {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "reward table must be keyed by contiguous days: expected day {expected}, found day {}",
                    entry.day
                )));
            }
        }
        Ok(Self {
            entries,
            fallback_points,
        })
    }

    /// The built-in two-week table
    pub fn standard() -> Self {
        let mut entries = vec![
            RewardEntry::plain(1, 20),
            RewardEntry::plain(2, 30),
            RewardEntry {
                badge: Some(BadgeId::Spark),
                ..RewardEntry::plain(3, 40)
            },
            RewardEntry::plain(4, 50),
            RewardEntry {
                badge: Some(BadgeId::Charged),
                ..RewardEntry::plain(5, 70)
            },
            RewardEntry::plain(6, 70),
            RewardEntry {
                special: Some(Special::Mystery),
                ..RewardEntry::plain(7, 100)
            },
        ];
        // Second week ramps at 70 + 10 per completed week
        entries.extend((8..14).map(|day| RewardEntry::plain(day, 70 + (day / 7) * 10)));
        entries.push(RewardEntry {
            badge: Some(BadgeId::PowerUser),
            ..RewardEntry::plain(14, 200)
        });

        Self {
            entries,
            fallback_points: DEFAULT_FALLBACK_POINTS,
        }
    }

    /// Reward for a 1-based streak day.
    ///
    /// Day 0 is a caller error.
    pub fn reward_for_day(&self, day: u32) -> RewardEntry {
        debug_assert!(day >= 1, "streak days are 1-based");
        match day.checked_sub(1).and_then(|i| self.entries.get(i as usize)) {
            Some(entry) => *entry,
            None => RewardEntry::plain(day, self.fallback_points),
        }
    }

    /// Number of days covered before the fallback applies
    pub fn len(&self) -> u32 {
        self.entries.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fallback_points(&self) -> u32 {
        self.fallback_points
    }

    pub fn entries(&self) -> &[RewardEntry] {
        &self.entries
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self::standard()
    }
}
