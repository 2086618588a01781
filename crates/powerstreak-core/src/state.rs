//! The persisted streak aggregate.
//!
//! `StreakState` is a plain value: the engine owns the live copy, the store
//! keeps the durable one, and the processor returns a new one per check-in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::ranks::RankKey;
use crate::rewards::BadgeId;

/// Maximum number of distinct dates kept in the check-in history
pub const HISTORY_LIMIT: usize = 60;

/// Distinct check-in dates in chronological order, oldest evicted first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<NaiveDate>", into = "Vec<NaiveDate>")]
pub struct CheckInHistory {
    dates: VecDeque<NaiveDate>,
}

impl CheckInHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a date. Duplicates are ignored; the oldest dates are evicted
    /// past [`HISTORY_LIMIT`].
    pub fn record(&mut self, date: NaiveDate) {
        let at = self.dates.partition_point(|d| *d < date);
        if self.dates.get(at) == Some(&date) {
            return;
        }
        self.dates.insert(at, date);
        while self.dates.len() > HISTORY_LIMIT {
            self.dates.pop_front();
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }
}

impl From<Vec<NaiveDate>> for CheckInHistory {
    fn from(dates: Vec<NaiveDate>) -> Self {
        let mut history = Self::new();
        for date in dates {
            history.record(date);
        }
        history
    }
}

impl From<CheckInHistory> for Vec<NaiveDate> {
    fn from(history: CheckInHistory) -> Self {
        history.dates.into_iter().collect()
    }
}

/// Streak progression for a single user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredState")]
pub struct StreakState {
    pub current_streak: u32,
    pub best_streak: u32,
    /// Lifetime check-ins, unaffected by streak breaks
    pub connected_days: u32,
    pub total_points: u64,
    pub last_check_in_at: Option<DateTime<Utc>>,
    pub unlocked_badges: BTreeSet<BadgeId>,
    pub unlocked_ranks: BTreeSet<RankKey>,
    pub check_in_history: CheckInHistory,
    /// Cached gate result for presentation; recomputed on load and by the
    /// reopen timer, never trusted as the source of truth.
    pub can_check_in_now: bool,
}

impl StreakState {
    /// First-run state
    pub fn new() -> Self {
        Self {
            can_check_in_now: true,
            ..Self::default()
        }
    }

    pub fn has_badge(&self, badge: BadgeId) -> bool {
        self.unlocked_badges.contains(&badge)
    }

    pub fn has_rank(&self, key: &RankKey) -> bool {
        self.unlocked_ranks.contains(key)
    }

    /// Whether the aggregate invariants hold
    pub fn is_consistent(&self) -> bool {
        self.current_streak <= self.best_streak && self.current_streak <= self.connected_days
    }
}

/// On-disk shape, tolerant of older records
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    #[serde(default)]
    current_streak: u32,
    #[serde(default)]
    best_streak: Option<u32>,
    #[serde(default)]
    connected_days: Option<u32>,
    #[serde(default, alias = "totalPowerLevel")]
    total_points: u64,
    #[serde(default, alias = "lastCheckIn")]
    last_check_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    unlocked_badges: BTreeSet<BadgeId>,
    #[serde(default)]
    unlocked_ranks: BTreeSet<RankKey>,
    #[serde(default)]
    check_in_history: CheckInHistory,
    #[serde(default, alias = "canCheckIn")]
    can_check_in_now: Option<bool>,
}

impl From<StoredState> for StreakState {
    fn from(stored: StoredState) -> Self {
        let current = stored.current_streak;
        // A missing or zero best streak predates the field
        let best = stored.best_streak.unwrap_or(0).max(current);
        let connected = stored.connected_days.unwrap_or(0).max(current);
        Self {
            current_streak: current,
            best_streak: best,
            connected_days: connected,
            total_points: stored.total_points,
            last_check_in_at: stored.last_check_in_at,
            unlocked_badges: stored.unlocked_badges,
            unlocked_ranks: stored.unlocked_ranks,
            check_in_history: stored.check_in_history,
            can_check_in_now: stored.can_check_in_now.unwrap_or(true),
        }
    }
}
