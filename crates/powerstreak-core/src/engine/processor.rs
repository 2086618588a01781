//! The check-in transition function.
//!
//! Pure and synchronous: given a state, an instant and a random source it
//! produces the next state plus a full breakdown of what was awarded. It
//! performs no I/O and holds no state of its own beyond the static tables.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::RandomSource;
use crate::error::CheckInError;
use crate::gate::{CooldownGate, GateResult};
use crate::ranks::{RankKey, RankTable};
use crate::rewards::{BadgeId, Boost, MysteryRoll, RewardTable, STREAK_BOOST_DAY};
use crate::state::StreakState;

/// Everything that happened in one check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResult {
    pub new_state: StreakState,
    /// Streak day this check-in counted as
    pub streak_day: u32,
    pub points_awarded: u32,
    /// Table value, or the mystery payout when one was drawn
    pub base_points: u32,
    pub applied_boost: Boost,
    pub mystery_roll: Option<MysteryRoll>,
    /// Newly unlocked badges in threshold order
    pub badge_events: Vec<BadgeId>,
    pub rank_event: Option<RankKey>,
    /// Streak that was lost before this check-in, if the reset window had passed
    pub broken_streak: Option<u32>,
    pub checked_in_at: DateTime<Utc>,
}

impl CheckInResult {
    pub fn streak_was_broken(&self) -> bool {
        self.broken_streak.is_some()
    }
}

/// Applies check-ins against a gate and the reward/rank tables
#[derive(Debug, Clone)]
pub struct CheckInProcessor {
    gate: CooldownGate,
    rewards: RewardTable,
    ranks: RankTable,
    utc_offset: FixedOffset,
}

impl CheckInProcessor {
    pub fn new(gate: CooldownGate, rewards: RewardTable, ranks: RankTable) -> Self {
        Self {
            gate,
            rewards,
            ranks,
            utc_offset: Utc.fix(),
        }
    }

    /// Calendar dates are taken in this offset (default UTC)
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    pub fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    /// Calendar date of `at` in the configured offset
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.utc_offset).date_naive()
    }

    pub fn evaluate(&self, state: &StreakState, now: DateTime<Utc>) -> GateResult {
        self.gate.evaluate(state.last_check_in_at, now)
    }

    /// Compute the check-in at `now`.
    ///
    /// # Errors
    /// Returns `NotAllowed` while the gate is cooling down; `state` is never
    /// modified.
    pub fn process(
        &self,
        state: &StreakState,
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Result<CheckInResult, CheckInError> {
        let gate = self.evaluate(state, now);
        if let GateResult::Cooling { remaining } = gate {
            return Err(CheckInError::NotAllowed { remaining });
        }

        let mut next = state.clone();
        let broken_streak = match gate {
            GateResult::StreakBroken => {
                next.current_streak = 0;
                Some(state.current_streak)
            }
            _ => None,
        };

        let streak_day = next.current_streak + 1;
        let entry = self.rewards.reward_for_day(streak_day);

        let mystery_roll = entry
            .is_mystery()
            .then(|| MysteryRoll::draw(rng.next_unit()));
        let base_points = mystery_roll.map_or(entry.points, |m| m.payout);

        let connected_days = state.connected_days + 1;
        let rank_before = self.ranks.rank_for_attendance(state.connected_days);
        let rank_after = self.ranks.rank_for_attendance(connected_days);
        let rank_event = match (rank_before, rank_after) {
            (None, Some(after)) => Some(after.key.clone()),
            (Some(before), Some(after)) if after.threshold > before.threshold => {
                Some(after.key.clone())
            }
            _ => None,
        };

        let streak_boost = if streak_day >= STREAK_BOOST_DAY {
            Boost::STREAK
        } else {
            Boost::ZERO
        };
        // Boosts never stack, the larger one wins
        let applied_boost = streak_boost.max(rank_after.map_or(Boost::ZERO, |r| r.boost));
        let points_awarded = applied_boost.apply(base_points);

        let badge_events: Vec<BadgeId> = BadgeId::ALL
            .into_iter()
            .filter(|badge| badge.threshold() == streak_day || entry.badge == Some(*badge))
            .filter(|badge| !state.has_badge(*badge))
            .collect();

        next.current_streak = streak_day;
        next.best_streak = next.best_streak.max(streak_day);
        next.connected_days = connected_days;
        next.total_points += u64::from(points_awarded);
        next.last_check_in_at = Some(now);
        next.can_check_in_now = false;
        next.unlocked_badges.extend(badge_events.iter().copied());
        if let Some(key) = &rank_event {
            next.unlocked_ranks.insert(key.clone());
        }
        next.check_in_history.record(self.local_date(now));

        Ok(CheckInResult {
            new_state: next,
            streak_day,
            points_awarded,
            base_points,
            applied_boost,
            mystery_roll,
            badge_events,
            rank_event,
            broken_streak,
            checked_in_at: now,
        })
    }
}

impl Default for CheckInProcessor {
    fn default() -> Self {
        Self::new(
            CooldownGate::production(),
            RewardTable::standard(),
            RankTable::standard(),
        )
    }
}
