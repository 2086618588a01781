//! Read-only views derived from a [`StreakState`].
//!
//! Nothing here mutates state or touches I/O. Presentation layers call these
//! to render milestones, progress bars, the reward preview and the weekly
//! calendar strip.

use std::borrow::Cow;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::ranks::{RankKey, RankTable};
use crate::rewards::{BadgeId, RewardEntry, RewardTable};
use crate::state::StreakState;

/// Nearest badge still ahead of the current streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakMilestone {
    pub badge: BadgeId,
    pub threshold: u32,
    pub days_remaining: u32,
}

/// Next rank by connected days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankMilestone {
    pub rank: RankKey,
    pub threshold: u32,
    pub days_remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub badge: BadgeId,
    pub unlocked: bool,
    /// `min(1, current_streak / threshold)`, or 1 once unlocked
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Collected,
    Missed,
    Today,
    Tomorrow,
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub status: DayStatus,
}

impl DayCell {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

pub fn next_streak_milestone(state: &StreakState) -> Option<StreakMilestone> {
    BadgeId::ALL
        .into_iter()
        .filter(|badge| !state.has_badge(*badge))
        .filter(|badge| badge.threshold() > state.current_streak)
        .min_by_key(|badge| badge.threshold())
        .map(|badge| StreakMilestone {
            badge,
            threshold: badge.threshold(),
            days_remaining: badge.threshold() - state.current_streak,
        })
}

pub fn next_rank_milestone(state: &StreakState, ranks: &RankTable) -> Option<RankMilestone> {
    ranks.next_rank(state.connected_days).map(|tier| RankMilestone {
        rank: tier.key.clone(),
        threshold: tier.threshold,
        days_remaining: tier.threshold - state.connected_days,
    })
}

/// Fraction of the way from `prev` to `next`, clamped to `[0, 1]`.
///
/// With no next threshold everything is done and the result is `1.0`.
pub fn progress_fraction(done: u32, prev: u32, next: Option<u32>) -> f64 {
    let Some(next) = next else {
        return 1.0;
    };
    if next <= prev {
        return 1.0;
    }
    let span = f64::from(next - prev);
    let covered = f64::from(done.saturating_sub(prev));
    (covered / span).clamp(0.0, 1.0)
}

/// Progress between the current rank threshold and the next one
pub fn rank_progress(state: &StreakState, ranks: &RankTable) -> f64 {
    let prev = ranks
        .rank_for_attendance(state.connected_days)
        .map_or(0, |tier| tier.threshold);
    let next = ranks.next_rank(state.connected_days).map(|tier| tier.threshold);
    progress_fraction(state.connected_days, prev, next)
}

pub fn badge_progress(state: &StreakState) -> Vec<BadgeProgress> {
    BadgeId::ALL
        .into_iter()
        .map(|badge| {
            let unlocked = state.has_badge(badge);
            let fraction = if unlocked {
                1.0
            } else {
                progress_fraction(state.current_streak, 0, Some(badge.threshold()))
            };
            BadgeProgress {
                badge,
                unlocked,
                fraction,
            }
        })
        .collect()
}

/// Rewards for the next `count` streak days, starting at `current_streak + 1`.
///
/// Mystery days show their table value; the payout is only known once drawn.
/// The iterator is lazy and can be cloned to walk the preview again.
pub fn upcoming_reward_preview<'a>(
    state: &StreakState,
    table: &'a RewardTable,
    count: u32,
) -> impl Iterator<Item = RewardEntry> + Clone + 'a {
    let start = state.current_streak;
    (1..=count)
        .map_while(move |offset| start.checked_add(offset))
        .map(move |day| table.reward_for_day(day))
}

/// Monday..Sunday of the week containing `today`
pub fn weekly_calendar(state: &StreakState, today: NaiveDate) -> [DayCell; 7] {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    let tomorrow = today.succ_opt();

    std::array::from_fn(|i| {
        let date = monday + Duration::days(i as i64);
        let status = if state.check_in_history.contains(date) {
            DayStatus::Collected
        } else if date == today {
            DayStatus::Today
        } else if date < today {
            DayStatus::Missed
        } else if Some(date) == tomorrow {
            DayStatus::Tomorrow
        } else {
            DayStatus::Locked
        };
        DayCell { date, status }
    })
}

/// One-line nudge for the current streak length
pub fn encouragement(streak: u32) -> Cow<'static, str> {
    match streak {
        0 => "Start your amazing journey today! 🚀".into(),
        1 => "Excellent start! Tomorrow's reward is even better!".into(),
        2 => "Building momentum! Spark badge tomorrow! 🪫".into(),
        3 => "Spark achieved! You're officially on fire! 🔥".into(),
        4 => "One day away from Charged status! ⚡".into(),
        5 => "Charged up! You're unstoppable now! 🔋".into(),
        6 => "Mystery box tomorrow! Big rewards await! 🎁".into(),
        7 => "Week champion! Claim your mystery reward! 🏆".into(),
        8..=13 => format!("Power User in {} days! Keep going! 💪", 14 - streak).into(),
        14 => "POWER USER STATUS! You're in the elite! ⚡".into(),
        15..=29 => format!("Legendary {streak}-day streak! You're amazing! 🌟").into(),
        30..=49 => format!("Incredible {streak} days! True dedication! 💎").into(),
        50..=99 => format!("{} days to CENTURY! History awaits! 👑", 100 - streak).into(),
        _ => format!("Day {streak}! Absolute legend! 🏅").into(),
    }
}
