//! Property tests over arbitrary check-in sequences.

use chrono::{DateTime, Duration, TimeZone, Utc};
use powerstreak_core::{Boost, CheckInError, CheckInProcessor, MysteryRoll, StreakState};
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// Gaps between attempts in seconds, spanning cooling, grace and broken windows
fn gaps() -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::vec((0i64..72 * 3600, 0.0f64..1.0), 1..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_progress_is_monotonic(steps in gaps()) {
        let processor = CheckInProcessor::default();
        let mut state = StreakState::new();
        let mut now = start();

        for (gap, roll) in steps {
            now += Duration::seconds(gap);
            match processor.process(&state, now, &mut move || roll) {
                Ok(result) => {
                    let next = &result.new_state;
                    prop_assert!(next.total_points >= state.total_points);
                    prop_assert_eq!(next.connected_days, state.connected_days + 1);
                    prop_assert!(next.best_streak >= state.best_streak);
                    prop_assert!(next.best_streak >= next.current_streak);
                    prop_assert!(next.unlocked_badges.is_superset(&state.unlocked_badges));
                    prop_assert!(next.unlocked_ranks.is_superset(&state.unlocked_ranks));
                    prop_assert!(next.is_consistent());
                    prop_assert_eq!(
                        result.points_awarded,
                        result.applied_boost.apply(result.base_points)
                    );
                    state = result.new_state;
                }
                Err(CheckInError::NotAllowed { remaining }) => {
                    prop_assert!(remaining > Duration::zero());
                    prop_assert!(remaining <= processor.gate().cooldown());
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn prop_boosts_never_stack(streak in 0u32..400, connected in 0u32..400) {
        let processor = CheckInProcessor::default();
        let before = StreakState {
            current_streak: streak,
            best_streak: streak,
            connected_days: connected.max(streak),
            ..StreakState::new()
        };
        let result = processor.process(&before, start(), &mut || 0.5).unwrap();
        let rank_boost = processor
            .ranks()
            .rank_for_attendance(result.new_state.connected_days)
            .map_or(Boost::ZERO, |tier| tier.boost);
        let streak_boost = if result.streak_day >= 14 { Boost::STREAK } else { Boost::ZERO };
        prop_assert_eq!(result.applied_boost, rank_boost.max(streak_boost));
    }

    #[test]
    fn prop_mystery_payout_is_a_known_band(roll in 0.0f64..1.0) {
        let payout = MysteryRoll::draw(roll).payout;
        prop_assert!([500, 300, 150, 100].contains(&payout));
    }

    #[test]
    fn prop_state_json_round_trips(streak in 0u32..100, extra in 0u32..100, total in 0u64..1_000_000) {
        let state = StreakState {
            current_streak: streak,
            best_streak: streak + extra,
            connected_days: streak + extra,
            total_points: total,
            last_check_in_at: Some(start()),
            ..StreakState::new()
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: StreakState = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, state);
    }
}
