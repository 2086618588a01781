use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ranks::RankKey;
use crate::rewards::{BadgeId, Boost};

/// Every state change in the engine produces an Event.
/// Presentation subscribes to them to drive toasts and animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The reset window had passed; the streak restarted.
    StreakBroken {
        previous_streak: u32,
        at: DateTime<Utc>,
    },
    CheckInCompleted {
        streak: u32,
        points_awarded: u32,
        boost: Boost,
        /// Mystery payout, when one was drawn
        mystery_payout: Option<u32>,
        total_points: u64,
        at: DateTime<Utc>,
    },
    BadgeUnlocked {
        badge: BadgeId,
        at: DateTime<Utc>,
    },
    RankUnlocked {
        rank: RankKey,
        at: DateTime<Utc>,
    },
    /// Cooldown elapsed; a check-in is available again.
    GateReopened {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::StreakBroken { at, .. }
            | Event::CheckInCompleted { at, .. }
            | Event::BadgeUnlocked { at, .. }
            | Event::RankUnlocked { at, .. }
            | Event::GateReopened { at } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let at = Utc::now();
        let json = serde_json::to_value(Event::BadgeUnlocked {
            badge: BadgeId::Charged,
            at,
        })
        .unwrap();
        assert_eq!(json["type"], "BadgeUnlocked");
        assert_eq!(json["badge"], "🔋");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back.at(), at);
    }
}
