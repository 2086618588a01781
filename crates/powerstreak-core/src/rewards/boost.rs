//! Point multipliers.
//!
//! Boosts are held in basis points so that applying them and rounding
//! half-up stays exact integer arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

const BPS_PER_UNIT: u32 = 10_000;

/// A multiplicative boost fraction, stored in basis points (1% = 100 bps)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Boost(u32);

impl Boost {
    pub const ZERO: Boost = Boost(0);

    /// Boost granted once a streak reaches [`STREAK_BOOST_DAY`] days
    pub const STREAK: Boost = Boost(1_500);

    pub const fn from_bps(bps: u32) -> Self {
        Boost(bps)
    }

    pub const fn from_percent(percent: u32) -> Self {
        Boost(percent * 100)
    }

    pub fn bps(self) -> u32 {
        self.0
    }

    /// The boost as a real fraction, e.g. `0.15`
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / f64::from(BPS_PER_UNIT)
    }

    /// Whether the boost is a valid fraction in `[0, 1)`
    pub fn is_valid(self) -> bool {
        self.0 < BPS_PER_UNIT
    }

    /// `round_half_up(points * (1 + fraction))`
    pub fn apply(self, points: u32) -> u32 {
        let scaled = u64::from(points) * u64::from(BPS_PER_UNIT + self.0);
        let rounded = (scaled + u64::from(BPS_PER_UNIT / 2)) / u64::from(BPS_PER_UNIT);
        u32::try_from(rounded).unwrap_or(u32::MAX)
    }
}

/// Streak length from which [`Boost::STREAK`] applies
pub const STREAK_BOOST_DAY: u32 = 14;

impl fmt::Display for Boost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "+{}%", self.0 / 100)
        } else {
            write!(f, "+{:.2}%", f64::from(self.0) / 100.0)
        }
    }
}
