//! Attendance ranks.
//!
//! Ranks are earned from lifetime connected days, never lost, and each one
//! carries a permanent point boost. The table order is the threshold order
//! and is preserved exactly as given.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::ConfigError;
use crate::rewards::Boost;

/// Unique rank identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankKey(String);

impl RankKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RankKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A rank tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier {
    pub key: RankKey,
    pub symbol: String,
    pub name: String,
    /// Connected days required
    pub threshold: u32,
    pub boost: Boost,
}

impl RankTier {
    pub fn new(key: &str, symbol: &str, name: &str, threshold: u32, boost: Boost) -> Self {
        Self {
            key: RankKey::new(key),
            symbol: symbol.to_string(),
            name: name.to_string(),
            threshold,
            boost,
        }
    }
}

/// Ordered rank tiers with strictly increasing thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RankTableRecord")]
pub struct RankTable {
    tiers: Vec<RankTier>,
}

/// Unchecked wire form; loading goes through [`RankTable::new`]
#[derive(Deserialize)]
struct RankTableRecord {
    tiers: Vec<RankTier>,
}

impl TryFrom<RankTableRecord> for RankTable {
    type Error = ConfigError;

    fn try_from(record: RankTableRecord) -> Result<Self, Self::Error> {
        Self::new(record.tiers)
    }
}

impl RankTable {
    /// Build a table from custom tiers.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` when thresholds are not strictly
    /// increasing, keys repeat, or a boost is not below 100%.
    pub fn new(tiers: Vec<RankTier>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for tier in &tiers {
            if !seen.insert(tier.key.clone()) {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "duplicate rank key '{}'",
                    tier.key
                )));
            }
            if !tier.boost.is_valid() {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "rank '{}' boost {} must be below 100%",
                    tier.key, tier.boost
                )));
            }
        }
        for pair in tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "rank thresholds must strictly increase: '{}' ({}) follows '{}' ({})",
                    pair[1].key, pair[1].threshold, pair[0].key, pair[0].threshold
                )));
            }
        }
        Ok(Self { tiers })
    }

    /// The built-in ladder
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                RankTier::new("bronze", "🥉", "Bronze", 10, Boost::from_percent(10)),
                RankTier::new("silver", "🥈", "Silver", 14, Boost::from_percent(20)),
                RankTier::new("gold", "🥇", "Gold", 30, Boost::from_percent(25)),
                RankTier::new("platinum", "💠", "Platinum", 60, Boost::from_percent(30)),
                RankTier::new("diamond", "💎", "Diamond", 100, Boost::from_percent(40)),
                RankTier::new("legend", "👑", "Legend", 365, Boost::from_percent(50)),
            ],
        }
    }

    /// Tier with the largest threshold not above `connected_days`
    pub fn rank_for_attendance(&self, connected_days: u32) -> Option<&RankTier> {
        self.tiers
            .iter()
            .take_while(|tier| tier.threshold <= connected_days)
            .last()
    }

    /// Tier with the smallest threshold above `connected_days`
    pub fn next_rank(&self, connected_days: u32) -> Option<&RankTier> {
        self.tiers
            .iter()
            .find(|tier| tier.threshold > connected_days)
    }

    pub fn get(&self, key: &RankKey) -> Option<&RankTier> {
        self.tiers.iter().find(|tier| &tier.key == key)
    }

    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }
}

impl Default for RankTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_for_attendance_picks_largest_threshold_met() {
        let table = RankTable::standard();
        assert!(table.rank_for_attendance(0).is_none());
        assert!(table.rank_for_attendance(9).is_none());
        assert_eq!(table.rank_for_attendance(10).unwrap().key.as_str(), "bronze");
        assert_eq!(table.rank_for_attendance(13).unwrap().key.as_str(), "bronze");
        assert_eq!(table.rank_for_attendance(14).unwrap().key.as_str(), "silver");
        assert_eq!(table.rank_for_attendance(1_000).unwrap().key.as_str(), "legend");
    }

    #[test]
    fn next_rank_picks_smallest_threshold_above() {
        let table = RankTable::standard();
        assert_eq!(table.next_rank(0).unwrap().key.as_str(), "bronze");
        assert_eq!(table.next_rank(10).unwrap().key.as_str(), "silver");
        assert_eq!(table.next_rank(364).unwrap().key.as_str(), "legend");
        assert!(table.next_rank(365).is_none());
    }

    #[test]
    fn new_rejects_non_increasing_thresholds() {
        let tiers = vec![
            RankTier::new("a", "A", "A", 10, Boost::from_percent(5)),
            RankTier::new("b", "B", "B", 10, Boost::from_percent(10)),
        ];
        assert!(matches!(
            RankTable::new(tiers),
            Err(ConfigError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn new_rejects_duplicate_keys_and_full_boosts() {
        let dup = vec![
            RankTier::new("a", "A", "A", 1, Boost::ZERO),
            RankTier::new("a", "B", "B", 2, Boost::ZERO),
        ];
        assert!(RankTable::new(dup).is_err());

        let full = vec![RankTier::new("a", "A", "A", 1, Boost::from_percent(100))];
        assert!(RankTable::new(full).is_err());
    }

    #[test]
    fn deserializing_runs_table_validation() {
        let json = r#"{"tiers": [
            {"key": "a", "symbol": "A", "name": "A", "threshold": 10, "boost": 500},
            {"key": "b", "symbol": "B", "name": "B", "threshold": 5, "boost": 1000}
        ]}"#;
        let err = serde_json::from_str::<RankTable>(json).unwrap_err();
        assert!(err.to_string().contains("strictly increase"), "{err}");

        let dup = r#"{"tiers": [
            {"key": "a", "symbol": "A", "name": "A", "threshold": 1, "boost": 0},
            {"key": "a", "symbol": "B", "name": "B", "threshold": 2, "boost": 0}
        ]}"#;
        assert!(serde_json::from_str::<RankTable>(dup).is_err());

        let full = r#"{"tiers": [
            {"key": "a", "symbol": "A", "name": "A", "threshold": 1, "boost": 20000}
        ]}"#;
        assert!(serde_json::from_str::<RankTable>(full).is_err());
    }

    #[test]
    fn standard_table_survives_json() {
        let json = serde_json::to_string(&RankTable::standard()).unwrap();
        let back: RankTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RankTable::standard());
    }

    #[test]
    fn new_preserves_given_order_even_with_falling_boosts() {
        let tiers = vec![
            RankTier::new("a", "A", "A", 5, Boost::from_percent(30)),
            RankTier::new("b", "B", "B", 9, Boost::from_percent(10)),
        ];
        let table = RankTable::new(tiers).unwrap();
        assert_eq!(table.rank_for_attendance(9).unwrap().key.as_str(), "b");
        assert_eq!(table.tiers()[0].key.as_str(), "a");
    }
}
