//! Session configuration: risk tiers, palette, scoring and assessment thresholds.
use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_BALLOON_COUNT, DEFAULT_PALETTE, DEFAULT_POINTS_PER_PUMP, DEFAULT_POP_DELAY_MS,
    HIGH_RISK_KEY, HIGH_RISK_LABEL, HIGH_RISK_MAX_CAPACITY, HIGH_RISK_MIN_CAPACITY,
    HIGH_RISK_SUCCESS_PCT, LOW_RISK_KEY, LOW_RISK_LABEL, LOW_RISK_MAX_CAPACITY,
    LOW_RISK_MIN_CAPACITY, LOW_RISK_SUCCESS_PCT, MEDIUM_RISK_KEY, MEDIUM_RISK_LABEL,
    MEDIUM_RISK_MAX_CAPACITY, MEDIUM_RISK_MIN_CAPACITY, OVERALL_SUCCESS_PCT,
};

/// Hidden risk category with an inclusive capacity range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskTier {
    /// Stable identifier (e.g., `high`).
    pub key: String,
    /// Display label (e.g., `High Risk`).
    pub label: String,
    pub min_capacity: u32,
    pub max_capacity: u32,
}

impl RiskTier {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        min_capacity: u32,
        max_capacity: u32,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            min_capacity,
            max_capacity,
        }
    }

    /// Whether a capacity value falls inside this tier's range.
    #[must_use]
    pub const fn contains(&self, capacity: u32) -> bool {
        capacity >= self.min_capacity && capacity <= self.max_capacity
    }
}

/// Visible cue bound to exactly one tier per session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualAttribute {
    pub name: String,
    pub hex: String,
}

impl VisualAttribute {
    #[must_use]
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }
}

/// How attributes are bound to tiers at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierBinding {
    /// Pick distinct colors at random and shuffle tiers against them.
    #[default]
    Randomized,
    /// Bind `palette[i]` to `tiers[i]` in configuration order.
    Fixed,
}

/// Thresholds of the risk-adaptation decision table, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssessmentThresholds {
    #[serde(default = "AssessmentThresholds::default_high")]
    pub high_risk_success_pct: f64,
    #[serde(default = "AssessmentThresholds::default_low")]
    pub low_risk_success_pct: f64,
    #[serde(default = "AssessmentThresholds::default_overall")]
    pub overall_success_pct: f64,
}

impl AssessmentThresholds {
    const fn default_high() -> f64 {
        HIGH_RISK_SUCCESS_PCT
    }

    const fn default_low() -> f64 {
        LOW_RISK_SUCCESS_PCT
    }

    const fn default_overall() -> f64 {
        OVERALL_SUCCESS_PCT
    }
}

impl Default for AssessmentThresholds {
    fn default() -> Self {
        Self {
            high_risk_success_pct: Self::default_high(),
            low_risk_success_pct: Self::default_low(),
            overall_success_pct: Self::default_overall(),
        }
    }
}

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one risk tier is required")]
    NoTiers,
    #[error("palette has {palette} colors but {tiers} tiers need distinct colors")]
    PaletteTooSmall { palette: usize, tiers: usize },
    #[error("tier {key} has inverted capacity range (min {min} > max {max})")]
    InvertedRange { key: String, min: u32, max: u32 },
    #[error("tier {key} must have a positive minimum capacity")]
    ZeroCapacity { key: String },
    #[error("tier {upper} (min {upper_min}) overlaps or precedes tier {lower} (max {lower_max})")]
    OverlappingTiers {
        lower: String,
        lower_max: u32,
        upper: String,
        upper_min: u32,
    },
    #[error("points per pump must be positive")]
    ZeroPointsPerPump,
    #[error("palette color {name} appears more than once")]
    DuplicateAttribute { name: String },
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable configuration for a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_balloon_count")]
    pub balloon_count: u32,
    #[serde(default = "GameConfig::default_points_per_pump")]
    pub points_per_pump: u32,
    /// Ordered from highest risk (smallest capacities) to lowest risk.
    #[serde(default = "GameConfig::default_tiers")]
    pub tiers: Vec<RiskTier>,
    #[serde(default = "GameConfig::default_palette")]
    pub palette: Vec<VisualAttribute>,
    #[serde(default)]
    pub binding: TierBinding,
    #[serde(default = "GameConfig::default_pop_delay_ms")]
    pub pop_delay_ms: u64,
    #[serde(default)]
    pub thresholds: AssessmentThresholds,
}

impl GameConfig {
    const fn default_balloon_count() -> u32 {
        DEFAULT_BALLOON_COUNT
    }

    const fn default_points_per_pump() -> u32 {
        DEFAULT_POINTS_PER_PUMP
    }

    const fn default_pop_delay_ms() -> u64 {
        DEFAULT_POP_DELAY_MS
    }

    fn default_tiers() -> Vec<RiskTier> {
        vec![
            RiskTier::new(
                HIGH_RISK_KEY,
                HIGH_RISK_LABEL,
                HIGH_RISK_MIN_CAPACITY,
                HIGH_RISK_MAX_CAPACITY,
            ),
            RiskTier::new(
                MEDIUM_RISK_KEY,
                MEDIUM_RISK_LABEL,
                MEDIUM_RISK_MIN_CAPACITY,
                MEDIUM_RISK_MAX_CAPACITY,
            ),
            RiskTier::new(
                LOW_RISK_KEY,
                LOW_RISK_LABEL,
                LOW_RISK_MIN_CAPACITY,
                LOW_RISK_MAX_CAPACITY,
            ),
        ]
    }

    fn default_palette() -> Vec<VisualAttribute> {
        DEFAULT_PALETTE
            .iter()
            .map(|(name, hex)| VisualAttribute::new(*name, *hex))
            .collect()
    }

    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the configuration is invalid.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every configuration invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        if self.points_per_pump == 0 {
            return Err(ConfigError::ZeroPointsPerPump);
        }
        for tier in &self.tiers {
            if tier.min_capacity == 0 {
                return Err(ConfigError::ZeroCapacity {
                    key: tier.key.clone(),
                });
            }
            if tier.min_capacity > tier.max_capacity {
                return Err(ConfigError::InvertedRange {
                    key: tier.key.clone(),
                    min: tier.min_capacity,
                    max: tier.max_capacity,
                });
            }
        }
        for pair in self.tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if upper.min_capacity <= lower.max_capacity {
                return Err(ConfigError::OverlappingTiers {
                    lower: lower.key.clone(),
                    lower_max: lower.max_capacity,
                    upper: upper.key.clone(),
                    upper_min: upper.min_capacity,
                });
            }
        }
        let mut seen = HashSet::new();
        for attribute in &self.palette {
            if !seen.insert(attribute.name.as_str()) {
                return Err(ConfigError::DuplicateAttribute {
                    name: attribute.name.clone(),
                });
            }
        }
        if self.palette.len() < self.tiers.len() {
            return Err(ConfigError::PaletteTooSmall {
                palette: self.palette.len(),
                tiers: self.tiers.len(),
            });
        }
        Ok(())
    }

    /// Delay between a pop and the next balloon becoming playable.
    #[must_use]
    pub const fn pop_delay(&self) -> Duration {
        Duration::from_millis(self.pop_delay_ms)
    }

    #[must_use]
    pub fn with_balloon_count(mut self, balloon_count: u32) -> Self {
        self.balloon_count = balloon_count;
        self
    }

    #[must_use]
    pub fn with_binding(mut self, binding: TierBinding) -> Self {
        self.binding = binding;
        self
    }

    #[must_use]
    pub fn with_tiers(mut self, tiers: Vec<RiskTier>) -> Self {
        self.tiers = tiers;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Vec<VisualAttribute>) -> Self {
        self.palette = palette;
        self
    }

    /// Tier index treated as the highest risk (first configured).
    #[must_use]
    pub const fn high_tier_index(&self) -> usize {
        0
    }

    /// Tier index treated as the lowest risk (last configured).
    #[must_use]
    pub fn low_tier_index(&self) -> usize {
        self.tiers.len().saturating_sub(1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            balloon_count: Self::default_balloon_count(),
            points_per_pump: Self::default_points_per_pump(),
            tiers: Self::default_tiers(),
            palette: Self::default_palette(),
            binding: TierBinding::default(),
            pop_delay_ms: Self::default_pop_delay_ms(),
            thresholds: AssessmentThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_game() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.balloon_count, 15);
        assert_eq!(cfg.points_per_pump, 5);
        assert_eq!(cfg.tiers.len(), 3);
        assert_eq!(cfg.palette.len(), 6);
        assert_eq!(cfg.binding, TierBinding::Randomized);
        assert_eq!(cfg.pop_delay(), Duration::from_millis(1_500));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let cfg = GameConfig::from_json(r#"{"balloon_count": 9, "binding": "fixed"}"#).unwrap();
        assert_eq!(cfg.balloon_count, 9);
        assert_eq!(cfg.binding, TierBinding::Fixed);
        assert_eq!(cfg.tiers, GameConfig::default().tiers);
        assert!((cfg.thresholds.low_risk_success_pct - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn rejects_small_palette() {
        let cfg = GameConfig::default().with_palette(vec![
            VisualAttribute::new("Crimson", "#DC143C"),
            VisualAttribute::new("Azure", "#007FFF"),
        ]);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PaletteTooSmall {
                palette: 2,
                tiers: 3
            })
        ));
    }

    #[test]
    fn rejects_inverted_and_overlapping_ranges() {
        let inverted = GameConfig::default().with_tiers(vec![RiskTier::new("x", "X", 9, 4)]);
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedRange { min: 9, max: 4, .. })
        ));

        let overlapping = GameConfig::default().with_tiers(vec![
            RiskTier::new("a", "A", 3, 8),
            RiskTier::new("b", "B", 8, 12),
        ]);
        assert!(matches!(
            overlapping.validate(),
            Err(ConfigError::OverlappingTiers { .. })
        ));

        let unordered = GameConfig::default().with_tiers(vec![
            RiskTier::new("low", "Low", 12, 17),
            RiskTier::new("high", "High", 3, 6),
        ]);
        assert!(unordered.validate().is_err());
    }

    #[test]
    fn rejects_zero_points_and_zero_capacity() {
        let cfg = GameConfig {
            points_per_pump: 0,
            ..GameConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroPointsPerPump)));

        let cfg = GameConfig::default().with_tiers(vec![RiskTier::new("z", "Z", 0, 3)]);
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroCapacity { .. })));
    }

    #[test]
    fn rejects_duplicate_palette_names() {
        let cfg = GameConfig::default().with_palette(vec![
            VisualAttribute::new("Gold", "#FFD700"),
            VisualAttribute::new("Gold", "#FFD701"),
            VisualAttribute::new("Azure", "#007FFF"),
        ]);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn zero_balloons_is_a_valid_session() {
        let cfg = GameConfig::default().with_balloon_count(0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn tier_contains_is_inclusive() {
        let tier = RiskTier::new("high", "High Risk", 3, 6);
        assert!(tier.contains(3));
        assert!(tier.contains(6));
        assert!(!tier.contains(2));
        assert!(!tier.contains(7));
    }
}
