//! Centralized balance and tuning constants for the balloon game.
//!
//! These values define the default session shape and the thresholds of the
//! risk-adaptation decision table. Configuration files may override them,
//! but the defaults here are what the game ships with.

// Session shape ------------------------------------------------------------
pub const DEFAULT_BALLOON_COUNT: u32 = 15;
pub const DEFAULT_POINTS_PER_PUMP: u32 = 5;
pub const DEFAULT_POP_DELAY_MS: u64 = 1_500;

// Risk tiers (ordered from highest to lowest risk) ---------------------------
pub const HIGH_RISK_KEY: &str = "high";
pub const HIGH_RISK_LABEL: &str = "High Risk";
pub const HIGH_RISK_MIN_CAPACITY: u32 = 3;
pub const HIGH_RISK_MAX_CAPACITY: u32 = 6;

pub const MEDIUM_RISK_KEY: &str = "medium";
pub const MEDIUM_RISK_LABEL: &str = "Medium Risk";
pub const MEDIUM_RISK_MIN_CAPACITY: u32 = 7;
pub const MEDIUM_RISK_MAX_CAPACITY: u32 = 11;

pub const LOW_RISK_KEY: &str = "low";
pub const LOW_RISK_LABEL: &str = "Low Risk";
pub const LOW_RISK_MIN_CAPACITY: u32 = 12;
pub const LOW_RISK_MAX_CAPACITY: u32 = 17;

// Palette ------------------------------------------------------------------
pub const DEFAULT_PALETTE: [(&str, &str); 6] = [
    ("Crimson", "#DC143C"),
    ("Azure", "#007FFF"),
    ("Emerald", "#2ECC71"),
    ("Gold", "#FFD700"),
    ("Violet", "#8A2BE2"),
    ("Orange", "#FFA500"),
];

// Risk assessment thresholds (percentages, strict greater-than) ------------
pub const HIGH_RISK_SUCCESS_PCT: f64 = 50.0;
pub const LOW_RISK_SUCCESS_PCT: f64 = 40.0;
pub const OVERALL_SUCCESS_PCT: f64 = 60.0;

// RNG stream tags ------------------------------------------------------------
pub(crate) const RNG_STREAM_PLAN: &[u8] = b"plan";
pub(crate) const RNG_STREAM_CAPACITY: &[u8] = b"capacity";

// Display fallbacks ----------------------------------------------------------
pub(crate) const NOT_AVAILABLE: &str = "N/A";
