//! Numbers shown on the results screen.

use serde::{Deserialize, Serialize};

use crate::config::RiskTier;
use crate::constants::NOT_AVAILABLE;
use crate::numbers::one_decimal;
use crate::plan::SessionPlan;
use crate::statistics::Statistics;

/// Per-attribute line of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRow {
    pub name: String,
    pub hex: String,
    pub tier_label: String,
    /// `None` when the attribute never appeared this session.
    pub success_rate_pct: Option<f64>,
    pub avg_pumps: Option<f64>,
}

impl AttributeRow {
    /// Success rate formatted as `12.3%`, or `N/A`.
    #[must_use]
    pub fn success_rate_display(&self) -> String {
        self.success_rate_pct
            .map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{}%", one_decimal(v)))
    }

    #[must_use]
    pub fn avg_pumps_display(&self) -> String {
        self.avg_pumps
            .map_or_else(|| NOT_AVAILABLE.to_string(), one_decimal)
    }
}

/// Final score, overall rates and one row per bound attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_score: u32,
    pub overall_success_rate_pct: f64,
    pub overall_avg_pumps: f64,
    pub rows: Vec<AttributeRow>,
}

impl SessionSummary {
    #[must_use]
    pub fn overall_success_rate_display(&self) -> String {
        format!("{}%", one_decimal(self.overall_success_rate_pct))
    }

    #[must_use]
    pub fn overall_avg_pumps_display(&self) -> String {
        one_decimal(self.overall_avg_pumps)
    }

    #[must_use]
    pub fn row(&self, name: &str) -> Option<&AttributeRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// Build the summary; rows follow risk order, highest first.
#[must_use]
pub fn session_summary(
    final_score: u32,
    stats: &Statistics,
    plan: &SessionPlan,
    tiers: &[RiskTier],
) -> SessionSummary {
    let mut bindings: Vec<_> = plan.bindings().iter().collect();
    bindings.sort_by_key(|b| b.tier_index);
    let rows = bindings
        .into_iter()
        .map(|binding| {
            let record = stats
                .attribute(&binding.attribute.name)
                .copied()
                .unwrap_or_default();
            let played = record.was_played();
            AttributeRow {
                name: binding.attribute.name.clone(),
                hex: binding.attribute.hex.clone(),
                tier_label: tiers
                    .get(binding.tier_index)
                    .map(|t| t.label.clone())
                    .unwrap_or_default(),
                success_rate_pct: played.then(|| record.success_rate_pct()),
                avg_pumps: played.then(|| record.avg_pumps()),
            }
        })
        .collect();
    SessionSummary {
        final_score,
        overall_success_rate_pct: stats.overall.success_rate_pct(),
        overall_avg_pumps: stats.overall.avg_pumps(),
        rows,
    }
}
