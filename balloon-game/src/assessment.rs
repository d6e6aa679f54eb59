//! Post-session risk-adaptation assessment.
//!
//! The verdict is a fixed decision table over three checks: caution with the
//! high-risk attribute, aggression with the low-risk attribute, and whether
//! the medium-risk attribute landed in between. A comparison against a role
//! that never appeared in the session holds vacuously.

use serde::{Deserialize, Serialize};

use crate::config::{AssessmentThresholds, RiskTier};
use crate::numbers::one_decimal;
use crate::plan::SessionPlan;
use crate::statistics::{CounterRecord, Statistics};

/// Canned verdicts, in decision-table priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Good,
    Partial,
    HighScoreLowAdaptation,
    NoAdaptation,
}

impl Verdict {
    pub const ALL: [Self; 5] = [
        Self::Excellent,
        Self::Good,
        Self::Partial,
        Self::HighScoreLowAdaptation,
        Self::NoAdaptation,
    ];

    /// Stable machine-readable name, identical to the serialized form.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Partial => "partial",
            Self::HighScoreLowAdaptation => "high_score_low_adaptation",
            Self::NoAdaptation => "no_adaptation",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent adaptation",
            Self::Good => "good adaptation",
            Self::Partial => "partial adaptation",
            Self::HighScoreLowAdaptation => "high score, low adaptation",
            Self::NoAdaptation => "no adaptation",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregated metrics for one risk role (high, medium or low).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMetrics {
    /// Attribute names bound to the role's tiers.
    pub attributes: Vec<String>,
    pub tier_label: String,
    pub counters: CounterRecord,
    pub avg_pumps: f64,
    pub success_rate_pct: f64,
}

impl RoleMetrics {
    fn collect(
        stats: &Statistics,
        plan: &SessionPlan,
        tiers: &[RiskTier],
        role: &[usize],
    ) -> Option<Self> {
        let mut attributes = Vec::new();
        let mut counters = CounterRecord::default();
        for binding in plan.bindings() {
            if !role.contains(&binding.tier_index) {
                continue;
            }
            attributes.push(binding.attribute.name.clone());
            if let Some(record) = stats.attribute(&binding.attribute.name) {
                counters = counters.merged(*record);
            }
        }
        if attributes.is_empty() {
            return None;
        }
        let tier_label = role
            .iter()
            .filter_map(|&idx| tiers.get(idx))
            .map(|t| t.label.as_str())
            .collect::<Vec<_>>()
            .join("/");
        Some(Self {
            attributes,
            tier_label,
            avg_pumps: counters.avg_pumps(),
            success_rate_pct: counters.success_rate_pct(),
            counters,
        })
    }

    #[must_use]
    pub const fn played(&self) -> bool {
        self.counters.was_played()
    }

    /// Attribute names joined for display.
    #[must_use]
    pub fn name(&self) -> String {
        self.attributes.join("/")
    }
}

/// The three adaptation checks feeding the verdict table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdaptationChecks {
    pub cautious_with_high: bool,
    pub aggressive_with_low: bool,
    pub adapted_medium: bool,
    pub medium_played: bool,
}

impl AdaptationChecks {
    /// Checks that count toward the verdict; medium only counts when played.
    #[must_use]
    pub fn counted(&self) -> u32 {
        u32::from(self.cautious_with_high)
            + u32::from(self.aggressive_with_low)
            + u32::from(self.adapted_medium && self.medium_played)
    }

    #[must_use]
    pub fn verdict(&self, overall_success_pct: f64, thresholds: &AssessmentThresholds) -> Verdict {
        if self.cautious_with_high
            && self.aggressive_with_low
            && self.adapted_medium
            && self.medium_played
        {
            return Verdict::Excellent;
        }
        match self.counted() {
            2.. => Verdict::Good,
            1 => Verdict::Partial,
            _ if overall_success_pct > thresholds.overall_success_pct => {
                Verdict::HighScoreLowAdaptation
            }
            _ => Verdict::NoAdaptation,
        }
    }
}

/// Full assessment result handed to the display at session end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub verdict: Verdict,
    pub checks: AdaptationChecks,
    pub high: RoleMetrics,
    pub medium: Option<RoleMetrics>,
    pub low: RoleMetrics,
    pub overall_success_pct: f64,
    pub text: String,
}

fn at_most(subject: &RoleMetrics, other: Option<&RoleMetrics>) -> bool {
    !subject.played() || other.is_none_or(|o| !o.played() || subject.avg_pumps <= o.avg_pumps)
}

fn at_least(subject: &RoleMetrics, other: Option<&RoleMetrics>) -> bool {
    !subject.played() || other.is_none_or(|o| !o.played() || subject.avg_pumps >= o.avg_pumps)
}

/// Evaluate the three adaptation checks.
#[must_use]
pub fn evaluate_checks(
    high: &RoleMetrics,
    medium: Option<&RoleMetrics>,
    low: &RoleMetrics,
    thresholds: &AssessmentThresholds,
) -> AdaptationChecks {
    let cautious_with_high = at_most(high, medium)
        && at_most(high, Some(low))
        && high.success_rate_pct > thresholds.high_risk_success_pct;
    let aggressive_with_low = at_least(low, medium)
        && at_least(low, Some(high))
        && low.success_rate_pct > thresholds.low_risk_success_pct;
    let adapted_medium = medium.is_none_or(|m| at_least(m, Some(high)) && at_most(m, Some(low)));
    AdaptationChecks {
        cautious_with_high,
        aggressive_with_low,
        adapted_medium,
        medium_played: medium.is_some_and(RoleMetrics::played),
    }
}

/// Classify the player's behavior for a finished session.
///
/// The first configured tier is the high-risk role and the last is the
/// low-risk role; interior tiers are pooled into the medium role.
#[must_use]
pub fn assess(
    stats: &Statistics,
    plan: &SessionPlan,
    tiers: &[RiskTier],
    thresholds: &AssessmentThresholds,
) -> RiskAssessment {
    let last = tiers.len().saturating_sub(1);
    let interior: Vec<usize> = (1..last).collect();
    let empty_role = || RoleMetrics {
        attributes: Vec::new(),
        tier_label: String::new(),
        counters: CounterRecord::default(),
        avg_pumps: 0.0,
        success_rate_pct: 0.0,
    };
    let high = RoleMetrics::collect(stats, plan, tiers, &[0]).unwrap_or_else(empty_role);
    let low = RoleMetrics::collect(stats, plan, tiers, &[last]).unwrap_or_else(empty_role);
    let medium = RoleMetrics::collect(stats, plan, tiers, &interior);

    let checks = evaluate_checks(&high, medium.as_ref(), &low, thresholds);
    let overall_success_pct = stats.overall.success_rate_pct();
    let verdict = checks.verdict(overall_success_pct, thresholds);
    log::debug!(
        "assessment: high avg {:.1} sr {:.1}% | low avg {:.1} sr {:.1}% | checks {checks:?} -> {verdict}",
        high.avg_pumps,
        high.success_rate_pct,
        low.avg_pumps,
        low.success_rate_pct
    );
    let text = compose_text(verdict, &high, medium.as_ref(), &low, plan, tiers);
    RiskAssessment {
        verdict,
        checks,
        high,
        medium,
        low,
        overall_success_pct,
        text,
    }
}

fn bindings_sentence(plan: &SessionPlan, tiers: &[RiskTier]) -> String {
    let mut bound: Vec<(usize, String)> = plan
        .bindings()
        .iter()
        .map(|b| {
            let label = tiers
                .get(b.tier_index)
                .map_or("Unknown Risk", |t| t.label.as_str());
            (b.tier_index, format!("{} = {label}", b.attribute.name))
        })
        .collect();
    bound.sort_by_key(|(tier, _)| *tier);
    let pairs: Vec<String> = bound.into_iter().map(|(_, pair)| pair).collect();
    format!("This game: {}.", pairs.join(", "))
}

fn compose_text(
    verdict: Verdict,
    high: &RoleMetrics,
    medium: Option<&RoleMetrics>,
    low: &RoleMetrics,
    plan: &SessionPlan,
    tiers: &[RiskTier],
) -> String {
    let high_name = high.name();
    let low_name = low.name();
    let high_avg = one_decimal(high.avg_pumps);
    let low_avg = one_decimal(low.avg_pumps);
    let body = match verdict {
        Verdict::Excellent => format!(
            "Excellent risk adaptation! You successfully identified that {high_name} balloons were high-risk (avg {high_avg} pumps), {low_name} were low-risk (avg {low_avg} pumps), and adjusted your strategy effectively."
        ),
        Verdict::Good => {
            let refine = medium.map_or_else(
                || "Refining your approach further could improve your score.".to_string(),
                |m| {
                    format!(
                        "Refining your approach for the medium-risk {} balloons could improve your score further.",
                        m.name()
                    )
                },
            );
            format!(
                "Good risk adaptation! You showed clear awareness of different risk levels (e.g., cautious with {high_name}, bolder with {low_name}). {refine}"
            )
        }
        Verdict::Partial => format!(
            "Partial risk adaptation. You seem to have identified either the high-risk {high_name} balloons or the low-risk {low_name} balloons, but didn't consistently adjust your strategy across all discovered risk levels."
        ),
        Verdict::HighScoreLowAdaptation => {
            let (medium_avg, medium_name) = medium.map_or_else(
                || ("-".to_string(), "-".to_string()),
                |m| (one_decimal(m.avg_pumps), m.name()),
            );
            format!(
                "You achieved a respectable score! However, your pumping strategy (avg {high_avg}/{medium_avg}/{low_avg} pumps for {high_name}/{medium_name}/{low_name}) didn't strongly vary based on the hidden risk levels. Experimenting more might reveal the patterns!"
            )
        }
        Verdict::NoAdaptation => format!(
            "It seems you used a similar approach for most balloons. The key to maximizing your score is figuring out which color is safe to pump many times ({low_name} this game) and which is risky ({high_name} this game). Try being cautious with {high_name} and aggressive with {low_name}."
        ),
    };
    format!("{body} {}", bindings_sentence(plan, tiers))
}
