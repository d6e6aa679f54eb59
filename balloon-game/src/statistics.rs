//! Running per-attribute and overall counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::numbers::{percent, ratio};
use crate::plan::SessionPlan;
use crate::round::RoundEvent;

/// Counters for one key of the statistics map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterRecord {
    pub total_pumps: u32,
    pub balloon_count: u32,
    pub balloons_cashed: u32,
    pub balloons_popped: u32,
}

impl CounterRecord {
    /// Balloons that resolved (cashed or popped).
    #[must_use]
    pub const fn interactions(&self) -> u32 {
        self.balloons_cashed + self.balloons_popped
    }

    /// Average pumps per resolved balloon, 0 when nothing resolved.
    #[must_use]
    pub fn avg_pumps(&self) -> f64 {
        ratio(self.total_pumps, self.interactions())
    }

    /// Cashed balloons as a percentage of balloons seen, 0 when none were seen.
    #[must_use]
    pub fn success_rate_pct(&self) -> f64 {
        percent(self.balloons_cashed, self.balloon_count)
    }

    #[must_use]
    pub const fn was_played(&self) -> bool {
        self.balloon_count > 0
    }

    /// Sum two records field by field.
    #[must_use]
    pub const fn merged(self, other: Self) -> Self {
        Self {
            total_pumps: self.total_pumps + other.total_pumps,
            balloon_count: self.balloon_count + other.balloon_count,
            balloons_cashed: self.balloons_cashed + other.balloons_cashed,
            balloons_popped: self.balloons_popped + other.balloons_popped,
        }
    }
}

/// Session statistics keyed by `overall` and by attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub overall: CounterRecord,
    pub per_attribute: BTreeMap<String, CounterRecord>,
}

impl Statistics {
    /// Zeroed statistics with one record per bound attribute.
    #[must_use]
    pub fn for_plan(plan: &SessionPlan) -> Self {
        Self {
            overall: CounterRecord::default(),
            per_attribute: plan
                .bindings()
                .iter()
                .map(|b| (b.attribute.name.clone(), CounterRecord::default()))
                .collect(),
        }
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&CounterRecord> {
        self.per_attribute.get(name)
    }

    /// Whether every counter is zero.
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.overall == CounterRecord::default()
            && self
                .per_attribute
                .values()
                .all(|r| *r == CounterRecord::default())
    }
}

/// Applies round events to [`Statistics`]; the only mutation path.
#[derive(Debug, Clone, Default)]
pub struct StatisticsTracker {
    stats: Statistics,
}

impl StatisticsTracker {
    #[must_use]
    pub fn new(plan: &SessionPlan) -> Self {
        Self {
            stats: Statistics::for_plan(plan),
        }
    }

    /// Update counters for one round event.
    pub fn record(&mut self, event: &RoundEvent) {
        let overall = &mut self.stats.overall;
        let attribute = self
            .stats
            .per_attribute
            .entry(event.attribute().to_string())
            .or_default();
        match event {
            RoundEvent::RoundStarted { .. } => {
                attribute.balloon_count += 1;
                overall.balloon_count += 1;
            }
            RoundEvent::Pumped { .. } => {
                attribute.total_pumps += 1;
                overall.total_pumps += 1;
            }
            RoundEvent::BalloonPopped { .. } => {
                attribute.balloons_popped += 1;
                overall.balloons_popped += 1;
            }
            RoundEvent::BalloonCashed { .. } => {
                attribute.balloons_cashed += 1;
                overall.balloons_cashed += 1;
            }
        }
    }

    /// Record a batch of events in order.
    pub fn record_all<'a>(&mut self, events: impl IntoIterator<Item = &'a RoundEvent>) {
        for event in events {
            self.record(event);
        }
    }

    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.stats
    }

    #[must_use]
    pub const fn overall(&self) -> &CounterRecord {
        &self.stats.overall
    }

    #[must_use]
    pub fn for_attribute(&self, name: &str) -> Option<&CounterRecord> {
        self.stats.attribute(name)
    }

    /// Owned copy of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> Statistics {
        self.stats.clone()
    }
}
