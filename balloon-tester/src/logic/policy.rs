use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const TIMID_TARGET: u32 = 2;
const STEADY_TARGET: u32 = 6;
const ADAPTIVE_OPENING_TARGET: u32 = 5;
const ADAPTIVE_EXPLORE_STEP: u32 = 2;
const RANDOM_TARGET_MAX: u32 = 12;

/// What the policy sees of the balloon in play.
#[derive(Debug, Clone, Copy)]
pub struct RoundView<'a> {
    pub round_index: u32,
    pub attribute: &'a str,
    pub pumps: u32,
    /// Hidden capacity; only populated for policies that ask for it.
    pub capacity_hint: Option<u32>,
}

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    Pump,
    CashOut,
}

/// How a balloon ended, fed back to learning policies.
#[derive(Debug, Clone)]
pub struct RoundFeedback {
    pub attribute: String,
    pub pumps: u32,
    pub popped: bool,
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Whether the runner should expose the hidden capacity.
    fn wants_capacity(&self) -> bool {
        false
    }

    fn decide(&mut self, view: &RoundView<'_>) -> PolicyAction;

    fn observe(&mut self, _feedback: &RoundFeedback) {}
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameplayStrategy {
    Timid,
    Steady,
    Greedy,
    Adaptive,
    Random,
    Oracle,
}

impl GameplayStrategy {
    pub const ALL: [Self; 6] = [
        Self::Timid,
        Self::Steady,
        Self::Greedy,
        Self::Adaptive,
        Self::Random,
        Self::Oracle,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Timid => "Timid",
            Self::Steady => "Steady",
            Self::Greedy => "Greedy",
            Self::Adaptive => "Adaptive",
            Self::Random => "Random",
            Self::Oracle => "Oracle",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Timid => Box::new(FixedTargetPolicy::new("Timid", TIMID_TARGET)),
            Self::Steady => Box::new(FixedTargetPolicy::new("Steady", STEADY_TARGET)),
            Self::Greedy => Box::new(GreedyPolicy),
            Self::Adaptive => Box::new(AdaptivePolicy::default()),
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Oracle => Box::new(OraclePolicy),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GameplayStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        match Self::ALL
            .into_iter()
            .find(|strategy| strategy.label().eq_ignore_ascii_case(wanted))
        {
            Some(strategy) => Ok(strategy),
            None => bail!("Unknown strategy: {wanted}"),
        }
    }
}

/// Cash out once a fixed number of pumps is reached.
struct FixedTargetPolicy {
    name: &'static str,
    target: u32,
}

impl FixedTargetPolicy {
    const fn new(name: &'static str, target: u32) -> Self {
        Self { name, target }
    }
}

struct GreedyPolicy;
struct OraclePolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
    round: u32,
    target: u32,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            round: 0,
            target: 0,
        }
    }
}

/// Per-color memory: the highest banked pump count and the lowest pop seen.
#[derive(Debug, Clone, Copy, Default)]
struct ColorMemory {
    best_cashed: Option<u32>,
    lowest_pop: Option<u32>,
}

impl ColorMemory {
    fn target(self) -> u32 {
        if let Some(pop) = self.lowest_pop {
            return pop.saturating_sub(1).max(1);
        }
        self.best_cashed
            .map_or(ADAPTIVE_OPENING_TARGET, |best| best + ADAPTIVE_EXPLORE_STEP)
    }
}

#[derive(Default)]
struct AdaptivePolicy {
    memory: HashMap<String, ColorMemory>,
}

impl PlayerPolicy for FixedTargetPolicy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn decide(&mut self, view: &RoundView<'_>) -> PolicyAction {
        if view.pumps >= self.target {
            PolicyAction::CashOut
        } else {
            PolicyAction::Pump
        }
    }
}

impl PlayerPolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn decide(&mut self, _view: &RoundView<'_>) -> PolicyAction {
        PolicyAction::Pump
    }
}

impl PlayerPolicy for OraclePolicy {
    fn name(&self) -> &'static str {
        "Oracle"
    }

    fn wants_capacity(&self) -> bool {
        true
    }

    fn decide(&mut self, view: &RoundView<'_>) -> PolicyAction {
        match view.capacity_hint {
            Some(capacity) if view.pumps + 1 < capacity => PolicyAction::Pump,
            _ => PolicyAction::CashOut,
        }
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn decide(&mut self, view: &RoundView<'_>) -> PolicyAction {
        if view.round_index != self.round {
            self.round = view.round_index;
            self.target = self.rng.gen_range(1..=RANDOM_TARGET_MAX);
        }
        if view.pumps >= self.target {
            PolicyAction::CashOut
        } else {
            PolicyAction::Pump
        }
    }
}

impl PlayerPolicy for AdaptivePolicy {
    fn name(&self) -> &'static str {
        "Adaptive"
    }

    fn decide(&mut self, view: &RoundView<'_>) -> PolicyAction {
        let target = self
            .memory
            .get(view.attribute)
            .copied()
            .unwrap_or_default()
            .target();
        if view.pumps >= target {
            PolicyAction::CashOut
        } else {
            PolicyAction::Pump
        }
    }

    fn observe(&mut self, feedback: &RoundFeedback) {
        let memory = self.memory.entry(feedback.attribute.clone()).or_default();
        if feedback.popped {
            memory.lowest_pop = Some(
                memory
                    .lowest_pop
                    .map_or(feedback.pumps, |pop| pop.min(feedback.pumps)),
            );
        } else {
            memory.best_cashed = Some(
                memory
                    .best_cashed
                    .map_or(feedback.pumps, |best| best.max(feedback.pumps)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(round_index: u32, attribute: &str, pumps: u32, capacity: Option<u32>) -> RoundView<'_> {
        RoundView {
            round_index,
            attribute,
            pumps,
            capacity_hint: capacity,
        }
    }

    #[test]
    fn fixed_targets_cash_at_threshold() {
        let mut timid = GameplayStrategy::Timid.create_policy(0);
        assert_eq!(timid.decide(&view(1, "Gold", 1, None)), PolicyAction::Pump);
        assert_eq!(timid.decide(&view(1, "Gold", 2, None)), PolicyAction::CashOut);
        let mut steady = GameplayStrategy::Steady.create_policy(0);
        assert_eq!(steady.decide(&view(1, "Gold", 5, None)), PolicyAction::Pump);
        assert_eq!(steady.decide(&view(1, "Gold", 6, None)), PolicyAction::CashOut);
    }

    #[test]
    fn oracle_stops_one_short_of_capacity() {
        let mut oracle = GameplayStrategy::Oracle.create_policy(0);
        assert!(oracle.wants_capacity());
        assert_eq!(oracle.decide(&view(1, "Gold", 3, Some(5))), PolicyAction::Pump);
        assert_eq!(oracle.decide(&view(1, "Gold", 4, Some(5))), PolicyAction::CashOut);
        assert_eq!(oracle.decide(&view(1, "Gold", 0, None)), PolicyAction::CashOut);
    }

    #[test]
    fn adaptive_backs_off_after_pop_and_explores_after_cash() {
        let mut adaptive = AdaptivePolicy::default();
        assert_eq!(adaptive.decide(&view(1, "Crimson", 4, None)), PolicyAction::Pump);
        assert_eq!(adaptive.decide(&view(1, "Crimson", 5, None)), PolicyAction::CashOut);

        adaptive.observe(&RoundFeedback {
            attribute: "Crimson".into(),
            pumps: 4,
            popped: true,
        });
        assert_eq!(adaptive.decide(&view(2, "Crimson", 3, None)), PolicyAction::CashOut);

        adaptive.observe(&RoundFeedback {
            attribute: "Emerald".into(),
            pumps: 5,
            popped: false,
        });
        assert_eq!(adaptive.decide(&view(3, "Emerald", 6, None)), PolicyAction::Pump);
        assert_eq!(adaptive.decide(&view(3, "Emerald", 7, None)), PolicyAction::CashOut);
    }

    #[test]
    fn random_targets_are_seeded() {
        let targets = |seed| {
            let mut policy = RandomPolicy::new(seed);
            (1..=10)
                .map(|round| {
                    policy.decide(&view(round, "Azure", 0, None));
                    policy.target
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(targets(7), targets(7));
        assert!(targets(7).iter().all(|t| (1..=RANDOM_TARGET_MAX).contains(t)));
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!(
            "oracle".parse::<GameplayStrategy>().unwrap(),
            GameplayStrategy::Oracle
        );
        assert!("reckless".parse::<GameplayStrategy>().is_err());
    }
}
