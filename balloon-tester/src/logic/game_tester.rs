use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use balloon_game::{
    Binding, EventLog, GameConfig, PumpOutcome, RiskAssessment, SessionController,
    SessionPhase, SessionSummary, Statistics,
};
use colored::Colorize;

use crate::logic::policy::{GameplayStrategy, PolicyAction, RoundFeedback, RoundView};

/// Upper bound on decisions per balloon; a policy that never cashes out
/// still pops well before this with any sane tier configuration.
const MAX_ACTIONS_PER_ROUND: u32 = 10_000;

/// One scripted session: who plays, on which configuration, and what must hold afterwards.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub configure: Option<fn(GameConfig) -> GameConfig>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            configure: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, configure: fn(GameConfig) -> GameConfig) -> Self {
        self.configure = Some(configure);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// How a single balloon went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub index: u32,
    pub attribute: String,
    pub tier_index: usize,
    pub pumps: u32,
    pub popped: bool,
    pub banked: u32,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub share_code: String,
    pub strategy: GameplayStrategy,
    pub config: GameConfig,
    pub bindings: Vec<Binding>,
    pub final_score: u32,
    pub statistics: Statistics,
    pub assessment: Option<RiskAssessment>,
    pub summary: SessionSummary,
    pub rounds: Vec<RoundRecord>,
    pub events: EventLog,
}

impl SimulationSummary {
    #[must_use]
    pub fn popped_count(&self) -> usize {
        self.rounds.iter().filter(|r| r.popped).count()
    }

    /// Average pumps across every balloon bound to `tier_index`.
    #[must_use]
    pub fn tier_avg_pumps(&self, tier_index: usize) -> Option<f64> {
        let pumps: Vec<u32> = self
            .rounds
            .iter()
            .filter(|r| r.tier_index == tier_index)
            .map(|r| r.pumps)
            .collect();
        if pumps.is_empty() {
            return None;
        }
        let total: u32 = pumps.iter().sum();
        let count = u32::try_from(pumps.len()).ok()?;
        Some(f64::from(total) / f64::from(count))
    }
}

/// Drives headless sessions with scripted players.
#[derive(Debug, Clone)]
pub struct GameTester {
    base_config: GameConfig,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(base_config: GameConfig, verbose: bool) -> Self {
        Self {
            base_config,
            verbose,
        }
    }

    /// Play one full session according to `plan` and collect what happened.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is rejected, the controller refuses an
    /// intent, or a policy stalls a balloon.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let config = plan
            .configure
            .map_or_else(|| self.base_config.clone(), |f| f(self.base_config.clone()));
        let mut ctl = SessionController::new(config.clone(), seed, EventLog::new())
            .with_context(|| format!("configuration rejected for seed {seed}"))?;
        let mut policy = plan.strategy.create_policy(seed);
        log::debug!("{} playing seed {seed} ({})", policy.name(), ctl.share_code());

        ctl.start().context("session failed to start")?;
        let mut rounds = Vec::new();
        while !ctl.is_finished() {
            let index = ctl.round_index();
            let attribute = ctl
                .current_attribute()
                .map(|a| a.name.clone())
                .ok_or_else(|| anyhow!("round {index} has no balloon"))?;
            let tier_index = ctl
                .plan()
                .binding_at(index)
                .map(|b| b.tier_index)
                .ok_or_else(|| anyhow!("round {index} has no binding"))?;

            let mut actions = 0;
            let record = loop {
                actions += 1;
                if actions > MAX_ACTIONS_PER_ROUND {
                    bail!("{} stalled on round {index}", policy.name());
                }
                let view = RoundView {
                    round_index: index,
                    attribute: &attribute,
                    pumps: ctl.current_pumps(),
                    capacity_hint: if policy.wants_capacity() {
                        ctl.capacity_for_testing()
                    } else {
                        None
                    },
                };
                match policy.decide(&view) {
                    PolicyAction::Pump => {
                        let outcome = ctl.pump()?;
                        if let PumpOutcome::Popped { pumps } = outcome {
                            break RoundRecord {
                                index,
                                attribute: attribute.clone(),
                                tier_index,
                                pumps,
                                popped: true,
                                banked: 0,
                            };
                        }
                    }
                    PolicyAction::CashOut => {
                        let pumps = ctl.current_pumps();
                        let banked = ctl.cash_out()?;
                        break RoundRecord {
                            index,
                            attribute: attribute.clone(),
                            tier_index,
                            pumps,
                            popped: false,
                            banked,
                        };
                    }
                }
            };

            policy.observe(&RoundFeedback {
                attribute: record.attribute.clone(),
                pumps: record.pumps,
                popped: record.popped,
            });
            if self.verbose {
                let outcome = if record.popped {
                    "popped".red()
                } else {
                    format!("banked {}", record.banked).green()
                };
                println!(
                    "   {} #{:<3} {:<8} pumps {:>2} {outcome}",
                    policy.name().dimmed(),
                    record.index,
                    record.attribute,
                    record.pumps
                );
            }
            rounds.push(record);

            if ctl.phase() == SessionPhase::AwaitingAdvance {
                let delay = ctl.config().pop_delay();
                if !ctl.advance_time(delay)? {
                    bail!("pop delay elapsed without advancing round {index}");
                }
            }
        }

        let share_code = ctl.share_code();
        let bindings = ctl.plan().bindings().to_vec();
        let final_score = ctl.total_score();
        let statistics = ctl.statistics().clone();
        let assessment = ctl.assessment().cloned();
        let summary = ctl.summary();
        Ok(SimulationSummary {
            seed,
            share_code,
            strategy: plan.strategy,
            config,
            bindings,
            final_score,
            statistics,
            assessment,
            summary,
            rounds,
            events: ctl.into_display(),
        })
    }
}
