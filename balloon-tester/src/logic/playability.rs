use anyhow::{Context, Result, ensure};
use balloon_game::numbers::{ratio, usize_to_f64};
use balloon_game::{TierBinding, Verdict};
use std::collections::BTreeMap;

use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};
use crate::logic::policy::GameplayStrategy;
use crate::logic::seeds::SeedInfo;

const PLAYABILITY_SCENARIOS: &[(TierBinding, GameplayStrategy)] = &[
    (TierBinding::Randomized, GameplayStrategy::Timid),
    (TierBinding::Randomized, GameplayStrategy::Steady),
    (TierBinding::Randomized, GameplayStrategy::Greedy),
    (TierBinding::Randomized, GameplayStrategy::Adaptive),
    (TierBinding::Randomized, GameplayStrategy::Random),
    (TierBinding::Randomized, GameplayStrategy::Oracle),
    (TierBinding::Fixed, GameplayStrategy::Adaptive),
    (TierBinding::Fixed, GameplayStrategy::Oracle),
];

const WARN_LIMIT: usize = 2;

/// Per-session numbers the playability sweep cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayabilityMetrics {
    pub final_score: u32,
    pub balloon_count: u32,
    pub balloons_cashed: u32,
    pub balloons_popped: u32,
    pub total_pumps: u32,
    pub success_rate_pct: f64,
    pub avg_pumps: f64,
    pub high_avg_pumps: Option<f64>,
    pub low_avg_pumps: Option<f64>,
    pub verdict: Option<Verdict>,
}

impl PlayabilityMetrics {
    #[must_use]
    pub fn from_summary(summary: &SimulationSummary) -> Self {
        let overall = summary.statistics.overall;
        Self {
            final_score: summary.final_score,
            balloon_count: overall.balloon_count,
            balloons_cashed: overall.balloons_cashed,
            balloons_popped: overall.balloons_popped,
            total_pumps: overall.total_pumps,
            success_rate_pct: overall.success_rate_pct(),
            avg_pumps: overall.avg_pumps(),
            high_avg_pumps: summary.tier_avg_pumps(summary.config.high_tier_index()),
            low_avg_pumps: summary.tier_avg_pumps(summary.config.low_tier_index()),
            verdict: summary.assessment.as_ref().map(|a| a.verdict),
        }
    }

    /// Whether the player pumped low-risk balloons harder than high-risk ones.
    #[must_use]
    pub fn adapted(&self) -> bool {
        matches!(
            (self.high_avg_pumps, self.low_avg_pumps),
            (Some(high), Some(low)) if low > high
        )
    }
}

#[derive(Debug, Clone)]
pub struct PlayabilityRecord {
    pub scenario_name: String,
    pub binding: TierBinding,
    pub strategy: GameplayStrategy,
    pub seed_code: String,
    pub seed_value: u64,
    pub metrics: PlayabilityMetrics,
}

#[derive(Debug, Clone)]
pub struct PlayabilityAggregate {
    pub scenario_name: String,
    pub strategy: GameplayStrategy,
    pub iterations: usize,
    pub mean_score: f64,
    pub std_score: f64,
    pub mean_success_pct: f64,
    pub std_success_pct: f64,
    pub mean_avg_pumps: f64,
    pub pop_rate: f64,
    pub adaptation_rate: f64,
    pub verdict_counts: Vec<(Verdict, usize)>,
}

impl PlayabilityAggregate {
    #[must_use]
    pub fn verdict_share(&self, verdict: Verdict) -> f64 {
        let count = self
            .verdict_counts
            .iter()
            .find(|(v, _)| *v == verdict)
            .map_or(0, |(_, count)| *count);
        if self.iterations == 0 {
            0.0
        } else {
            usize_to_f64(count) / usize_to_f64(self.iterations)
        }
    }

    /// Most frequent verdict, ties resolved in table order.
    #[must_use]
    pub fn dominant_verdict(&self) -> Option<Verdict> {
        self.verdict_counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .fold(None::<(Verdict, usize)>, |best, &(verdict, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((verdict, count)),
            })
            .map(|(verdict, _)| verdict)
    }
}

const fn binding_label(binding: TierBinding) -> &'static str {
    match binding {
        TierBinding::Randomized => "Randomized",
        TierBinding::Fixed => "Fixed",
    }
}

pub fn run_playability_analysis(
    tester: &GameTester,
    seeds: &[SeedInfo],
    iterations: usize,
) -> Result<Vec<PlayabilityRecord>> {
    run_playability_analysis_with(tester, seeds, iterations, playability_plan)
}

fn playability_plan(binding: TierBinding, strategy: GameplayStrategy) -> SimulationPlan {
    let plan = SimulationPlan::new(strategy);
    let plan = match binding {
        TierBinding::Randomized => {
            plan.with_config(|config| config.with_binding(TierBinding::Randomized))
        }
        TierBinding::Fixed => plan.with_config(|config| config.with_binding(TierBinding::Fixed)),
    };
    plan.with_expectation(balloons_resolved_expectation)
}

fn balloons_resolved_expectation(summary: &SimulationSummary) -> Result<()> {
    let overall = summary.statistics.overall;
    ensure!(
        overall.balloons_cashed + overall.balloons_popped == overall.balloon_count,
        "{} balloons played but {} cashed and {} popped",
        overall.balloon_count,
        overall.balloons_cashed,
        overall.balloons_popped
    );
    ensure!(
        summary.assessment.is_some(),
        "finished session has no assessment"
    );
    Ok(())
}

fn run_playability_analysis_with<F>(
    tester: &GameTester,
    seeds: &[SeedInfo],
    iterations: usize,
    mut plan_builder: F,
) -> Result<Vec<PlayabilityRecord>>
where
    F: FnMut(TierBinding, GameplayStrategy) -> SimulationPlan,
{
    let iterations = iterations.max(1);
    let mut records = Vec::with_capacity(seeds.len() * PLAYABILITY_SCENARIOS.len() * iterations);

    for &(binding, strategy) in PLAYABILITY_SCENARIOS {
        for seed in seeds.iter().filter(|seed| seed.matches_binding(binding)) {
            for iteration in 0..iterations {
                let iteration_offset = u64::try_from(iteration).unwrap_or(0);
                let iteration_seed = seed.seed.wrapping_add(iteration_offset);
                let plan = plan_builder(binding, strategy);
                let context = format!(
                    "Playability run failed for {} binding, strategy {strategy}, seed {} (iteration {})",
                    binding_label(binding),
                    seed.seed,
                    iteration + 1
                );
                let summary = tester
                    .run_plan(&plan, iteration_seed)
                    .with_context(|| context.clone())?;
                for expectation in &plan.expectations {
                    expectation
                        .evaluate(&summary)
                        .with_context(|| context.clone())?;
                }

                let seed_code = if iteration == 0 {
                    seed.share_code_for(binding)
                } else {
                    summary.share_code.clone()
                };
                records.push(PlayabilityRecord {
                    scenario_name: format!("{} - {strategy}", binding_label(binding)),
                    binding,
                    strategy,
                    seed_code,
                    seed_value: iteration_seed,
                    metrics: PlayabilityMetrics::from_summary(&summary),
                });
            }
        }
    }

    Ok(records)
}

pub fn aggregate_playability(records: &[PlayabilityRecord]) -> Vec<PlayabilityAggregate> {
    let mut aggregates: BTreeMap<String, AggregateBuilder> = BTreeMap::new();
    let mut warn_counts: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        let entry = aggregates
            .entry(record.scenario_name.clone())
            .or_insert_with(|| AggregateBuilder::new(record));
        entry.ingest(&record.metrics);
        emit_record_warnings(record, &mut warn_counts);
    }

    aggregates
        .into_values()
        .map(AggregateBuilder::finish)
        .collect()
}

/// Sanity targets every sweep must meet regardless of seeds.
pub fn validate_playability_targets(
    aggregates: &[PlayabilityAggregate],
    records: &[PlayabilityRecord],
) -> Result<()> {
    for aggregate in aggregates {
        match aggregate.strategy {
            GameplayStrategy::Oracle => {
                ensure!(
                    aggregate.pop_rate.abs() < f64::EPSILON,
                    "{} popped {:.1}% of balloons",
                    aggregate.scenario_name,
                    aggregate.pop_rate * 100.0
                );
                ensure!(
                    (aggregate.verdict_share(Verdict::Excellent) - 1.0).abs() < f64::EPSILON,
                    "{} should always earn an Excellent verdict",
                    aggregate.scenario_name
                );
            }
            GameplayStrategy::Greedy => {
                ensure!(
                    (aggregate.pop_rate - 1.0).abs() < f64::EPSILON,
                    "{} banked a balloon",
                    aggregate.scenario_name
                );
                ensure!(
                    aggregate.mean_score.abs() < f64::EPSILON,
                    "{} scored {:.1} on average",
                    aggregate.scenario_name,
                    aggregate.mean_score
                );
            }
            _ => {}
        }
    }

    for record in records
        .iter()
        .filter(|r| r.strategy == GameplayStrategy::Adaptive && r.metrics.balloon_count >= 15)
    {
        ensure!(
            record.metrics.adapted(),
            "Adaptive run {} ({}) pumped low-risk balloons no harder than high-risk ones",
            record.seed_code,
            record.scenario_name
        );
    }
    Ok(())
}

fn push_limited_warn(
    warn_counts: &mut BTreeMap<String, usize>,
    key: &str,
    limit: usize,
    message: impl FnOnce() -> String,
) {
    let counter = warn_counts.entry(key.to_string()).or_insert(0);
    if *counter < limit {
        log::warn!("{}", message());
    }
    *counter += 1;
}

fn emit_record_warnings(record: &PlayabilityRecord, warn_counts: &mut BTreeMap<String, usize>) {
    let metrics = &record.metrics;
    if record.strategy != GameplayStrategy::Greedy
        && metrics.balloon_count > 0
        && metrics.balloons_cashed == 0
    {
        push_limited_warn(
            warn_counts,
            &format!("{}::never_banked", record.scenario_name),
            WARN_LIMIT,
            || {
                format!(
                    "{} seed {} never banked a balloon",
                    record.scenario_name, record.seed_code
                )
            },
        );
    }
    if metrics.verdict == Some(Verdict::NoAdaptation) && metrics.adapted() {
        push_limited_warn(
            warn_counts,
            &format!("{}::verdict_mismatch", record.scenario_name),
            WARN_LIMIT,
            || {
                format!(
                    "{} seed {} adapted pump counts yet met no assessment condition",
                    record.scenario_name, record.seed_code
                )
            },
        );
    }
}

#[derive(Debug, Clone)]
struct AggregateBuilder {
    scenario_name: String,
    strategy: GameplayStrategy,
    stats_score: RunningStats,
    stats_success: RunningStats,
    avg_pumps_sum: f64,
    iterations: u32,
    balloons: u32,
    popped: u32,
    adapted: u32,
    verdicts: BTreeMap<usize, usize>,
}

impl AggregateBuilder {
    fn new(record: &PlayabilityRecord) -> Self {
        Self {
            scenario_name: record.scenario_name.clone(),
            strategy: record.strategy,
            stats_score: RunningStats::default(),
            stats_success: RunningStats::default(),
            avg_pumps_sum: 0.0,
            iterations: 0,
            balloons: 0,
            popped: 0,
            adapted: 0,
            verdicts: BTreeMap::new(),
        }
    }

    fn ingest(&mut self, metrics: &PlayabilityMetrics) {
        self.iterations += 1;
        self.stats_score.add(f64::from(metrics.final_score));
        self.stats_success.add(metrics.success_rate_pct);
        self.avg_pumps_sum += metrics.avg_pumps;
        self.balloons = self.balloons.saturating_add(metrics.balloon_count);
        self.popped = self.popped.saturating_add(metrics.balloons_popped);
        if metrics.adapted() {
            self.adapted += 1;
        }
        if let Some(slot) = metrics
            .verdict
            .and_then(|verdict| Verdict::ALL.iter().position(|v| *v == verdict))
        {
            *self.verdicts.entry(slot).or_default() += 1;
        }
    }

    fn finish(self) -> PlayabilityAggregate {
        let denom = f64::from(self.iterations.max(1));
        let verdict_counts = Verdict::ALL
            .iter()
            .enumerate()
            .map(|(slot, verdict)| (*verdict, self.verdicts.get(&slot).copied().unwrap_or(0)))
            .collect();
        PlayabilityAggregate {
            scenario_name: self.scenario_name,
            strategy: self.strategy,
            iterations: usize::try_from(self.iterations).unwrap_or(usize::MAX),
            mean_score: self.stats_score.mean(),
            std_score: self.stats_score.std_dev(),
            mean_success_pct: self.stats_success.mean(),
            std_success_pct: self.stats_success.std_dev(),
            mean_avg_pumps: self.avg_pumps_sum / denom,
            pop_rate: ratio(self.popped, self.balloons),
            adaptation_rate: f64::from(self.adapted) / denom,
            verdict_counts,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct RunningStats {
    count: u32,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let count = f64::from(self.count);
        let delta = value - self.mean;
        self.mean += delta / count;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    const fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    fn variance(&self) -> f64 {
        if self.count > 1 {
            self.m2 / f64::from(self.count - 1)
        } else {
            0.0
        }
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}
