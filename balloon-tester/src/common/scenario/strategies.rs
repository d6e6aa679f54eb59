use anyhow::{Context, Result, ensure};
use balloon_game::Verdict;

use crate::logic::game_tester::SimulationSummary;
use crate::logic::{GameplayStrategy, SimulationPlan};

const TIMID_PUMPS: u32 = 2;

pub fn oracle_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Oracle).with_expectation(oracle_expectation)
}

pub fn greedy_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Greedy).with_expectation(greedy_expectation)
}

pub fn timid_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Timid).with_expectation(timid_expectation)
}

pub fn adaptive_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Adaptive).with_expectation(adaptive_expectation)
}

fn verdict(summary: &SimulationSummary) -> Result<Verdict> {
    summary
        .assessment
        .as_ref()
        .map(|a| a.verdict)
        .context("finished session has no assessment")
}

fn oracle_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.popped_count() == 0,
        "oracle popped {} balloons",
        summary.popped_count()
    );
    let verdict = verdict(summary)?;
    ensure!(
        verdict == Verdict::Excellent,
        "oracle play earned {verdict} instead of Excellent"
    );
    Ok(())
}

fn greedy_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.popped_count() == summary.rounds.len(),
        "greedy play banked {} balloons",
        summary.rounds.len() - summary.popped_count()
    );
    ensure!(summary.final_score == 0, "greedy play scored {}", summary.final_score);
    ensure!(
        summary.events.count("advance_scheduled") == summary.rounds.len(),
        "every pop must schedule an advance"
    );
    ensure!(
        summary.statistics.overall.success_rate_pct().abs() < f64::EPSILON,
        "success rate should be zero"
    );
    Ok(())
}

fn timid_expectation(summary: &SimulationSummary) -> Result<()> {
    let lowest_floor = summary
        .config
        .tiers
        .iter()
        .map(|tier| tier.min_capacity)
        .min()
        .unwrap_or(0);
    if lowest_floor <= TIMID_PUMPS {
        return Ok(());
    }
    ensure!(summary.popped_count() == 0, "timid play popped a balloon");
    let expected = summary.config.balloon_count * TIMID_PUMPS * summary.config.points_per_pump;
    ensure!(
        summary.final_score == expected,
        "timid play scored {} instead of {expected}",
        summary.final_score
    );
    Ok(())
}

fn adaptive_expectation(summary: &SimulationSummary) -> Result<()> {
    let high = summary
        .tier_avg_pumps(summary.config.high_tier_index())
        .context("no high-risk balloon was played")?;
    let low = summary
        .tier_avg_pumps(summary.config.low_tier_index())
        .context("no low-risk balloon was played")?;
    ensure!(
        low > high,
        "adaptive play averaged {low:.1} pumps on low risk but {high:.1} on high risk"
    );
    Ok(())
}
