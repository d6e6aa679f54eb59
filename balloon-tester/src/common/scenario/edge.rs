use anyhow::{Context, Result, ensure};
use balloon_game::{
    DisplayEvent, GameConfig, NullDisplay, SessionController, TierBinding, parse_share_code,
};
use regex::Regex;

use crate::logic::game_tester::{GameTester, SimulationSummary};
use crate::logic::{GameplayStrategy, SimulationPlan};

const SHARE_CODE_SHAPE: &str = r"^(RN|FX)-[A-Z]+\d{2}$";

pub fn empty_session_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Steady)
        .with_config(|config| config.with_balloon_count(0))
        .with_expectation(empty_session_expectation)
}

pub fn fixed_binding_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Adaptive)
        .with_config(|config| config.with_binding(TierBinding::Fixed))
        .with_expectation(fixed_binding_expectation)
}

pub fn share_code_replay_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Random).with_expectation(share_code_replay_expectation)
}

fn empty_session_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.rounds.is_empty(), "an empty session played balloons");
    let kinds: Vec<&str> = summary
        .events
        .events()
        .iter()
        .map(DisplayEvent::kind)
        .collect();
    ensure!(
        kinds == ["session_started", "session_ended"],
        "unexpected events for an empty session: {kinds:?}"
    );
    ensure!(summary.statistics.is_zeroed(), "statistics moved without play");
    ensure!(summary.final_score == 0, "empty session scored");
    Ok(())
}

fn fixed_binding_expectation(summary: &SimulationSummary) -> Result<()> {
    for binding in &summary.bindings {
        let expected = summary
            .config
            .palette
            .get(binding.tier_index)
            .with_context(|| format!("tier {} has no palette color", binding.tier_index))?;
        ensure!(
            binding.attribute == *expected,
            "tier {} bound to {} instead of {}",
            binding.tier_index,
            binding.attribute.name,
            expected.name
        );
    }
    ensure!(
        summary.share_code.starts_with("FX-"),
        "fixed sessions must share FX codes, got {}",
        summary.share_code
    );
    Ok(())
}

fn share_code_replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let shape = Regex::new(SHARE_CODE_SHAPE).context("share code pattern")?;
    ensure!(
        shape.is_match(&summary.share_code),
        "malformed share code {}",
        summary.share_code
    );
    let share = parse_share_code(&summary.share_code)
        .with_context(|| format!("share code {} does not parse", summary.share_code))?;
    ensure!(
        share.binding == summary.config.binding,
        "share code lost the binding mode"
    );
    ensure!(share.code == summary.share_code, "share code is not canonical");

    let rebuilt = SessionController::from_share_code(
        summary.config.clone(),
        &summary.share_code,
        NullDisplay,
    )?;
    ensure!(
        rebuilt.plan().bindings() == summary.bindings.as_slice(),
        "{} rebuilds different color bindings",
        summary.share_code
    );
    let played: Vec<&str> = summary.rounds.iter().map(|r| r.attribute.as_str()).collect();
    ensure!(
        rebuilt.plan().sequence_names() == played,
        "{} rebuilds a different balloon order",
        summary.share_code
    );

    let replay_config: GameConfig = summary.config.clone().with_binding(share.binding);
    let tester = GameTester::new(replay_config, false);
    let plan = SimulationPlan::new(summary.strategy);
    let first = tester.run_plan(&plan, share.seed)?;
    let second = tester.run_plan(&plan, share.seed)?;
    ensure!(
        first.events.events() == second.events.events(),
        "replaying {} diverged",
        summary.share_code
    );
    ensure!(
        first.share_code == summary.share_code,
        "replayed session re-encodes to {}",
        first.share_code
    );
    Ok(())
}
