use anyhow::{Result, ensure};
use balloon_game::DisplayEvent;

use crate::logic::game_tester::SimulationSummary;
use crate::logic::{GameplayStrategy, SimulationPlan};

pub fn plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Steady).with_expectation(smoke_expectation)
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let expected_rounds = usize::try_from(summary.config.balloon_count)?;
    ensure!(
        summary.rounds.len() == expected_rounds,
        "played {} of {expected_rounds} balloons",
        summary.rounds.len()
    );

    let events = summary.events.events();
    ensure!(
        matches!(events.first(), Some(DisplayEvent::SessionStarted { .. })),
        "event stream must open with session_started"
    );
    ensure!(
        matches!(events.last(), Some(DisplayEvent::SessionEnded { .. })),
        "event stream must close with session_ended"
    );
    ensure!(
        summary.events.count("session_ended") == 1,
        "session ended more than once"
    );

    let banked: u32 = summary.rounds.iter().map(|r| r.banked).sum();
    ensure!(
        banked == summary.final_score,
        "banked {banked} but final score is {}",
        summary.final_score
    );
    ensure!(
        summary.summary.final_score == summary.final_score,
        "results screen disagrees with the session score"
    );
    Ok(())
}
