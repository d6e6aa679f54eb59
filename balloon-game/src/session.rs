//! Session lifecycle: plan, rounds, pending advance, end-of-session assessment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assessment::{RiskAssessment, assess};
use crate::config::{GameConfig, VisualAttribute};
use crate::display::{DisplayEvent, DisplaySink};
use crate::error::{GameError, Intent};
use crate::plan::SessionPlan;
use crate::rng::RngBundle;
use crate::round::{RoundEngine, RoundEvent, RoundPhase};
use crate::seed::{ShareCode, canonical_share_code, parse_share_code};
use crate::statistics::{Statistics, StatisticsTracker};
use crate::summary::{SessionSummary, session_summary};
use crate::timer::PendingAdvance;

/// Controller-level phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Plan built, waiting for `start()`.
    #[default]
    Ready,
    Playing,
    /// A balloon popped; the next one starts when the delay elapses.
    AwaitingAdvance,
    Ended,
}

impl SessionPhase {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::AwaitingAdvance => "awaiting advance",
            Self::Ended => "ended",
        }
    }
}

/// What a single pump did to the current balloon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    Inflated { pumps: u32, points: u32 },
    Popped { pumps: u32 },
}

impl PumpOutcome {
    #[must_use]
    pub const fn popped(self) -> bool {
        matches!(self, Self::Popped { .. })
    }
}

/// Per-session data replaced wholesale on reset.
#[derive(Debug, Clone)]
pub struct Session {
    plan: SessionPlan,
    round_index: u32,
    total_score: u32,
    tracker: StatisticsTracker,
}

impl Session {
    fn new(plan: SessionPlan) -> Self {
        let tracker = StatisticsTracker::new(&plan);
        Self {
            plan,
            round_index: 0,
            total_score: 0,
            tracker,
        }
    }

    #[must_use]
    pub const fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    /// One-based index of the current balloon; 0 before the first round.
    #[must_use]
    pub const fn round_index(&self) -> u32 {
        self.round_index
    }

    #[must_use]
    pub const fn total_score(&self) -> u32 {
        self.total_score
    }

    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        self.tracker.statistics()
    }
}

/// Orchestrates one session at a time and reports to a [`DisplaySink`].
#[derive(Debug)]
pub struct SessionController<D: DisplaySink> {
    config: GameConfig,
    share: ShareCode,
    rngs: RngBundle,
    session: Session,
    engine: RoundEngine,
    phase: SessionPhase,
    pending: Option<PendingAdvance>,
    assessment: Option<RiskAssessment>,
    display: D,
}

impl<D: DisplaySink> SessionController<D> {
    /// Build a controller for a validated configuration and explicit seed.
    ///
    /// The session plays the seed's canonical share-code seed, so
    /// [`Self::share_code`] always replays it.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Config` when the configuration is invalid.
    pub fn new(config: GameConfig, seed: u64, display: D) -> Result<Self, GameError> {
        config.validate()?;
        let share = canonical_share_code(config.binding, seed);
        let mut rngs = RngBundle::from_user_seed(share.seed);
        let plan = SessionPlan::from_config(&config, rngs.plan());
        let engine = RoundEngine::new(config.points_per_pump);
        log::debug!("session controller ready ({} from seed {seed:#x})", share.code);
        Ok(Self {
            config,
            share,
            rngs,
            session: Session::new(plan),
            engine,
            phase: SessionPhase::Ready,
            pending: None,
            assessment: None,
            display,
        })
    }

    /// Build a controller seeded from OS entropy; replay it via [`Self::share_code`].
    ///
    /// # Errors
    ///
    /// Returns `GameError::Config` when the configuration is invalid.
    pub fn with_random_seed(config: GameConfig, display: D) -> Result<Self, GameError> {
        Self::new(config, rand::random::<u64>(), display)
    }

    /// Replay a session from a share code; the code's mode overrides `config.binding`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidShareCode` when the code does not parse and
    /// `GameError::Config` when the configuration is invalid.
    pub fn from_share_code(config: GameConfig, code: &str, display: D) -> Result<Self, GameError> {
        let ShareCode { binding, seed, .. } =
            parse_share_code(code).ok_or_else(|| GameError::InvalidShareCode {
                code: code.trim().to_string(),
            })?;
        Self::new(config.with_binding(binding), seed, display)
    }

    /// Begin the session and start the first balloon.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the controller is `Ready`.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != SessionPhase::Ready {
            return Err(self.reject(Intent::Start));
        }
        self.display.notify(&DisplayEvent::SessionStarted {
            total_balloons: self.session.plan.balloon_count(),
            bindings: self.session.plan.bindings().to_vec(),
        });
        self.advance()
    }

    /// Pump the current balloon once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` outside `Playing`, including while an advance is pending.
    pub fn pump(&mut self) -> Result<PumpOutcome, GameError> {
        if self.phase != SessionPhase::Playing {
            return Err(self.reject(Intent::Pump));
        }
        let events = self.engine.pump()?;
        let mut outcome = PumpOutcome::Inflated {
            pumps: self.engine.pumps(),
            points: self.engine.points(),
        };
        for event in &events {
            self.session.tracker.record(event);
            match event {
                RoundEvent::Pumped { pumps, points, .. } => {
                    self.display.notify(&DisplayEvent::Pumped {
                        pumps: *pumps,
                        points: *points,
                    });
                }
                RoundEvent::BalloonPopped { attribute, pumps } => {
                    self.display.notify(&DisplayEvent::BalloonPopped {
                        attribute: attribute.clone(),
                    });
                    outcome = PumpOutcome::Popped { pumps: *pumps };
                }
                RoundEvent::RoundStarted { .. } | RoundEvent::BalloonCashed { .. } => {}
            }
        }
        if outcome.popped() {
            self.schedule_advance()?;
        }
        Ok(outcome)
    }

    /// Bank the current balloon's points and move straight to the next balloon.
    ///
    /// Returns the points banked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` outside `Playing`.
    pub fn cash_out(&mut self) -> Result<u32, GameError> {
        if self.phase != SessionPhase::Playing {
            return Err(self.reject(Intent::CashOut));
        }
        let event = self.engine.cash_out()?;
        self.session.tracker.record(&event);
        let points = self.engine.points();
        self.session.total_score = self.session.total_score.saturating_add(points);
        self.display.notify(&DisplayEvent::BalloonCashed {
            attribute: event.attribute().to_string(),
            points,
            total_score: self.session.total_score,
        });
        self.advance()?;
        Ok(points)
    }

    /// Discard the session and build a fresh, un-started one from the next share code.
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("reset cancelled a pending advance");
        }
        // The successor's word index always differs, so the code changes on every reset.
        self.share = canonical_share_code(self.config.binding, self.share.seed.wrapping_add(1));
        self.rngs = RngBundle::from_user_seed(self.share.seed);
        log::debug!("reset to {}", self.share.code);
        let plan = SessionPlan::from_config(&self.config, self.rngs.plan());
        self.session = Session::new(plan);
        self.engine.clear();
        self.assessment = None;
        self.phase = SessionPhase::Ready;
    }

    /// Reset and immediately start the new session.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::start`].
    pub fn play_again(&mut self) -> Result<(), GameError> {
        self.reset();
        self.start()
    }

    /// Advance the logical clock; starts the next balloon once the pop delay has elapsed.
    ///
    /// Returns whether a pending advance fired.
    ///
    /// # Errors
    ///
    /// Propagates errors from starting the next round.
    pub fn advance_time(&mut self, elapsed: Duration) -> Result<bool, GameError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(false);
        };
        if !pending.elapse(elapsed) {
            return Ok(false);
        }
        self.fire_pending_advance()
    }

    /// Fire a pending advance regardless of the remaining delay.
    ///
    /// # Errors
    ///
    /// Propagates errors from starting the next round.
    pub fn fire_pending_advance(&mut self) -> Result<bool, GameError> {
        if self.pending.take().is_none() {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    fn schedule_advance(&mut self) -> Result<(), GameError> {
        let delay = self.config.pop_delay();
        self.phase = SessionPhase::AwaitingAdvance;
        self.pending = Some(PendingAdvance::new(delay));
        self.display.notify(&DisplayEvent::AdvanceScheduled { delay });
        if delay.is_zero() {
            self.fire_pending_advance()?;
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<(), GameError> {
        let next = self.session.round_index + 1;
        if next > self.session.plan.balloon_count() {
            self.end_session();
            return Ok(());
        }
        self.engine.clear();
        let event = self.engine.start_round(
            &self.session.plan,
            &self.config.tiers,
            next,
            self.rngs.capacity(),
        )?;
        self.session.tracker.record(&event);
        self.session.round_index = next;
        self.phase = SessionPhase::Playing;
        self.display.notify(&DisplayEvent::RoundStarted {
            index: next,
            attribute: event.attribute().to_string(),
        });
        Ok(())
    }

    fn end_session(&mut self) {
        self.engine.clear();
        self.pending = None;
        self.phase = SessionPhase::Ended;
        let statistics = self.session.tracker.snapshot();
        let assessment = assess(
            &statistics,
            &self.session.plan,
            &self.config.tiers,
            &self.config.thresholds,
        );
        log::debug!(
            "session ended: score {}, verdict {}",
            self.session.total_score,
            assessment.verdict
        );
        self.display.notify(&DisplayEvent::SessionEnded {
            final_score: self.session.total_score,
            statistics,
            risk_assessment: Box::new(assessment.clone()),
        });
        self.assessment = Some(assessment);
    }

    fn reject(&self, intent: Intent) -> GameError {
        let err = GameError::InvalidState {
            intent,
            phase: self.phase.label(),
        };
        log::warn!("rejected intent: {err}");
        err
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn round_phase(&self) -> RoundPhase {
        self.engine.phase()
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Ended)
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn plan(&self) -> &SessionPlan {
        &self.session.plan
    }

    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        self.session.statistics()
    }

    #[must_use]
    pub const fn total_score(&self) -> u32 {
        self.session.total_score
    }

    #[must_use]
    pub const fn round_index(&self) -> u32 {
        self.session.round_index
    }

    #[must_use]
    pub fn current_attribute(&self) -> Option<&VisualAttribute> {
        self.engine.attribute()
    }

    #[must_use]
    pub fn current_pumps(&self) -> u32 {
        self.engine.pumps()
    }

    #[must_use]
    pub fn current_points(&self) -> u32 {
        self.engine.points()
    }

    #[must_use]
    pub const fn pending_advance(&self) -> Option<&PendingAdvance> {
        self.pending.as_ref()
    }

    /// Assessment of the last finished session.
    #[must_use]
    pub const fn assessment(&self) -> Option<&RiskAssessment> {
        self.assessment.as_ref()
    }

    /// Results-screen numbers for the current session.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        session_summary(
            self.session.total_score,
            self.session.statistics(),
            &self.session.plan,
            &self.config.tiers,
        )
    }

    /// Seed the current session plays; always the seed of [`Self::share_code`].
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.share.seed
    }

    /// Share code that replays the current session's plan and capacities.
    #[must_use]
    pub fn share_code(&self) -> String {
        self.share.code.clone()
    }

    /// Hidden capacity of the current balloon, for test harnesses only.
    #[must_use]
    pub fn capacity_for_testing(&self) -> Option<u32> {
        self.engine.capacity_for_testing()
    }

    #[must_use]
    pub const fn display(&self) -> &D {
        &self.display
    }

    pub const fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    #[must_use]
    pub fn into_display(self) -> D {
        self.display
    }
}
