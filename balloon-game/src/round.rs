//! Single-balloon round engine: capacity draw, pumping, popping and cashing out.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::config::{RiskTier, VisualAttribute};
use crate::error::{GameError, Intent};
use crate::plan::SessionPlan;
use crate::rng::RandomSource;

/// Lifecycle phase of the current balloon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    #[default]
    Idle,
    InRound,
    Popped,
    CashedOut,
}

impl RoundPhase {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::InRound => "in round",
            Self::Popped => "popped",
            Self::CashedOut => "cashed out",
        }
    }

    /// Whether the round has resolved to one of its two outcomes.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Popped | Self::CashedOut)
    }
}

/// Outcome events emitted by the round engine. Capacity is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundEvent {
    RoundStarted {
        index: u32,
        attribute: String,
        tier_index: usize,
    },
    Pumped {
        attribute: String,
        pumps: u32,
        points: u32,
    },
    BalloonPopped {
        attribute: String,
        pumps: u32,
    },
    BalloonCashed {
        attribute: String,
        pumps: u32,
        points: u32,
    },
}

impl RoundEvent {
    /// Attribute name the event refers to.
    #[must_use]
    pub fn attribute(&self) -> &str {
        match self {
            Self::RoundStarted { attribute, .. }
            | Self::Pumped { attribute, .. }
            | Self::BalloonPopped { attribute, .. }
            | Self::BalloonCashed { attribute, .. } => attribute,
        }
    }
}

/// Events produced by a single pump: always `Pumped`, optionally `BalloonPopped`.
pub type RoundEvents = SmallVec<[RoundEvent; 2]>;

#[derive(Debug, Clone)]
struct Balloon {
    index: u32,
    attribute: VisualAttribute,
    tier_index: usize,
    capacity: u32,
    pumps: u32,
    points: u32,
}

/// Drives one balloon at a time through `Idle → InRound → {Popped, CashedOut}`.
#[derive(Debug, Clone)]
pub struct RoundEngine {
    points_per_pump: u32,
    phase: RoundPhase,
    balloon: Option<Balloon>,
}

impl RoundEngine {
    #[must_use]
    pub const fn new(points_per_pump: u32) -> Self {
        Self {
            points_per_pump,
            phase: RoundPhase::Idle,
            balloon: None,
        }
    }

    /// Start the balloon at the one-based `index` of the plan.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` when `index` is outside `1..=balloon_count` and
    /// `InvalidState` while another round is still in progress.
    pub fn start_round<R: RandomSource>(
        &mut self,
        plan: &SessionPlan,
        tiers: &[RiskTier],
        index: u32,
        rng: &mut R,
    ) -> Result<RoundEvent, GameError> {
        if self.phase == RoundPhase::InRound {
            return Err(self.invalid(Intent::Advance));
        }
        let out_of_range = GameError::OutOfRange {
            index,
            balloon_count: plan.balloon_count(),
        };
        let Some(binding) = plan.binding_at(index) else {
            return Err(out_of_range);
        };
        let Some(tier) = tiers.get(binding.tier_index) else {
            return Err(out_of_range);
        };

        let capacity = rng.uniform_int(tier.min_capacity, tier.max_capacity);
        log::debug!(
            "balloon {index}: {} ({}), capacity {capacity}",
            binding.attribute.name,
            tier.key
        );
        self.balloon = Some(Balloon {
            index,
            attribute: binding.attribute.clone(),
            tier_index: binding.tier_index,
            capacity,
            pumps: 0,
            points: 0,
        });
        self.phase = RoundPhase::InRound;
        Ok(RoundEvent::RoundStarted {
            index,
            attribute: binding.attribute.name.clone(),
            tier_index: binding.tier_index,
        })
    }

    /// Add one pump; pops the balloon once pumps reach capacity.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless a round is in progress.
    pub fn pump(&mut self) -> Result<RoundEvents, GameError> {
        if self.phase != RoundPhase::InRound {
            return Err(self.invalid(Intent::Pump));
        }
        let points_per_pump = self.points_per_pump;
        let phase = self.phase;
        let Some(balloon) = self.balloon.as_mut() else {
            return Err(GameError::InvalidState {
                intent: Intent::Pump,
                phase: phase.label(),
            });
        };
        balloon.pumps += 1;
        balloon.points = balloon.points.saturating_add(points_per_pump);
        let mut events: RoundEvents = smallvec![RoundEvent::Pumped {
            attribute: balloon.attribute.name.clone(),
            pumps: balloon.pumps,
            points: balloon.points,
        }];
        if balloon.pumps >= balloon.capacity {
            log::debug!(
                "balloon {} popped after {} pumps",
                balloon.index,
                balloon.pumps
            );
            events.push(RoundEvent::BalloonPopped {
                attribute: balloon.attribute.name.clone(),
                pumps: balloon.pumps,
            });
            self.phase = RoundPhase::Popped;
        }
        Ok(events)
    }

    /// Bank the current round's points.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless a round is in progress.
    pub fn cash_out(&mut self) -> Result<RoundEvent, GameError> {
        if self.phase != RoundPhase::InRound {
            return Err(self.invalid(Intent::CashOut));
        }
        let Some(balloon) = self.balloon.as_ref() else {
            return Err(self.invalid(Intent::CashOut));
        };
        let event = RoundEvent::BalloonCashed {
            attribute: balloon.attribute.name.clone(),
            pumps: balloon.pumps,
            points: balloon.points,
        };
        self.phase = RoundPhase::CashedOut;
        Ok(event)
    }

    /// Drop the current balloon and return to `Idle`.
    pub fn clear(&mut self) {
        self.balloon = None;
        self.phase = RoundPhase::Idle;
    }

    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    #[must_use]
    pub const fn points_per_pump(&self) -> u32 {
        self.points_per_pump
    }

    /// One-based index of the current balloon.
    #[must_use]
    pub fn round_index(&self) -> Option<u32> {
        self.balloon.as_ref().map(|b| b.index)
    }

    #[must_use]
    pub fn attribute(&self) -> Option<&VisualAttribute> {
        self.balloon.as_ref().map(|b| &b.attribute)
    }

    #[must_use]
    pub fn tier_index(&self) -> Option<usize> {
        self.balloon.as_ref().map(|b| b.tier_index)
    }

    #[must_use]
    pub fn pumps(&self) -> u32 {
        self.balloon.as_ref().map_or(0, |b| b.pumps)
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.balloon.as_ref().map_or(0, |b| b.points)
    }

    /// Hidden capacity of the current balloon, for test harnesses only.
    #[must_use]
    pub fn capacity_for_testing(&self) -> Option<u32> {
        self.balloon.as_ref().map(|b| b.capacity)
    }

    fn invalid(&self, intent: Intent) -> GameError {
        GameError::InvalidState {
            intent,
            phase: self.phase.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rng::RngBundle;

    /// Always draws the minimum of the requested range.
    struct MinSource;

    impl RandomSource for MinSource {
        fn uniform_int(&mut self, min: u32, _max: u32) -> u32 {
            min
        }
    }

    fn setup(seed: u64) -> (GameConfig, SessionPlan, RngBundle) {
        let cfg = GameConfig::default();
        let mut rngs = RngBundle::from_user_seed(seed);
        let plan = SessionPlan::from_config(&cfg, rngs.plan());
        (cfg, plan, rngs)
    }

    #[test]
    fn start_round_draws_capacity_inside_tier() {
        let (cfg, plan, mut rngs) = setup(3);
        let mut engine = RoundEngine::new(cfg.points_per_pump);
        for index in 1..=plan.balloon_count() {
            engine.clear();
            let event = engine
                .start_round(&plan, &cfg.tiers, index, rngs.capacity())
                .unwrap();
            let RoundEvent::RoundStarted { tier_index, .. } = event else {
                panic!("expected RoundStarted");
            };
            let capacity = engine.capacity_for_testing().unwrap();
            assert!(cfg.tiers[tier_index].contains(capacity));
            assert_eq!(engine.phase(), RoundPhase::InRound);
            assert_eq!(engine.pumps(), 0);
        }
    }

    #[test]
    fn start_round_rejects_out_of_range_index() {
        let (cfg, plan, mut rngs) = setup(4);
        let mut engine = RoundEngine::new(cfg.points_per_pump);
        let err = engine
            .start_round(&plan, &cfg.tiers, 16, rngs.capacity())
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::OutOfRange {
                index: 16,
                balloon_count: 15
            }
        ));
        assert!(matches!(
            engine.start_round(&plan, &cfg.tiers, 0, rngs.capacity()),
            Err(GameError::OutOfRange { index: 0, .. })
        ));
        assert_eq!(engine.phase(), RoundPhase::Idle);
    }

    #[test]
    fn pumping_to_capacity_pops_and_forfeits() {
        let (cfg, plan, _) = setup(5);
        let mut engine = RoundEngine::new(cfg.points_per_pump);
        engine
            .start_round(&plan, &cfg.tiers, 1, &mut MinSource)
            .unwrap();
        let capacity = engine.capacity_for_testing().unwrap();
        for pump in 1..capacity {
            let events = engine.pump().unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(
                events[0],
                RoundEvent::Pumped {
                    attribute: engine.attribute().unwrap().name.clone(),
                    pumps: pump,
                    points: pump * 5,
                }
            );
        }
        let events = engine.pump().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], RoundEvent::BalloonPopped { pumps, .. } if pumps == capacity));
        assert_eq!(engine.phase(), RoundPhase::Popped);

        assert!(matches!(
            engine.pump(),
            Err(GameError::InvalidState {
                intent: Intent::Pump,
                phase: "popped"
            })
        ));
        assert!(engine.cash_out().is_err());
    }

    #[test]
    fn cash_out_reports_points_and_blocks_repeat() {
        let (cfg, plan, mut rngs) = setup(6);
        let mut engine = RoundEngine::new(cfg.points_per_pump);
        engine
            .start_round(&plan, &cfg.tiers, 2, rngs.capacity())
            .unwrap();
        engine.pump().unwrap();
        engine.pump().unwrap();
        let event = engine.cash_out().unwrap();
        assert!(matches!(
            event,
            RoundEvent::BalloonCashed {
                pumps: 2,
                points: 10,
                ..
            }
        ));
        assert_eq!(engine.phase(), RoundPhase::CashedOut);
        assert!(matches!(
            engine.cash_out(),
            Err(GameError::InvalidState {
                intent: Intent::CashOut,
                ..
            })
        ));
    }

    #[test]
    fn cash_out_without_pumps_banks_zero() {
        let (cfg, plan, mut rngs) = setup(7);
        let mut engine = RoundEngine::new(cfg.points_per_pump);
        engine
            .start_round(&plan, &cfg.tiers, 1, rngs.capacity())
            .unwrap();
        assert!(matches!(
            engine.cash_out().unwrap(),
            RoundEvent::BalloonCashed { points: 0, .. }
        ));
    }

    #[test]
    fn actions_before_start_are_rejected() {
        let mut engine = RoundEngine::new(5);
        assert!(matches!(
            engine.pump(),
            Err(GameError::InvalidState { phase: "idle", .. })
        ));
        assert!(engine.cash_out().is_err());
    }

    #[test]
    fn cannot_restart_an_unresolved_round() {
        let (cfg, plan, mut rngs) = setup(8);
        let mut engine = RoundEngine::new(cfg.points_per_pump);
        engine
            .start_round(&plan, &cfg.tiers, 1, rngs.capacity())
            .unwrap();
        assert!(engine
            .start_round(&plan, &cfg.tiers, 2, rngs.capacity())
            .is_err());
        assert_eq!(engine.round_index(), Some(1));
    }
}
