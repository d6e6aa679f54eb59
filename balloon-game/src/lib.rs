//! Balloon Risk Game Engine
//!
//! Platform-agnostic core of the balloon pumping risk game: tier binding,
//! balloon sequencing, round resolution, statistics and the post-session
//! risk-adaptation assessment. Rendering is left to a [`DisplaySink`].

pub mod assessment;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod numbers;
pub mod plan;
pub mod rng;
pub mod round;
pub mod seed;
pub mod session;
pub mod statistics;
pub mod summary;
pub mod timer;

// Re-export commonly used types
pub use assessment::{AdaptationChecks, RiskAssessment, RoleMetrics, Verdict, assess};
pub use config::{
    AssessmentThresholds, ConfigError, GameConfig, RiskTier, TierBinding, VisualAttribute,
};
pub use display::{DisplayEvent, DisplaySink, EventLog, NullDisplay};
pub use error::{GameError, Intent};
pub use plan::{Binding, SessionPlan, build_plan};
pub use rng::{CountingRng, RandomSource, RngBundle};
pub use round::{RoundEngine, RoundEvent, RoundEvents, RoundPhase};
pub use seed::{
    ShareCode, canonical_share_code, decode_to_seed, encode_friendly, generate_code_from_entropy,
    parse_share_code,
};
pub use session::{PumpOutcome, Session, SessionController, SessionPhase};
pub use statistics::{CounterRecord, Statistics, StatisticsTracker};
pub use summary::{AttributeRow, SessionSummary, session_summary};
pub use timer::PendingAdvance;
