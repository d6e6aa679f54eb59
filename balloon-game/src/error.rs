//! Error kinds surfaced by the session core.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Player or display intent forwarded into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Start,
    Pump,
    CashOut,
    Advance,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Pump => write!(f, "pump"),
            Self::CashOut => write!(f, "cash_out"),
            Self::Advance => write!(f, "advance"),
        }
    }
}

/// Errors raised by the round engine and session controller.
#[derive(Debug, Error)]
pub enum GameError {
    /// Intent issued while the engine is not in a phase that accepts it.
    #[error("cannot {intent} while {phase}")]
    InvalidState { intent: Intent, phase: &'static str },
    /// Round index outside `1..=balloon_count`.
    #[error("round {index} is outside 1..={balloon_count}")]
    OutOfRange { index: u32, balloon_count: u32 },
    #[error("unrecognized share code {code:?}")]
    InvalidShareCode { code: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GameError {
    /// Whether the session can continue after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
