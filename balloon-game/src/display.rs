//! Core → display boundary.
//!
//! The core never renders anything; it pushes [`DisplayEvent`]s into a
//! [`DisplaySink`] and the front end decides how to present them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assessment::RiskAssessment;
use crate::plan::Binding;
use crate::statistics::Statistics;

/// Notifications pushed from the session controller to the display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayEvent {
    SessionStarted {
        total_balloons: u32,
        bindings: Vec<Binding>,
    },
    RoundStarted {
        index: u32,
        attribute: String,
    },
    Pumped {
        pumps: u32,
        points: u32,
    },
    BalloonPopped {
        attribute: String,
    },
    BalloonCashed {
        attribute: String,
        points: u32,
        total_score: u32,
    },
    AdvanceScheduled {
        #[serde(with = "duration_millis")]
        delay: Duration,
    },
    SessionEnded {
        final_score: u32,
        statistics: Statistics,
        risk_assessment: Box<RiskAssessment>,
    },
}

impl DisplayEvent {
    /// Short machine-friendly name of the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::RoundStarted { .. } => "round_started",
            Self::Pumped { .. } => "pumped",
            Self::BalloonPopped { .. } => "balloon_popped",
            Self::BalloonCashed { .. } => "balloon_cashed",
            Self::AdvanceScheduled { .. } => "advance_scheduled",
            Self::SessionEnded { .. } => "session_ended",
        }
    }
}

/// Receiver of display notifications.
pub trait DisplaySink {
    fn notify(&mut self, event: &DisplayEvent);
}

impl DisplaySink for Vec<DisplayEvent> {
    fn notify(&mut self, event: &DisplayEvent) {
        self.push(event.clone());
    }
}

impl<D: DisplaySink + ?Sized> DisplaySink for &mut D {
    fn notify(&mut self, event: &DisplayEvent) {
        (**self).notify(event);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn notify(&mut self, _event: &DisplayEvent) {}
}

/// Recording sink with a few inspection helpers for harnesses.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<DisplayEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    #[must_use]
    pub fn last(&self) -> Option<&DisplayEvent> {
        self.events.last()
    }

    /// Number of recorded events of the given kind.
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Final assessment, once the session has ended.
    #[must_use]
    pub fn assessment(&self) -> Option<&RiskAssessment> {
        self.events.iter().rev().find_map(|e| match e {
            DisplayEvent::SessionEnded {
                risk_assessment, ..
            } => Some(risk_assessment.as_ref()),
            _ => None,
        })
    }

    /// Drain recorded events, leaving the log empty.
    pub fn take(&mut self) -> Vec<DisplayEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DisplaySink for EventLog {
    fn notify(&mut self, event: &DisplayEvent) {
        self.events.push(event.clone());
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
