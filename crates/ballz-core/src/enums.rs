//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Kind tag of an entity. Kind-specific data lives in the `Ball` and `Shot`
/// components; this tag is what impact dispatch and snapshots switch on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Ball,
    Shot,
    #[default]
    Generic,
}

/// Whether the simulation advances on tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Running,
    Paused,
}

impl SessionState {
    pub fn toggled(self) -> Self {
        match self {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
        }
    }
}

/// How a shot was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTrigger {
    /// The physics engine reported a contact during the step.
    Contact,
    /// An instant shot's post-step raycast.
    Raycast,
}
