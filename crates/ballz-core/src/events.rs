//! Events emitted by the simulation for audio and UI feedback.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::ImpactTrigger;
use crate::types::EntityId;

/// Side effect of a resolved shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImpactOutcome {
    /// Terrain was carved.
    Crater { center: Vec2, radius: f32 },
    /// A ball took a direct hit.
    DirectHit {
        ball: EntityId,
        damage: f32,
        health_after: f32,
    },
    /// Nothing was hit, or the hit body belongs to nothing that reacts.
    NoEffect,
}

/// One shot resolution during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub shot: EntityId,
    pub trigger: ImpactTrigger,
    pub outcome: ImpactOutcome,
}
