//! Commands sent from input/logic collaborators to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::{EntityId, PlayerId};

/// All possible requests into the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameCommand {
    // --- Entity creation ---
    /// Spawn a ball at `position` owned by `player`.
    SpawnBall {
        position: Vec2,
        velocity: Vec2,
        player: PlayerId,
    },
    /// Spawn a projectile with explicit parameters.
    SpawnShot {
        position: Vec2,
        velocity: Vec2,
        explosion_radius: f32,
        health_impact_at_direct_hit: f32,
        is_instant_shot: bool,
    },

    // --- Weapon control ---
    /// Point a ball's weapon along `direction` (normalized on apply).
    Aim { ball: EntityId, direction: Vec2 },
    /// Set a ball's shot charge (clamped to 0..=1).
    Charge { ball: EntityId, charge: f32 },
    /// Fire a ball's weapon with its current aim and charge.
    Fire { ball: EntityId, instant: bool },

    // --- Simulation control ---
    /// Generic game message: toggles between running and paused.
    GameMessage,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}
