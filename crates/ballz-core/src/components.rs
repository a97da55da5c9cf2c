//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in the sim crate, not in components.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::{BodyHandle, EntityId, PlayerId};

/// Position and orientation (radians) in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub rotation: f32,
}

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

/// Circular collision footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub radius: f32,
    /// Static entities get a fixed body; everything else is dynamic.
    pub is_static: bool,
}

/// Marks an entity as disposed. Disposed entities lose their body and are
/// despawned at the next synchronization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Disposed;

/// Link from an entity to its physics body.
///
/// Written only by the synchronizer, always together with its reverse
/// map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicsLink(pub BodyHandle);

/// A player-controlled ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Remaining health, never below zero.
    pub health: f32,
    pub max_health: f32,
    /// Unit vector the ball aims its weapon along.
    pub aim_direction: Vec2,
    /// Charge scalar for shot power (0..=1).
    pub shoot_charge: f32,
    pub player: PlayerId,
}

/// Where and what a shot hit. Set once when the shot resolves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotTarget {
    /// Entity the shot hit, if it hit one (terrain hits leave this empty).
    pub entity: Option<EntityId>,
    pub position: Vec2,
}

/// A projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub explosion_radius: f32,
    pub health_impact_at_direct_hit: f32,
    /// Hitscan shots resolve by raycast in the tick they are fired.
    pub is_instant_shot: bool,
    /// First hit wins: once set this is never overwritten.
    pub target: Option<ShotTarget>,
    /// Ball that fired the shot. Contacts with it are ignored until the
    /// shot has cleared its surface, then this is reset.
    #[serde(default)]
    pub shooter: Option<EntityId>,
}
