//! World snapshots: immutable copies of the entity set at one tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::{Ball, Shot};
use crate::enums::EntityKind;
use crate::types::EntityId;

/// Kind-specific part of an entity copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum KindState {
    Ball(Ball),
    Shot(Shot),
    Generic,
}

impl KindState {
    pub fn kind(&self) -> EntityKind {
        match self {
            KindState::Ball(_) => EntityKind::Ball,
            KindState::Shot(_) => EntityKind::Shot,
            KindState::Generic => EntityKind::Generic,
        }
    }
}

/// Copy of one entity as seen by renderers and network collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: EntityId,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub radius: f32,
    pub is_static: bool,
    pub data: KindState,
}

impl EntityState {
    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }

    /// Linear blend of the kinematic state toward `post` by `alpha`.
    /// Identity and kind data come from `self`.
    pub fn lerp(&self, post: &EntityState, alpha: f32) -> EntityState {
        EntityState {
            position: self.position.lerp(post.position, alpha),
            rotation: self.rotation * (1.0 - alpha) + post.rotation * alpha,
            velocity: self.velocity.lerp(post.velocity, alpha),
            ..*self
        }
    }
}

/// Immutable world state at one simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Logical time stamp in seconds.
    pub time_secs: f64,
    /// Terrain revision the entities were simulated against.
    pub terrain_revision: u64,
    /// Entity copies, ordered by id.
    pub entities: Vec<EntityState>,
}

impl WorldSnapshot {
    pub fn entity(&self, id: EntityId) -> Option<&EntityState> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|idx| &self.entities[idx])
    }
}
