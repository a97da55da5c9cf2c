//! Entity↔body synchronizer.
//!
//! Keeps exactly one physics body per live entity and one static chain body
//! per terrain outline loop. The reverse map from body to entity is written
//! only here, always together with the entity's `PhysicsLink`.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use tracing::{debug, info, trace, warn};

use ballz_core::components::{Ball, Collider, Disposed, PhysicsLink, Shot, Transform, Velocity};
use ballz_core::config::SimConfig;
use ballz_core::constants::{BALL_FACING_ANGLE, BALL_IDLE_SPEED_SQ};
use ballz_core::enums::EntityKind;
use ballz_core::types::{BodyHandle, EntityId};
use ballz_terrain::TerrainGrid;

use crate::physics::{BodyDesc, BodyProfile, ContactReport, PhysicsWorld};
use crate::world::GameWorld;

/// Facing of a ball: sideways in the direction it moves, right when idle.
pub fn ball_facing(velocity: Vec2) -> f32 {
    if velocity.length_squared() < BALL_IDLE_SPEED_SQ {
        BALL_FACING_ANGLE
    } else if velocity.x < 0.0 {
        -BALL_FACING_ANGLE
    } else {
        BALL_FACING_ANGLE
    }
}

#[derive(Default)]
pub struct Synchronizer {
    body_map: HashMap<BodyHandle, EntityId>,
    terrain_bodies: HashSet<BodyHandle>,
    terrain_revision: Option<u64>,
    despawn_buffer: Vec<EntityId>,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity owning `handle`, if any.
    pub fn lookup(&self, handle: BodyHandle) -> Option<EntityId> {
        self.body_map.get(&handle).copied()
    }

    pub fn is_terrain(&self, handle: BodyHandle) -> bool {
        self.terrain_bodies.contains(&handle)
    }

    pub fn terrain_bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.terrain_bodies.iter().copied()
    }

    /// Terrain revision the chain bodies were built from.
    pub fn terrain_revision(&self) -> Option<u64> {
        self.terrain_revision
    }

    pub fn mapped_count(&self) -> usize {
        self.body_map.len()
    }

    /// Everything that has to happen before a physics step:
    /// terrain rebuild, removals, body creation and the push of
    /// entity state into bodies.
    pub fn prepare(
        &mut self,
        world: &mut GameWorld,
        physics: &mut PhysicsWorld,
        terrain: &TerrainGrid,
        config: &SimConfig,
    ) {
        self.rebuild_terrain(physics, terrain);
        self.remove_departed(world, physics, config.play_area_radius);
        self.create_missing(world, physics, config);
        self.push(world, physics);
    }

    /// Replace all terrain chain bodies if the terrain changed.
    fn rebuild_terrain(&mut self, physics: &mut PhysicsWorld, terrain: &TerrainGrid) {
        if self.terrain_revision == Some(terrain.revision()) {
            return;
        }
        for handle in self.terrain_bodies.drain() {
            physics.remove_body(handle);
        }
        for polyline in terrain.outline() {
            let handle = physics.create_chain_body(&polyline.points, polyline.closed);
            self.terrain_bodies.insert(handle);
        }
        self.terrain_revision = Some(terrain.revision());
        info!(
            revision = terrain.revision(),
            loops = self.terrain_bodies.len(),
            "terrain collision rebuilt"
        );
    }

    /// Drop disposed entities and those that left the play area.
    fn remove_departed(&mut self, world: &mut GameWorld, physics: &mut PhysicsWorld, radius: f32) {
        self.despawn_buffer.clear();
        let radius_sq = radius * radius;
        for (_, (id, transform, disposed)) in world
            .ecs()
            .query::<(&EntityId, &Transform, Option<&Disposed>)>()
            .iter()
        {
            if disposed.is_some() || transform.position.length_squared() > radius_sq {
                self.despawn_buffer.push(*id);
            }
        }

        let departed = std::mem::take(&mut self.despawn_buffer);
        for &id in &departed {
            self.release(world, physics, id);
        }
        self.despawn_buffer = departed;
        if !self.despawn_buffer.is_empty() {
            debug!(count = self.despawn_buffer.len(), "entities removed");
        }
    }

    /// Release an entity's body and map entry, then despawn it.
    pub fn release(&mut self, world: &mut GameWorld, physics: &mut PhysicsWorld, id: EntityId) {
        if let Some(PhysicsLink(handle)) = world.get::<PhysicsLink>(id) {
            self.body_map.remove(&handle);
            if !physics.remove_body(handle) {
                warn!(%id, body = %handle, "linked body was already gone");
                debug_assert!(false, "entity {id} linked to missing body {handle}");
            }
        }
        world.despawn(id);
    }

    /// Give every entity without a body its body.
    fn create_missing(&mut self, world: &mut GameWorld, physics: &mut PhysicsWorld, config: &SimConfig) {
        let mut created = Vec::new();
        for (entity, (id, kind, transform, velocity, collider, shot)) in world
            .ecs()
            .query::<(
                &EntityId,
                &EntityKind,
                &Transform,
                &Velocity,
                &Collider,
                Option<&Shot>,
            )>()
            .without::<&PhysicsLink>()
            .without::<&Disposed>()
            .iter()
        {
            debug_assert!(collider.radius > 0.0, "entity {id} has radius {}", collider.radius);
            let profile = match (kind, shot) {
                (EntityKind::Ball, _) => BodyProfile::Ball(config.ball),
                (EntityKind::Shot, Some(shot)) => BodyProfile::Shot {
                    instant: shot.is_instant_shot,
                },
                _ => BodyProfile::Generic,
            };
            let handle = physics.create_body(&BodyDesc {
                position: transform.position,
                rotation: if *kind == EntityKind::Ball {
                    0.0
                } else {
                    transform.rotation
                },
                velocity: velocity.0,
                radius: collider.radius,
                is_static: collider.is_static,
                profile,
            });
            created.push((entity, *id, handle));
        }

        for (entity, id, handle) in created {
            if world.ecs_mut().insert_one(entity, PhysicsLink(handle)).is_ok() {
                self.body_map.insert(handle, id);
                debug!(%id, body = %handle, "body created");
            } else {
                physics.remove_body(handle);
            }
        }
    }

    /// Copy entity transforms and velocities into bodies that differ.
    fn push(&mut self, world: &mut GameWorld, physics: &mut PhysicsWorld) {
        let mut pushed = 0usize;
        for (_, (link, kind, transform, velocity)) in world
            .ecs()
            .query::<(&PhysicsLink, &EntityKind, &Transform, &Velocity)>()
            .iter()
        {
            let Some((position, rotation, linvel)) = physics.body_state(link.0) else {
                continue;
            };
            if position != transform.position {
                physics.set_position(link.0, transform.position);
                pushed += 1;
            }
            // Ball facing is cosmetic; their bodies never rotate.
            if *kind != EntityKind::Ball && rotation != transform.rotation {
                physics.set_rotation(link.0, transform.rotation);
            }
            if linvel != velocity.0 {
                physics.set_velocity(link.0, velocity.0);
                pushed += 1;
            }
        }
        trace!(pushed, "entity state pushed to bodies");
    }

    /// Advance the physics engine one step of `dt` seconds.
    pub fn step(&self, physics: &mut PhysicsWorld, dt: f32) -> Vec<ContactReport> {
        physics.step(dt)
    }

    /// Copy body positions and velocities back into entities.
    pub fn pull(&mut self, world: &mut GameWorld, physics: &PhysicsWorld) {
        for (_, (link, transform, velocity, ball)) in world
            .ecs_mut()
            .query_mut::<(&PhysicsLink, &mut Transform, &mut Velocity, Option<&Ball>)>()
        {
            let Some((position, rotation, linvel)) = physics.body_state(link.0) else {
                continue;
            };
            transform.position = position;
            transform.rotation = if ball.is_some() {
                ball_facing(linvel)
            } else {
                rotation
            };
            velocity.0 = linvel;
        }
    }

    /// Check that every mapped body exists and links back, that every
    /// linked entity is mapped, and that no body is unaccounted for.
    pub fn is_consistent(&self, world: &GameWorld, physics: &PhysicsWorld) -> bool {
        let mut ok = true;
        for (&handle, &id) in &self.body_map {
            if world.get::<PhysicsLink>(id) != Some(PhysicsLink(handle)) || !physics.contains(handle) {
                warn!(%id, body = %handle, "body map entry without matching link");
                ok = false;
            }
        }
        for (_, (id, link)) in world.ecs().query::<(&EntityId, &PhysicsLink)>().iter() {
            if self.body_map.get(&link.0) != Some(id) {
                warn!(%id, body = %link.0, "linked entity missing from body map");
                ok = false;
            }
        }
        for handle in physics.handles() {
            if !self.body_map.contains_key(&handle) && !self.is_terrain(handle) {
                warn!(body = %handle, "orphaned physics body");
                ok = false;
            }
        }
        ok
    }
}
