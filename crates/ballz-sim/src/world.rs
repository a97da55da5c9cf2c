//! The entity set: a hecs world indexed by stable `EntityId`s.

use std::collections::BTreeMap;

use glam::Vec2;
use hecs::{Entity, World};

use ballz_core::components::*;
use ballz_core::constants::{BALL_MAX_HEALTH, BALL_RADIUS, SHOT_RADIUS};
use ballz_core::enums::EntityKind;
use ballz_core::state::{EntityState, KindState};
use ballz_core::types::{EntityId, PlayerId};

/// Parameters of a projectile spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSpawn {
    pub position: Vec2,
    pub velocity: Vec2,
    pub explosion_radius: f32,
    pub health_impact_at_direct_hit: f32,
    pub is_instant_shot: bool,
    /// Ball the shot was fired from, if any.
    pub shooter: Option<EntityId>,
}

/// Owns the ECS world and the id index.
///
/// Ids are handed out sequentially and never reused, so a stale id simply
/// misses after its entity is despawned.
#[derive(Default)]
pub struct GameWorld {
    ecs: World,
    index: BTreeMap<EntityId, Entity>,
    next_id: u32,
}

impl GameWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    /// Spawn a dynamic ball with full health.
    pub fn spawn_ball(&mut self, position: Vec2, velocity: Vec2, player: PlayerId) -> EntityId {
        let id = self.allocate_id();
        let entity = self.ecs.spawn((
            id,
            EntityKind::Ball,
            Transform {
                position,
                rotation: 0.0,
            },
            Velocity(velocity),
            Collider {
                radius: BALL_RADIUS,
                is_static: false,
            },
            Ball {
                health: BALL_MAX_HEALTH,
                max_health: BALL_MAX_HEALTH,
                aim_direction: Vec2::X,
                shoot_charge: 0.0,
                player,
            },
        ));
        self.index.insert(id, entity);
        id
    }

    /// Spawn an in-flight projectile.
    pub fn spawn_shot(&mut self, spawn: ShotSpawn) -> EntityId {
        let id = self.allocate_id();
        let entity = self.ecs.spawn((
            id,
            EntityKind::Shot,
            Transform {
                position: spawn.position,
                rotation: spawn.velocity.to_angle(),
            },
            Velocity(spawn.velocity),
            Collider {
                radius: SHOT_RADIUS,
                is_static: false,
            },
            Shot {
                explosion_radius: spawn.explosion_radius,
                health_impact_at_direct_hit: spawn.health_impact_at_direct_hit,
                is_instant_shot: spawn.is_instant_shot,
                target: None,
                shooter: spawn.shooter,
            },
        ));
        self.index.insert(id, entity);
        id
    }

    /// Spawn a plain circular body with no game behaviour.
    pub fn spawn_generic(&mut self, position: Vec2, radius: f32, is_static: bool) -> EntityId {
        let id = self.allocate_id();
        let entity = self.ecs.spawn((
            id,
            EntityKind::Generic,
            Transform {
                position,
                rotation: 0.0,
            },
            Velocity::default(),
            Collider { radius, is_static },
        ));
        self.index.insert(id, entity);
        id
    }

    /// Remove an entity immediately. Callers release its body first.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        match self.index.remove(&id) {
            Some(entity) => self.ecs.despawn(entity).is_ok(),
            None => false,
        }
    }

    /// Mark an entity disposed. It loses its body and is despawned at the
    /// next synchronization.
    pub fn dispose(&mut self, id: EntityId) -> bool {
        match self.index.get(&id) {
            Some(&entity) => self.ecs.insert_one(entity, Disposed).is_ok(),
            None => false,
        }
    }

    pub fn is_disposed(&self, id: EntityId) -> bool {
        self.index
            .get(&id)
            .and_then(|&e| self.ecs.satisfies::<&Disposed>(e).ok())
            .unwrap_or(false)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// The hecs entity behind `id`.
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.index.get(&id).copied()
    }

    pub fn kind(&self, id: EntityId) -> Option<EntityKind> {
        let entity = self.entity(id)?;
        self.ecs.get::<&EntityKind>(entity).ok().map(|k| *k)
    }

    /// Live entity ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.index.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn ecs(&self) -> &World {
        &self.ecs
    }

    pub fn ecs_mut(&mut self) -> &mut World {
        &mut self.ecs
    }

    /// Read a copied component of `id`.
    pub fn get<T: hecs::Component + Copy>(&self, id: EntityId) -> Option<T> {
        let entity = self.entity(id)?;
        self.ecs.get::<&T>(entity).ok().map(|c| *c)
    }

    /// Mutable access to a component of `id`.
    pub fn get_mut<T: hecs::Component>(&mut self, id: EntityId) -> Option<hecs::RefMut<'_, T>> {
        let entity = self.entity(id)?;
        self.ecs.get::<&mut T>(entity).ok()
    }

    /// Copy of one entity, disposed or not.
    pub fn state(&self, id: EntityId) -> Option<EntityState> {
        let entity = self.entity(id)?;
        let e = self.ecs.entity(entity).ok()?;
        let transform = *e.get::<&Transform>()?;
        let velocity = e.get::<&Velocity>().map(|v| v.0).unwrap_or_default();
        let collider = *e.get::<&Collider>()?;
        let data = if let Some(ball) = e.get::<&Ball>() {
            KindState::Ball(*ball)
        } else if let Some(shot) = e.get::<&Shot>() {
            KindState::Shot(*shot)
        } else {
            KindState::Generic
        };
        Some(EntityState {
            id,
            position: transform.position,
            rotation: transform.rotation,
            velocity,
            radius: collider.radius,
            is_static: collider.is_static,
            data,
        })
    }

    /// Copies of all live, non-disposed entities ordered by id.
    pub fn states(&self) -> Vec<EntityState> {
        self.ids()
            .filter(|&id| !self.is_disposed(id))
            .filter_map(|id| self.state(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_never_reused() {
        let mut world = GameWorld::new();
        let a = world.spawn_ball(Vec2::ZERO, Vec2::ZERO, PlayerId(1));
        assert!(world.despawn(a));
        let b = world.spawn_ball(Vec2::ZERO, Vec2::ZERO, PlayerId(1));
        assert_ne!(a, b);
        assert!(!world.contains(a));
        assert!(world.state(a).is_none());
    }

    #[test]
    fn test_states_are_ordered_and_skip_disposed() {
        let mut world = GameWorld::new();
        let a = world.spawn_generic(Vec2::ZERO, 1.0, true);
        let b = world.spawn_ball(Vec2::new(1.0, 2.0), Vec2::X, PlayerId(2));
        let c = world.spawn_shot(ShotSpawn {
            position: Vec2::ZERO,
            velocity: Vec2::Y,
            explosion_radius: 1.0,
            health_impact_at_direct_hit: 25.0,
            is_instant_shot: false,
            shooter: Some(b),
        });
        assert!(world.dispose(a));

        let states = world.states();
        let ids: Vec<_> = states.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b, c]);
        assert_eq!(states[0].kind(), EntityKind::Ball);
        assert_eq!(states[1].kind(), EntityKind::Shot);
        assert!(world.is_disposed(a));
        assert_eq!(world.kind(c), Some(EntityKind::Shot));
    }

    #[test]
    fn test_component_access() {
        let mut world = GameWorld::new();
        let ball = world.spawn_ball(Vec2::ZERO, Vec2::ZERO, PlayerId(1));
        world.get_mut::<Ball>(ball).unwrap().health = 30.0;
        assert_eq!(world.get::<Ball>(ball).unwrap().health, 30.0);
        assert!(world.get::<Shot>(ball).is_none());
    }
}
