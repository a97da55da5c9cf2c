//! Impact resolution: what a shot does to whatever it hit.

use glam::Vec2;
use tracing::debug;

use ballz_core::components::{Ball, PhysicsLink, Shot, ShotTarget, Transform, Velocity};
use ballz_core::config::SimConfig;
use ballz_core::enums::{EntityKind, ImpactTrigger};
use ballz_core::events::{ImpactEvent, ImpactOutcome};
use ballz_core::types::{BodyHandle, EntityId};
use ballz_terrain::TerrainGrid;

use crate::physics::PhysicsWorld;
use crate::sync::Synchronizer;
use crate::world::GameWorld;

/// What a hit body turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Terrain,
    Ball(EntityId),
    /// A mapped entity of any other kind.
    Other(EntityId),
    /// A body nothing in the simulation claims.
    Unmapped,
}

impl HitTarget {
    pub fn classify(handle: BodyHandle, sync: &Synchronizer, world: &GameWorld) -> Self {
        if sync.is_terrain(handle) {
            return HitTarget::Terrain;
        }
        match sync.lookup(handle) {
            Some(id) if world.kind(id) == Some(EntityKind::Ball) => HitTarget::Ball(id),
            Some(id) => HitTarget::Other(id),
            None => HitTarget::Unmapped,
        }
    }

    fn entity(&self) -> Option<EntityId> {
        match *self {
            HitTarget::Ball(id) | HitTarget::Other(id) => Some(id),
            HitTarget::Terrain | HitTarget::Unmapped => None,
        }
    }
}

/// Crater radius for a shot hitting terrain at `speed`.
pub fn crater_radius(config: &SimConfig, speed: f32, explosion_radius: f32) -> f32 {
    let radius = config.crater_speed_factor * speed * explosion_radius;
    match config.max_crater_radius {
        Some(max) => radius.min(max),
        None => radius,
    }
}

/// Mutable state an impact may touch.
pub struct ImpactContext<'a> {
    pub world: &'a mut GameWorld,
    pub physics: &'a mut PhysicsWorld,
    pub terrain: &'a mut TerrainGrid,
    pub sync: &'a Synchronizer,
    pub config: &'a SimConfig,
}

impl ImpactContext<'_> {
    /// Apply `shot`'s impact on `hit` (body and world point).
    ///
    /// Returns `None` without touching anything if the shot is gone or
    /// already resolved. Otherwise records the target, disposes the shot
    /// and reports what happened.
    pub fn resolve(
        &mut self,
        shot_id: EntityId,
        hit: Option<(BodyHandle, Vec2)>,
        trigger: ImpactTrigger,
    ) -> Option<ImpactEvent> {
        let shot = self.world.get::<Shot>(shot_id)?;
        if shot.target.is_some() || self.world.is_disposed(shot_id) {
            return None;
        }
        let shot_velocity = self.world.get::<Velocity>(shot_id).map(|v| v.0).unwrap_or_default();
        let shot_position = self
            .world
            .get::<Transform>(shot_id)
            .map(|t| t.position)
            .unwrap_or_default();

        let (target, point) = match hit {
            Some((handle, point)) => (HitTarget::classify(handle, self.sync, self.world), point),
            None => (HitTarget::Unmapped, shot_position),
        };

        let outcome = match (hit, target) {
            (None, _) => ImpactOutcome::NoEffect,
            (Some(_), HitTarget::Terrain) => {
                let radius = crater_radius(self.config, shot_velocity.length(), shot.explosion_radius);
                self.terrain.subtract_circle(point, radius);
                ImpactOutcome::Crater {
                    center: point,
                    radius,
                }
            }
            (Some(_), HitTarget::Ball(ball_id)) => self.hit_ball(ball_id, &shot, shot_velocity),
            (Some(_), HitTarget::Other(_) | HitTarget::Unmapped) => ImpactOutcome::NoEffect,
        };

        if let Some(mut s) = self.world.get_mut::<Shot>(shot_id) {
            s.target = Some(ShotTarget {
                entity: hit.and(target.entity()),
                position: point,
            });
        }
        self.world.dispose(shot_id);

        debug!(shot = %shot_id, ?trigger, ?outcome, "shot resolved");
        Some(ImpactEvent {
            shot: shot_id,
            trigger,
            outcome,
        })
    }

    fn hit_ball(&mut self, ball_id: EntityId, shot: &Shot, shot_velocity: Vec2) -> ImpactOutcome {
        let health_after = match self.world.get_mut::<Ball>(ball_id) {
            Some(mut ball) => {
                ball.health = (ball.health - shot.health_impact_at_direct_hit).max(0.0);
                ball.health
            }
            None => return ImpactOutcome::NoEffect,
        };

        // Knockback goes to the body; the entity mirrors the result so the
        // next push does not undo it.
        if let Some(PhysicsLink(handle)) = self.world.get::<PhysicsLink>(ball_id) {
            self.physics
                .apply_impulse(handle, self.config.knockback_multiplier * shot_velocity);
            if let (Some(v), Some(mut vel)) = (
                self.physics.velocity(handle),
                self.world.get_mut::<Velocity>(ball_id),
            ) {
                vel.0 = v;
            }
        }

        ImpactOutcome::DirectHit {
            ball: ball_id,
            damage: shot.health_impact_at_direct_hit,
            health_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballz_core::types::PlayerId;
    use proptest::prelude::*;

    use crate::world::ShotSpawn;

    struct Fixture {
        world: GameWorld,
        physics: PhysicsWorld,
        terrain: TerrainGrid,
        sync: Synchronizer,
        config: SimConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = SimConfig::default();
            Self {
                world: GameWorld::new(),
                physics: PhysicsWorld::new(config.gravity),
                terrain: TerrainGrid::solid(41, 21, 0.25, Vec2::new(-5.0, -5.0)).unwrap(),
                sync: Synchronizer::new(),
                config,
            }
        }

        fn prepare(&mut self) {
            self.sync
                .prepare(&mut self.world, &mut self.physics, &self.terrain, &self.config);
        }

        fn ctx(&mut self) -> ImpactContext<'_> {
            ImpactContext {
                world: &mut self.world,
                physics: &mut self.physics,
                terrain: &mut self.terrain,
                sync: &self.sync,
                config: &self.config,
            }
        }

        fn shot(&mut self, position: Vec2, velocity: Vec2) -> EntityId {
            self.world.spawn_shot(ShotSpawn {
                position,
                velocity,
                explosion_radius: 1.0,
                health_impact_at_direct_hit: 25.0,
                is_instant_shot: false,
                shooter: None,
            })
        }

        fn body_of(&self, id: EntityId) -> BodyHandle {
            self.world.get::<PhysicsLink>(id).unwrap().0
        }
    }

    #[test]
    fn test_terrain_hit_carves_crater() {
        let mut fx = Fixture::new();
        let shot = fx.shot(Vec2::new(0.0, 1.0), Vec2::new(0.0, -10.0));
        fx.prepare();
        let ground = fx.sync.terrain_bodies().next().unwrap();
        let before = fx.terrain.revision();

        let event = fx
            .ctx()
            .resolve(shot, Some((ground, Vec2::ZERO)), ImpactTrigger::Contact)
            .unwrap();
        match event.outcome {
            ImpactOutcome::Crater { center, radius } => {
                assert_eq!(center, Vec2::ZERO);
                assert!((radius - 0.4).abs() < 1e-5, "radius {radius}");
            }
            other => panic!("expected crater, got {other:?}"),
        }
        assert_eq!(fx.terrain.revision(), before + 1);
        assert!(fx.world.is_disposed(shot));
        let target = fx.world.get::<Shot>(shot).unwrap().target.unwrap();
        assert_eq!(target.entity, None);
    }

    #[test]
    fn test_crater_clamp() {
        let config = SimConfig {
            max_crater_radius: Some(0.3),
            ..SimConfig::default()
        };
        assert_eq!(crater_radius(&config, 10.0, 1.0), 0.3);
        assert!((crater_radius(&SimConfig::default(), 100.0, 2.0) - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_direct_hit_damages_and_knocks_back() {
        let mut fx = Fixture::new();
        let ball = fx.world.spawn_ball(Vec2::new(0.0, 5.0), Vec2::ZERO, PlayerId(1));
        fx.world.get_mut::<Ball>(ball).unwrap().health = 30.0;
        let shot = fx.shot(Vec2::new(-2.0, 5.0), Vec2::new(10.0, 0.0));
        fx.prepare();
        fx.physics.step(1.0 / 60.0);
        let body = fx.body_of(ball);

        let event = fx
            .ctx()
            .resolve(shot, Some((body, Vec2::new(-0.5, 5.0))), ImpactTrigger::Contact)
            .unwrap();
        assert_eq!(
            event.outcome,
            ImpactOutcome::DirectHit {
                ball,
                damage: 25.0,
                health_after: 5.0
            }
        );
        assert_eq!(fx.world.get::<Ball>(ball).unwrap().health, 5.0);
        let vel = fx.world.get::<Velocity>(ball).unwrap().0;
        assert!(vel.x > 0.0, "knockback velocity {vel}");
        assert_eq!(fx.physics.velocity(body), Some(vel));
    }

    #[test]
    fn test_shot_resolves_once() {
        let mut fx = Fixture::new();
        let ball = fx.world.spawn_ball(Vec2::new(0.0, 5.0), Vec2::ZERO, PlayerId(1));
        let shot = fx.shot(Vec2::new(-2.0, 5.0), Vec2::new(10.0, 0.0));
        fx.prepare();
        let body = fx.body_of(ball);

        assert!(fx
            .ctx()
            .resolve(shot, Some((body, Vec2::ZERO)), ImpactTrigger::Contact)
            .is_some());
        assert!(fx
            .ctx()
            .resolve(shot, Some((body, Vec2::ZERO)), ImpactTrigger::Raycast)
            .is_none());
        assert_eq!(fx.world.get::<Ball>(ball).unwrap().health, 75.0);
        let target = fx.world.get::<Shot>(shot).unwrap().target.unwrap();
        assert_eq!(target.entity, Some(ball));
    }

    #[test]
    fn test_miss_and_unmapped_have_no_effect() {
        let mut fx = Fixture::new();
        let a = fx.shot(Vec2::ZERO, Vec2::X);
        let b = fx.shot(Vec2::ZERO, Vec2::X);
        let other = fx.world.spawn_generic(Vec2::new(3.0, 3.0), 0.5, true);
        fx.prepare();
        let other_body = fx.body_of(other);

        let miss = fx.ctx().resolve(a, None, ImpactTrigger::Raycast).unwrap();
        assert_eq!(miss.outcome, ImpactOutcome::NoEffect);
        let generic = fx
            .ctx()
            .resolve(b, Some((other_body, Vec2::new(3.0, 3.0))), ImpactTrigger::Contact)
            .unwrap();
        assert_eq!(generic.outcome, ImpactOutcome::NoEffect);
        assert_eq!(
            fx.world.get::<Shot>(b).unwrap().target.unwrap().entity,
            Some(other)
        );
        assert_eq!(fx.terrain.revision(), 0);
    }

    #[test]
    fn test_classify() {
        let mut fx = Fixture::new();
        let ball = fx.world.spawn_ball(Vec2::new(0.0, 5.0), Vec2::ZERO, PlayerId(1));
        let shot = fx.shot(Vec2::new(2.0, 5.0), Vec2::ZERO);
        fx.prepare();
        let ground = fx.sync.terrain_bodies().next().unwrap();

        assert_eq!(HitTarget::classify(ground, &fx.sync, &fx.world), HitTarget::Terrain);
        assert_eq!(
            HitTarget::classify(fx.body_of(ball), &fx.sync, &fx.world),
            HitTarget::Ball(ball)
        );
        assert_eq!(
            HitTarget::classify(fx.body_of(shot), &fx.sync, &fx.world),
            HitTarget::Other(shot)
        );
        assert_eq!(
            HitTarget::classify(BodyHandle::new(999, 0), &fx.sync, &fx.world),
            HitTarget::Unmapped
        );
    }

    proptest! {
        #[test]
        fn health_never_negative(start in 0.0f32..100.0, hits in prop::collection::vec(0.0f32..80.0, 1..6)) {
            let mut fx = Fixture::new();
            let ball = fx.world.spawn_ball(Vec2::new(0.0, 5.0), Vec2::ZERO, PlayerId(1));
            fx.world.get_mut::<Ball>(ball).unwrap().health = start;
            let shots: Vec<_> = hits
                .iter()
                .map(|&damage| {
                    fx.world.spawn_shot(ShotSpawn {
                        position: Vec2::new(-3.0, 5.0),
                        velocity: Vec2::X,
                        explosion_radius: 1.0,
                        health_impact_at_direct_hit: damage,
                        is_instant_shot: true,
                        shooter: None,
                    })
                })
                .collect();
            fx.prepare();
            let body = fx.body_of(ball);

            let mut expected = start;
            for (shot, damage) in shots.into_iter().zip(hits) {
                fx.ctx().resolve(shot, Some((body, Vec2::new(0.0, 5.0))), ImpactTrigger::Raycast);
                expected = (expected - damage).max(0.0);
                let health = fx.world.get::<Ball>(ball).unwrap().health;
                prop_assert!(health >= 0.0);
                prop_assert_eq!(health, expected);
            }
        }
    }
}
