//! rapier2d bridge.
//!
//! Wraps the rapier pipeline and sets behind `BodyHandle`s and glam types so
//! the rest of the simulation never touches nalgebra.

use std::sync::{Mutex, PoisonError};

use glam::Vec2;
use rapier2d::prelude::*;

use ballz_core::config::BallPhysics;
use ballz_core::constants::TERRAIN_FRICTION;
use ballz_core::types::BodyHandle;

fn to_na(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn from_na(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn to_rapier(handle: BodyHandle) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
}

fn from_rapier(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle::new(index, generation)
}

/// How a body should behave, by entity kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyProfile {
    /// Rotation locked, material from config.
    Ball(BallPhysics),
    /// Reports contacts. Instant shots get a sensor that reports nothing.
    Shot { instant: bool },
    Generic,
}

/// Everything needed to create an entity body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub radius: f32,
    pub is_static: bool,
    pub profile: BodyProfile,
}

/// A contact that started during a step, between two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactReport {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Deepest contact point in world space, when the engine had one.
    pub point: Option<Vec2>,
}

/// Collects contact starts while the pipeline runs. Mutation of game state
/// waits until the step is over.
#[derive(Default)]
struct ContactCollector {
    contacts: Mutex<Vec<ContactReport>>,
}

impl ContactCollector {
    fn drain(&self) -> Vec<ContactReport> {
        let mut contacts = self.contacts.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *contacts)
    }
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        let CollisionEvent::Started(c1, c2, flags) = event else {
            return;
        };
        // Sensor overlaps are not contacts.
        if flags.intersects(CollisionEventFlags::REMOVED | CollisionEventFlags::SENSOR) {
            return;
        }
        let parent = |c: ColliderHandle| colliders.get(c).and_then(|c| c.parent());
        let (Some(b1), Some(b2)) = (parent(c1), parent(c2)) else {
            return;
        };

        let point = contact_pair.and_then(|pair| {
            let (_, contact) = pair.find_deepest_contact()?;
            let collider = colliders.get(pair.collider1)?;
            Some(collider.position() * contact.local_p1)
        });

        self.contacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ContactReport {
                body_a: from_rapier(b1),
                body_b: from_rapier(b2),
                point: point.map(|p| Vec2::new(p.x, p.y)),
            });
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// The rigid-body engine.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    collector: ContactCollector,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collector: ContactCollector::default(),
        }
    }

    /// Create a body with one circular collider.
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let mut builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        }
        .translation(to_na(desc.position))
        .rotation(desc.rotation)
        .linvel(to_na(desc.velocity));

        let mut collider = ColliderBuilder::ball(desc.radius);
        match desc.profile {
            BodyProfile::Ball(material) => {
                builder = builder.locked_axes(LockedAxes::ROTATION_LOCKED);
                collider = collider
                    .friction(material.friction)
                    .restitution(material.restitution)
                    .mass(material.mass);
            }
            BodyProfile::Shot { instant: true } => {
                collider = collider.sensor(true);
            }
            BodyProfile::Shot { instant: false } => {
                builder = builder.ccd_enabled(true);
                collider = collider.active_events(ActiveEvents::COLLISION_EVENTS);
            }
            BodyProfile::Generic => {}
        }

        let handle = self.bodies.insert(builder.build());
        self.colliders
            .insert_with_parent(collider.build(), handle, &mut self.bodies);
        from_rapier(handle)
    }

    /// Create a fixed chain body along a terrain outline.
    pub fn create_chain_body(&mut self, points: &[Vec2], closed: bool) -> BodyHandle {
        let mut vertices: Vec<Point<Real>> = points.iter().map(|p| point![p.x, p.y]).collect();
        if closed {
            if let Some(&first) = vertices.first() {
                vertices.push(first);
            }
        }
        let handle = self.bodies.insert(RigidBodyBuilder::fixed().build());
        let collider = ColliderBuilder::polyline(vertices, None)
            .friction(TERRAIN_FRICTION)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        from_rapier(handle)
    }

    /// Remove a body and its colliders. Returns false if it was already gone.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                to_rapier(handle),
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(to_rapier(handle))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// All live body handles.
    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.iter().map(|(h, _)| from_rapier(h))
    }

    /// Advance one step of `dt` seconds and return the contacts that started.
    pub fn step(&mut self, dt: f32) -> Vec<ContactReport> {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );
        self.collector.drain()
    }

    /// Position, rotation and linear velocity of a body.
    pub fn body_state(&self, handle: BodyHandle) -> Option<(Vec2, f32, Vec2)> {
        let body = self.bodies.get(to_rapier(handle))?;
        Some((
            from_na(body.translation()),
            body.rotation().angle(),
            from_na(body.linvel()),
        ))
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies
            .get(to_rapier(handle))
            .map(|b| from_na(b.translation()))
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies
            .get(to_rapier(handle))
            .map(|b| from_na(b.linvel()))
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(to_rapier(handle)) {
            body.set_translation(to_na(position), true);
        }
    }

    pub fn set_rotation(&mut self, handle: BodyHandle, angle: f32) {
        if let Some(body) = self.bodies.get_mut(to_rapier(handle)) {
            body.set_rotation(Rotation::new(angle), true);
        }
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(to_rapier(handle)) {
            body.set_linvel(to_na(velocity), true);
        }
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(to_rapier(handle)) {
            body.apply_impulse(to_na(impulse), true);
        }
    }

    /// Rebuild the query structures after bodies were added or removed
    /// outside a step.
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.colliders);
    }

    /// Nearest solid hit along a ray, ignoring sensors and the `exclude` body.
    /// `direction` need not be unit length; `max_toi` is in its multiples.
    pub fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_toi: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<(BodyHandle, Vec2)> {
        let ray = Ray::new(point![origin.x, origin.y], to_na(direction));
        let mut filter = QueryFilter::default().exclude_sensors();
        if let Some(handle) = exclude {
            filter = filter.exclude_rigid_body(to_rapier(handle));
        }
        let (collider, toi) =
            self.query_pipeline
                .cast_ray(&self.bodies, &self.colliders, &ray, max_toi, true, filter)?;
        let body = self.colliders.get(collider)?.parent()?;
        let hit = ray.point_at(toi);
        Some((from_rapier(body), Vec2::new(hit.x, hit.y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_desc(position: Vec2) -> BodyDesc {
        BodyDesc {
            position,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            radius: 0.5,
            is_static: false,
            profile: BodyProfile::Ball(BallPhysics::default()),
        }
    }

    #[test]
    fn test_create_and_remove_body() {
        let mut physics = PhysicsWorld::new(Vec2::new(0.0, -9.82));
        let handle = physics.create_body(&ball_desc(Vec2::ZERO));
        assert!(physics.contains(handle));
        assert_eq!(physics.body_count(), 1);
        assert!(physics.remove_body(handle));
        assert!(!physics.contains(handle));
        assert!(!physics.remove_body(handle));
    }

    #[test]
    fn test_gravity_pulls_dynamic_body_down() {
        let mut physics = PhysicsWorld::new(Vec2::new(0.0, -9.82));
        let handle = physics.create_body(&ball_desc(Vec2::new(0.0, 10.0)));
        for _ in 0..30 {
            physics.step(1.0 / 60.0);
        }
        let (pos, _, vel) = physics.body_state(handle).unwrap();
        assert!(pos.y < 10.0);
        assert!(vel.y < 0.0);
    }

    #[test]
    fn test_impulse_changes_velocity() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let handle = physics.create_body(&ball_desc(Vec2::ZERO));
        physics.step(1.0 / 60.0);
        physics.apply_impulse(handle, Vec2::new(10.0, 0.0));
        // Mass 10 from config: impulse 10 gives 1 unit/s.
        let vel = physics.velocity(handle).unwrap();
        assert!((vel.x - 1.0).abs() < 1e-3, "vel {vel}");
    }

    #[test]
    fn test_raycast_hits_chain_and_skips_excluded() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let ground = physics.create_chain_body(&[Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)], false);
        let shooter = physics.create_body(&ball_desc(Vec2::new(0.0, 3.0)));
        physics.refresh_queries();

        let (hit, point) = physics
            .cast_ray(Vec2::new(0.0, 3.0), Vec2::new(0.0, -1.0), 100.0, Some(shooter))
            .unwrap();
        assert_eq!(hit, ground);
        assert!(point.y.abs() < 1e-4);

        assert!(physics
            .cast_ray(Vec2::new(0.0, 3.0), Vec2::new(0.0, 1.0), 100.0, Some(shooter))
            .is_none());
    }

    #[test]
    fn test_shot_reports_contact_with_ground() {
        let mut physics = PhysicsWorld::new(Vec2::new(0.0, -9.82));
        let ground = physics.create_chain_body(&[Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)], false);
        let shot = physics.create_body(&BodyDesc {
            position: Vec2::new(0.0, 1.0),
            rotation: 0.0,
            velocity: Vec2::new(0.0, -10.0),
            radius: 0.1,
            is_static: false,
            profile: BodyProfile::Shot { instant: false },
        });

        let mut contacts = Vec::new();
        for _ in 0..30 {
            contacts.extend(physics.step(1.0 / 60.0));
            if !contacts.is_empty() {
                break;
            }
        }
        let c = contacts.first().expect("shot never touched the ground");
        let pair = [c.body_a, c.body_b];
        assert!(pair.contains(&shot) && pair.contains(&ground));
    }

    #[test]
    fn test_sensor_overlap_is_not_a_contact() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let sensor = physics.create_body(&BodyDesc {
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            radius: 0.1,
            is_static: true,
            profile: BodyProfile::Shot { instant: true },
        });
        let shot = physics.create_body(&BodyDesc {
            position: Vec2::new(-1.0, 0.0),
            rotation: 0.0,
            velocity: Vec2::new(6.0, 0.0),
            radius: 0.1,
            is_static: false,
            profile: BodyProfile::Shot { instant: false },
        });

        let mut contacts = Vec::new();
        for _ in 0..30 {
            contacts.extend(physics.step(1.0 / 60.0));
        }
        assert!(contacts.is_empty(), "{contacts:?}");
        // The shot flew through the sensor.
        assert!(physics.position(shot).unwrap().x > 1.0);
        assert!(physics.contains(sensor));
    }
}
