//! Simulation engine: the projectile step driver.
//!
//! `SimulationEngine` owns the entity world, the terrain, the physics
//! engine, the synchronizer, the fluid field and the snapshot history,
//! processes queued commands and advances everything one tick at a time.
//! Headless and deterministic for a given config, map and command stream.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use ballz_core::commands::GameCommand;
use ballz_core::components::{Ball, Collider, Transform};
use ballz_core::config::SimConfig;
use ballz_core::constants::{
    SHOT_EXPLOSION_RADIUS, SHOT_HEALTH_IMPACT, SHOT_SPAWN_GAP, SHOT_SPEED_PER_CHARGE,
};
use ballz_core::enums::{EntityKind, SessionState};
use ballz_core::events::ImpactEvent;
use ballz_core::state::{EntityState, WorldSnapshot};
use ballz_core::types::{EntityId, SimTime};
use ballz_terrain::TerrainGrid;

use crate::fluid::{FluidContext, FluidField, StillWater};
use crate::history::SnapshotHistory;
use crate::physics::PhysicsWorld;
use crate::sync::Synchronizer;
use crate::systems;
use crate::world::{GameWorld, ShotSpawn};
use crate::world_setup::{self, Team};

/// What one tick produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub time: SimTime,
    /// Shots resolved this tick, contacts first, then raycasts.
    pub impacts: Vec<ImpactEvent>,
    /// Snapshot taken at the end of the tick. While paused this reflects the
    /// unchanged world and is not recorded in the history.
    pub snapshot: WorldSnapshot,
}

pub struct SimulationEngine {
    config: SimConfig,
    world: GameWorld,
    terrain: TerrainGrid,
    physics: PhysicsWorld,
    sync: Synchronizer,
    fluid: Box<dyn FluidField>,
    history: SnapshotHistory,
    time: SimTime,
    state: SessionState,
    rng: ChaCha8Rng,
    command_queue: VecDeque<GameCommand>,
    despawn_buffer: Vec<EntityId>,
}

impl SimulationEngine {
    /// Create an engine over `terrain` with still water.
    pub fn new(config: SimConfig, mut terrain: TerrainGrid) -> Self {
        terrain.set_simplify_tolerance_cells(config.outline_simplify_cells);
        info!(
            seed = config.seed,
            width = terrain.width(),
            height = terrain.height(),
            "simulation engine created"
        );
        Self {
            physics: PhysicsWorld::new(config.gravity),
            history: SnapshotHistory::new(config.snapshot_capacity, config.snapshot_interval_secs),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            world: GameWorld::new(),
            terrain,
            sync: Synchronizer::new(),
            fluid: Box::new(StillWater),
            time: SimTime::default(),
            state: SessionState::default(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            config,
        }
    }

    /// Replace the fluid collaborator.
    pub fn with_fluid(mut self, fluid: Box<dyn FluidField>) -> Self {
        self.fluid = fluid;
        self
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: GameCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = GameCommand>) {
        self.command_queue.extend(commands);
    }

    /// Process queued commands, then, unless paused, advance the world by
    /// `dt` seconds and record a snapshot.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        self.process_commands();

        let mut impacts = Vec::new();
        let snapshot = if self.state == SessionState::Running {
            self.run_systems(dt, &mut impacts);
            self.time.advance(dt as f64);
            let snapshot = self.build_snapshot();
            self.history.push(snapshot);
            self.history.head_snapshot().cloned().unwrap_or_default()
        } else {
            self.build_snapshot()
        };

        TickReport {
            time: self.time,
            impacts,
            snapshot,
        }
    }

    fn run_systems(&mut self, dt: f32, impacts: &mut Vec<ImpactEvent>) {
        // 1. Bodies follow entities and terrain.
        self.sync
            .prepare(&mut self.world, &mut self.physics, &self.terrain, &self.config);
        // 2. Physics step; contacts are only collected here.
        let contacts = self.sync.step(&mut self.physics, dt);
        // 3. Contact resolution.
        systems::contacts::run(
            &mut self.world,
            &mut self.physics,
            &mut self.terrain,
            &mut self.sync,
            &self.config,
            &contacts,
            impacts,
            &mut self.despawn_buffer,
        );
        // 4. Entities follow bodies.
        self.sync.pull(&mut self.world, &self.physics);
        // 5. Fluid.
        let entities = self.world.states();
        self.fluid.step(
            &FluidContext {
                entities: &entities,
                terrain: &self.terrain,
            },
            dt,
        );
        // 6. Instant shots.
        systems::instant_shots::run(
            &mut self.world,
            &mut self.physics,
            &mut self.terrain,
            &mut self.sync,
            &self.config,
            impacts,
            &mut self.despawn_buffer,
        );
        trace!(
            tick = self.time.tick,
            entities = self.world.len(),
            bodies = self.physics.body_count(),
            impacts = impacts.len(),
            "tick complete"
        );
    }

    /// Snapshot stamped with the history head time. `SnapshotHistory::push`
    /// restamps it with the new head.
    fn build_snapshot(&self) -> WorldSnapshot {
        systems::snapshot::build_snapshot(
            &self.world,
            self.history.head_time(),
            self.terrain.revision(),
        )
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: GameCommand) {
        match command {
            GameCommand::SpawnBall {
                position,
                velocity,
                player,
            } => {
                let id = self.world.spawn_ball(position, velocity, player);
                debug!(%id, player = player.0, "ball spawned");
            }
            GameCommand::SpawnShot {
                position,
                velocity,
                explosion_radius,
                health_impact_at_direct_hit,
                is_instant_shot,
            } => {
                self.world.spawn_shot(ShotSpawn {
                    position,
                    velocity,
                    explosion_radius,
                    health_impact_at_direct_hit,
                    is_instant_shot,
                    shooter: None,
                });
            }
            GameCommand::Aim { ball, direction } => {
                let direction = direction.normalize_or_zero();
                if direction == Vec2::ZERO {
                    debug!(%ball, "aim ignored: zero direction");
                } else if let Some(mut b) = self.world.get_mut::<Ball>(ball) {
                    b.aim_direction = direction;
                }
            }
            GameCommand::Charge { ball, charge } => {
                if let Some(mut b) = self.world.get_mut::<Ball>(ball) {
                    b.shoot_charge = charge.clamp(0.0, 1.0);
                }
            }
            GameCommand::Fire { ball, instant } => {
                self.fire(ball, instant);
            }
            GameCommand::GameMessage => {
                self.state = self.state.toggled();
                info!(state = ?self.state, "session state toggled");
            }
            GameCommand::Pause => self.state = SessionState::Paused,
            GameCommand::Resume => self.state = SessionState::Running,
        }
    }

    /// Spawn a shot from `ball` along its aim, powered by its charge.
    fn fire(&mut self, ball_id: EntityId, instant: bool) -> Option<EntityId> {
        if self.world.is_disposed(ball_id) || self.world.kind(ball_id) != Some(EntityKind::Ball) {
            debug!(ball = %ball_id, "fire ignored: no such ball");
            return None;
        }
        let ball = self.world.get::<Ball>(ball_id)?;
        let position = self.world.get::<Transform>(ball_id)?.position;
        let radius = self.world.get::<Collider>(ball_id)?.radius;

        let shot = self.world.spawn_shot(ShotSpawn {
            position: position + ball.aim_direction * (radius + SHOT_SPAWN_GAP),
            velocity: ball.aim_direction * ball.shoot_charge * SHOT_SPEED_PER_CHARGE,
            explosion_radius: SHOT_EXPLOSION_RADIUS,
            health_impact_at_direct_hit: SHOT_HEALTH_IMPACT,
            is_instant_shot: instant,
            shooter: Some(ball_id),
        });
        if let Some(mut b) = self.world.get_mut::<Ball>(ball_id) {
            b.shoot_charge = 0.0;
        }
        debug!(ball = %ball_id, %shot, instant, charge = ball.shoot_charge, "shot fired");
        Some(shot)
    }

    /// Render view at `render_time`, blended from the snapshot history.
    ///
    /// `render_time` is on the history axis: `history().head_time()` advances
    /// by the snapshot interval per recorded tick, not by `dt`, so derive
    /// render times from it rather than from `time()`.
    pub fn interpolated_view(&self, render_time: f64) -> Option<WorldSnapshot> {
        self.history.interpolated_view(render_time)
    }

    /// Current live entities, ordered by id.
    pub fn entities(&self) -> Vec<EntityState> {
        self.world.states()
    }

    pub fn entity(&self, id: EntityId) -> Option<EntityState> {
        self.world.state(id)
    }

    pub fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    pub fn fluid(&self) -> &dyn FluidField {
        self.fluid.as_ref()
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn sync(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    /// Spawn `teams` at spawn points drawn with the session RNG.
    pub fn spawn_teams(&mut self, spawn_points: &[Vec2], teams: &[Team]) -> Vec<EntityId> {
        world_setup::spawn_teams(&mut self.world, spawn_points, teams, &mut self.rng)
    }

    /// Whether bodies, map entries and entity links agree.
    pub fn is_consistent(&self) -> bool {
        self.sync.is_consistent(&self.world, &self.physics)
    }
}
