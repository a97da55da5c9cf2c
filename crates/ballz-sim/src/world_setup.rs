//! Session setup: terrain from a map, balls at its spawn points.

use glam::Vec2;
use rand::Rng;
use tracing::{info, warn};

use ballz_core::config::SimConfig;
use ballz_core::types::{EntityId, PlayerId};
use ballz_terrain::{select_spawn_points, TerrainMap};

use crate::engine::SimulationEngine;
use crate::world::GameWorld;

/// One player and how many balls they field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub player: PlayerId,
    pub balls: usize,
}

/// Spawn every team's balls at randomly selected spawn points, resting.
/// Returns the new ball ids, team by team.
pub fn spawn_teams<R: Rng + ?Sized>(
    world: &mut GameWorld,
    spawn_points: &[Vec2],
    teams: &[Team],
    rng: &mut R,
) -> Vec<EntityId> {
    let total: usize = teams.iter().map(|t| t.balls).sum();
    let positions = select_spawn_points(spawn_points, total, rng);
    if positions.len() < total {
        warn!(requested = total, "map has no spawn points; no balls spawned");
    }

    let owners = teams
        .iter()
        .flat_map(|t| std::iter::repeat(t.player).take(t.balls));
    positions
        .into_iter()
        .zip(owners)
        .map(|(position, player)| world.spawn_ball(position, Vec2::ZERO, player))
        .collect()
}

/// Build an engine over `map` and spawn `teams` on it.
pub fn setup_session(
    config: SimConfig,
    map: TerrainMap,
    teams: &[Team],
) -> (SimulationEngine, Vec<EntityId>) {
    let TerrainMap { grid, spawn_points } = map;
    let mut engine = SimulationEngine::new(config, grid);

    let balls = engine.spawn_teams(&spawn_points, teams);

    info!(
        teams = teams.len(),
        balls = balls.len(),
        spawn_points = spawn_points.len(),
        "session set up"
    );
    (engine, balls)
}
