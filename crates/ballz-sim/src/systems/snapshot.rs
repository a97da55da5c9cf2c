//! Snapshot system: copies the entity set into a `WorldSnapshot`.
//!
//! Read-only; never modifies the world.

use ballz_core::state::WorldSnapshot;

use crate::world::GameWorld;

/// Snapshot of all live, non-disposed entities, ordered by id.
pub fn build_snapshot(world: &GameWorld, time_secs: f64, terrain_revision: u64) -> WorldSnapshot {
    WorldSnapshot {
        time_secs,
        terrain_revision,
        entities: world.states(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballz_core::types::PlayerId;
    use glam::Vec2;

    #[test]
    fn test_snapshot_is_ordered_and_excludes_disposed() {
        let mut world = GameWorld::new();
        let a = world.spawn_ball(Vec2::ZERO, Vec2::ZERO, PlayerId(1));
        let b = world.spawn_generic(Vec2::ONE, 1.0, true);
        let c = world.spawn_ball(Vec2::X, Vec2::ZERO, PlayerId(2));
        world.dispose(b);

        let snap = build_snapshot(&world, 0.5, 3);
        assert_eq!(snap.terrain_revision, 3);
        assert_eq!(snap.entities.iter().map(|e| e.id).collect::<Vec<_>>(), vec![a, c]);
    }
}
