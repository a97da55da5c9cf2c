//! Instant shot system: hitscan projectiles resolve by raycast in the tick
//! they exist, then disappear whether they hit or not.

use glam::Vec2;

use ballz_core::components::{PhysicsLink, Shot, Transform, Velocity};
use ballz_core::config::SimConfig;
use ballz_core::enums::ImpactTrigger;
use ballz_core::events::ImpactEvent;
use ballz_core::types::{BodyHandle, EntityId};
use ballz_terrain::TerrainGrid;

use crate::impact::ImpactContext;
use crate::physics::PhysicsWorld;
use crate::sync::Synchronizer;
use crate::world::GameWorld;

/// All rays are cast against the same post-step world before any of them
/// is resolved, so a crater from one shot does not change another's hit.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut GameWorld,
    physics: &mut PhysicsWorld,
    terrain: &mut TerrainGrid,
    sync: &mut Synchronizer,
    config: &SimConfig,
    events: &mut Vec<ImpactEvent>,
    despawn_buffer: &mut Vec<EntityId>,
) {
    despawn_buffer.clear();
    let mut pending: Vec<(EntityId, Vec2, Vec2, Option<BodyHandle>)> = Vec::new();
    for (_, (id, shot, transform, velocity, link)) in world
        .ecs()
        .query::<(&EntityId, &Shot, &Transform, &Velocity, Option<&PhysicsLink>)>()
        .iter()
    {
        if shot.is_instant_shot && shot.target.is_none() {
            pending.push((*id, transform.position, velocity.0, link.map(|l| l.0)));
        }
    }
    if pending.is_empty() {
        return;
    }

    physics.refresh_queries();
    let hits: Vec<_> = pending
        .into_iter()
        .map(|(id, origin, velocity, body)| {
            let hit = if velocity == Vec2::ZERO {
                None
            } else {
                physics.cast_ray(origin, velocity, config.instant_shot_range_factor, body)
            };
            (id, hit)
        })
        .collect();

    {
        let mut ctx = ImpactContext {
            world: &mut *world,
            physics: &mut *physics,
            terrain: &mut *terrain,
            sync: &*sync,
            config,
        };
        for (id, hit) in hits {
            if let Some(event) = ctx.resolve(id, hit, ImpactTrigger::Raycast) {
                events.push(event);
            }
            despawn_buffer.push(id);
        }
    }

    for id in despawn_buffer.drain(..) {
        sync.release(world, physics, id);
    }
}
