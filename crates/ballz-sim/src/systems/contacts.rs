//! Contact system: resolves shots the physics step reported touching
//! something.

use tracing::{debug, trace};

use ballz_core::components::{Collider, PhysicsLink, Shot};
use ballz_core::config::SimConfig;
use ballz_core::constants::SHOT_SHOOTER_CLEARANCE;
use ballz_core::enums::{EntityKind, ImpactTrigger};
use ballz_core::events::ImpactEvent;
use ballz_core::types::EntityId;
use ballz_terrain::TerrainGrid;

use crate::impact::ImpactContext;
use crate::physics::{ContactReport, PhysicsWorld};
use crate::sync::Synchronizer;
use crate::world::GameWorld;

/// Resolve every shot in `contacts`, first reported contact first, then
/// release the resolved shots and their bodies. Contacts between a shot and
/// the ball that fired it are skipped while the shot is leaving the muzzle.
#[allow(clippy::too_many_arguments)]
pub fn run(
    world: &mut GameWorld,
    physics: &mut PhysicsWorld,
    terrain: &mut TerrainGrid,
    sync: &mut Synchronizer,
    config: &SimConfig,
    contacts: &[ContactReport],
    events: &mut Vec<ImpactEvent>,
    despawn_buffer: &mut Vec<EntityId>,
) {
    despawn_buffer.clear();
    {
        let mut ctx = ImpactContext {
            world: &mut *world,
            physics: &mut *physics,
            terrain: &mut *terrain,
            sync: &*sync,
            config,
        };
        for contact in contacts {
            for (own, other) in [
                (contact.body_a, contact.body_b),
                (contact.body_b, contact.body_a),
            ] {
                let Some(shot) = ctx.sync.lookup(own) else {
                    continue;
                };
                if ctx.world.kind(shot) != Some(EntityKind::Shot) {
                    continue;
                }
                let shooter = ctx.world.get::<Shot>(shot).and_then(|s| s.shooter);
                if shooter.is_some() && ctx.sync.lookup(other) == shooter {
                    trace!(%shot, "contact with shooter skipped");
                    continue;
                }
                let point = contact
                    .point
                    .or_else(|| ctx.physics.position(own))
                    .unwrap_or_default();
                if let Some(event) = ctx.resolve(shot, Some((other, point)), ImpactTrigger::Contact) {
                    events.push(event);
                    despawn_buffer.push(shot);
                }
            }
        }
    }

    trace!(
        contacts = contacts.len(),
        resolved = despawn_buffer.len(),
        "contacts processed"
    );
    for id in despawn_buffer.drain(..) {
        sync.release(world, physics, id);
    }
    clear_shooters(world, physics);
}

/// Reset `Shot::shooter` once a shot's surface is more than
/// `SHOT_SHOOTER_CLEARANCE` from its shooter's, or the shooter is gone.
fn clear_shooters(world: &mut GameWorld, physics: &PhysicsWorld) {
    let body_position = |world: &GameWorld, id: EntityId| {
        let PhysicsLink(handle) = world.get::<PhysicsLink>(id)?;
        let radius = world.get::<Collider>(id)?.radius;
        Some((physics.position(handle)?, radius))
    };

    let leaving: Vec<(EntityId, EntityId)> = world
        .ecs()
        .query::<(&EntityId, &Shot)>()
        .iter()
        .filter_map(|(_, (&id, shot))| Some((id, shot.shooter?)))
        .collect();

    for (shot, shooter) in leaving {
        let Some((shot_pos, shot_radius)) = body_position(&*world, shot) else {
            continue;
        };
        let clear = match body_position(&*world, shooter) {
            Some((pos, radius)) => {
                shot_pos.distance(pos) - shot_radius - radius > SHOT_SHOOTER_CLEARANCE
            }
            None => true,
        };
        if clear {
            if let Some(mut s) = world.get_mut::<Shot>(shot) {
                s.shooter = None;
            }
            debug!(%shot, %shooter, "shot cleared its shooter");
        }
    }
}
