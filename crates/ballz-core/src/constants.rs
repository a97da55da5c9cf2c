//! Simulation constants and tuning parameters.
//!
//! These are the defaults behind `SimConfig`; systems read the config,
//! not these constants directly.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Gravity acceleration (world units / s²), y points up.
pub const GRAVITY: [f32; 2] = [0.0, -9.82];

// --- World bounds ---

/// Entities farther than this from the origin are removed.
pub const PLAY_AREA_RADIUS: f32 = 100.0;

// --- Snapshots ---

/// Number of discrete snapshots kept for render interpolation.
pub const SNAPSHOT_CAPACITY: usize = 6;

/// Logical time between two snapshots (seconds). History time advances by
/// this per recorded tick, independent of the simulation `dt`.
pub const SNAPSHOT_INTERVAL_SECS: f64 = 0.016;

// --- Impacts ---

/// Crater radius = factor * shot speed * explosion radius.
pub const CRATER_SPEED_FACTOR: f32 = 0.04;

/// Impulse applied to a ball on direct hit = multiplier * shot velocity.
pub const KNOCKBACK_MULTIPLIER: f32 = 10.0;

/// Instant shots raycast up to this many velocity lengths.
pub const INSTANT_SHOT_RANGE_FACTOR: f32 = 100.0;

// --- Balls ---

pub const BALL_RADIUS: f32 = 0.5;
pub const BALL_MAX_HEALTH: f32 = 100.0;
pub const BALL_MASS: f32 = 10.0;
pub const BALL_FRICTION: f32 = 2.0;
pub const BALL_RESTITUTION: f32 = 0.1;

/// Squared speed below which a ball is considered idle for facing.
pub const BALL_IDLE_SPEED_SQ: f32 = 1e-4;

/// Facing angle of a ball (radians); sign follows horizontal velocity.
pub const BALL_FACING_ANGLE: f32 = std::f32::consts::FRAC_PI_2;

// --- Shots ---

pub const SHOT_RADIUS: f32 = 0.1;
pub const SHOT_EXPLOSION_RADIUS: f32 = 1.0;
pub const SHOT_HEALTH_IMPACT: f32 = 25.0;

/// Muzzle speed at full charge.
pub const SHOT_SPEED_PER_CHARGE: f32 = 30.0;

/// Distance from ball surface to the centre of a freshly fired shot.
pub const SHOT_SPAWN_GAP: f32 = 0.101;

/// Surface gap a shot must open to its shooter before it can hit it.
pub const SHOT_SHOOTER_CLEARANCE: f32 = 0.05;

// --- Terrain ---

/// Density at and above which a terrain sample counts as solid.
pub const TERRAIN_ISO_LEVEL: f32 = 0.5;

/// Friction of terrain collision bodies.
pub const TERRAIN_FRICTION: f32 = 1.0;

/// Outline simplification tolerance, in cells.
pub const OUTLINE_SIMPLIFY_CELLS: f32 = 0.25;

/// Random tries to find an unused spawn point before accepting a duplicate.
pub const SPAWN_SELECT_TRIES: usize = 20;
