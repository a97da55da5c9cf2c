//! Destructible terrain for Ballz.
//!
//! A density field sampled on a regular grid, carved by circular
//! explosions. Produces a simplified boundary outline for collision and a
//! triangle mesh for rendering, both keyed by a monotonically increasing
//! revision.

pub use ballz_core as core;

mod contour;
pub mod grid;
pub mod map;
pub mod mesh;
pub mod outline;
pub mod simplify;
pub mod spawn;

// Re-export key types for convenience.
pub use grid::{TerrainError, TerrainGrid};
pub use map::{load_map, parse_map, MapError, TerrainMap};
pub use mesh::Triangle;
pub use outline::Polyline;
pub use spawn::select_spawn_points;
