//! Simulation engine for Ballz.
//!
//! Owns the hecs entity world, the destructible terrain and the rapier2d
//! physics world, keeps them in sync, resolves shot impacts and records
//! snapshots for render interpolation.

pub mod engine;
pub mod fluid;
pub mod history;
pub mod impact;
pub mod physics;
pub mod sync;
pub mod systems;
pub mod world;
pub mod world_setup;

pub use ballz_core as core;
pub use ballz_terrain as terrain;
pub use engine::{SimulationEngine, TickReport};
pub use world_setup::{setup_session, Team};
