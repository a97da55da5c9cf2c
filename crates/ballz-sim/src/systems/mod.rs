//! Per-tick systems run by the engine after the physics step.
//!
//! Systems are free functions over explicit state. None of them keeps
//! state of its own between ticks.

pub mod contacts;
pub mod instant_shots;
pub mod snapshot;
