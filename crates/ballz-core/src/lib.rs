//! Core types and definitions for the Ballz simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, world snapshots, events, constants and the
//! simulation config. It has no dependency on the physics engine or any
//! runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
