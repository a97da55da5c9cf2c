//! Simulation configuration.
//!
//! Every field defaults to the matching value in `constants`, so a config
//! file only needs the keys it overrides.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Physical properties given to every ball body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallPhysics {
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BallPhysics {
    fn default() -> Self {
        Self {
            mass: BALL_MASS,
            friction: BALL_FRICTION,
            restitution: BALL_RESTITUTION,
        }
    }
}

/// Configuration for a simulation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for spawn selection. Same seed = same session layout.
    pub seed: u64,
    pub gravity: Vec2,
    /// Distance from the origin beyond which entities are removed.
    pub play_area_radius: f32,
    pub snapshot_capacity: usize,
    pub snapshot_interval_secs: f64,
    pub crater_speed_factor: f32,
    /// Upper bound on crater radius. `None` keeps craters unbounded.
    pub max_crater_radius: Option<f32>,
    pub knockback_multiplier: f32,
    pub instant_shot_range_factor: f32,
    pub ball: BallPhysics,
    /// Outline simplification tolerance, in terrain cells.
    pub outline_simplify_cells: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            gravity: Vec2::from(GRAVITY),
            play_area_radius: PLAY_AREA_RADIUS,
            snapshot_capacity: SNAPSHOT_CAPACITY,
            snapshot_interval_secs: SNAPSHOT_INTERVAL_SECS,
            crater_speed_factor: CRATER_SPEED_FACTOR,
            max_crater_radius: None,
            knockback_multiplier: KNOCKBACK_MULTIPLIER,
            instant_shot_range_factor: INSTANT_SHOT_RANGE_FACTOR,
            ball: BallPhysics::default(),
            outline_simplify_cells: OUTLINE_SIMPLIFY_CELLS,
        }
    }
}

impl SimConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "snapshot_capacity",
                reason: "must hold at least one snapshot",
            });
        }
        if !(self.snapshot_interval_secs > 0.0) {
            return Err(ConfigError::Invalid {
                field: "snapshot_interval_secs",
                reason: "must be positive",
            });
        }
        if !(self.play_area_radius > 0.0) {
            return Err(ConfigError::Invalid {
                field: "play_area_radius",
                reason: "must be positive",
            });
        }
        if self.max_crater_radius.is_some_and(|r| !(r >= 0.0)) {
            return Err(ConfigError::Invalid {
                field: "max_crater_radius",
                reason: "must not be negative",
            });
        }
        if !(self.ball.mass > 0.0) {
            return Err(ConfigError::Invalid {
                field: "ball.mass",
                reason: "must be positive",
            });
        }
        if self.outline_simplify_cells < 0.0 {
            return Err(ConfigError::Invalid {
                field: "outline_simplify_cells",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
