//! Engine tuning
//!
//! Loaded from a JSON file; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{BoardError, BoardResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// World-space size of one grid cell
    pub cell_size: f32,
    /// Height of the board plane
    pub board_y: f32,
    /// Length of each ray segment
    pub max_ray_length: f32,
    /// Reflections allowed per emission
    pub max_bounces: u32,
    /// Mirror rotation speed (radians per second)
    pub mirror_rotation_speed: f32,
    /// Seed for random gem colors
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            board_y: BOARD_Y,
            max_ray_length: MAX_RAY_LENGTH,
            max_bounces: MAX_BOUNCES,
            mirror_rotation_speed: MIRROR_ROTATION_SPEED,
            seed: 0x5EED,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(BoardError::from)
            .and_then(|json| Self::from_json(&json));
        match parsed {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
