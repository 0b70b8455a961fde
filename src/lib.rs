//! Beamstone - colored beams, rotating mirrors and breakable gems on a tile grid
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, entities, beam casting, match resolution)
//! - `renderer`: Presentation-layer seam and a headless scene adapter
//! - `level`: Level descriptions and the built-in level set
//! - `settings`: Data-driven engine tuning

pub mod error;
pub mod level;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::BoardError;
pub use level::LevelDesc;
pub use settings::Settings;

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Board configuration constants
pub mod consts {
    use std::f32::consts::{FRAC_PI_4, PI};

    /// World-space edge length of one grid cell (even, so cell centers stay integral)
    pub const CELL_SIZE: f32 = 2.0;
    /// Height of the board plane; beams travel at this height
    pub const BOARD_Y: f32 = 1.0;

    /// Maximum length of a single ray segment
    pub const MAX_RAY_LENGTH: f32 = 100.0;
    /// Maximum reflective transitions per emission
    pub const MAX_BOUNCES: u32 = 10;
    /// Facets 0..=3 are the two broad faces of a mirror (two facets per face)
    pub const LAST_REFLECTIVE_FACE: u32 = 3;

    /// Mirror defaults
    pub const MIRROR_ROTATION_SPEED: f32 = PI / 8.0; // radians per second
    pub const MIRROR_BASE_YAW: f32 = FRAC_PI_4;
    pub const MIRROR_WIDTH: f32 = 1.0;
    pub const MIRROR_HEIGHT: f32 = 1.0;
    pub const MIRROR_DEPTH: f32 = 0.05;

    /// Gem defaults
    pub const GEM_RADIUS: f32 = 0.4;
    pub const GEM_HIT_POINTS: u32 = 1;

    /// Emitter body (a short bar along its firing axis)
    pub const EMITTER_LENGTH: f32 = 1.0;
    pub const EMITTER_DIAMETER: f32 = 0.3;

    /// Hit-point sentinel for anything that can never be destroyed
    pub const HITPOINTS_INDESTRUCTIBLE: u32 = u32::MAX;
}

/// Axis-aligned compass direction on the board
///
/// Rows grow downward (toward -Z), columns grow rightward (toward +X).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Decode a raw level direction code (0=Right, 1=Down, 2=Left, 3=Up).
    ///
    /// Unknown codes are logged and fall back to `Up`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Direction::Right,
            1 => Direction::Down,
            2 => Direction::Left,
            3 => Direction::Up,
            other => {
                log::warn!("{}", BoardError::UnknownDirection(other));
                Direction::Up
            }
        }
    }

    /// Unit vector in world space
    pub fn vector(self) -> Vec3 {
        match self {
            Direction::Right => Vec3::X,
            Direction::Down => Vec3::NEG_Z,
            Direction::Left => Vec3::NEG_X,
            Direction::Up => Vec3::Z,
        }
    }

    /// Yaw (rotation about +Y) that turns a +X-facing visual toward this direction
    pub fn angle(self) -> f32 {
        match self {
            Direction::Right => 0.0,
            Direction::Down => FRAC_PI_2,
            Direction::Left => PI,
            Direction::Up => PI * 3.0 / 2.0,
        }
    }

    /// (row, col) step taken when moving one cell in this direction
    pub fn cell_step(self) -> (i32, i32) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
        }
    }
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Reflect a direction off a surface with unit normal `n`: r = d - 2(d·n)n
#[inline]
pub fn reflect(d: Vec3, n: Vec3) -> Vec3 {
    d - 2.0 * d.dot(n) * n
}
