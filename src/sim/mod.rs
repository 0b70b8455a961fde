//! Deterministic simulation module
//!
//! All puzzle logic lives here. This module must stay deterministic:
//! - Seeded RNG only (random gem colors)
//! - Stable iteration order (mirror and emitter registration order)
//! - Presentation reached only through the [`Presentation`](crate::renderer::Presentation) trait

pub mod beam;
pub mod board;
pub mod color;
pub mod entity;
pub mod resolve;
pub mod tick;

pub use beam::{BeamEnd, BlockingHit, Emission, Segment, cast, emit};
pub use board::{Board, perimeter_slot};
pub use color::Color;
pub use entity::{CellCoord, Emitter, Entity, EntityId, EntityKind, Mirror, Opacity};
pub use resolve::resolve;
pub use tick::{TickReport, tick};
