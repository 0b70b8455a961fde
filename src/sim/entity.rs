//! Entities that live on the board: gems, mirrors and beam emitters
//!
//! Every entity shares position, opacity, hit points and color. Kind-specific
//! state lives in [`EntityKind`].

use rand::Rng;

use super::color::Color;
use crate::consts::*;
use crate::{Direction, wrap_angle};

/// Stable index of an entity in the board's entity table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Grid coordinate. Emitters placed on the perimeter ring sit one step
/// outside the grid, so both components are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: i32,
    pub col: i32,
}

impl CellCoord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// How an entity interacts with a beam
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opacity {
    /// Beam passes through; the entity is still recorded as hit
    Transparent,
    /// Beam stops
    Block,
    /// Beam stops and bounces
    Reflect,
}

impl Opacity {
    #[inline]
    pub fn is_blocking(self) -> bool {
        self != Opacity::Transparent
    }
}

/// Rotation state of a mirror
#[derive(Debug, Clone)]
pub struct Mirror {
    /// Toggled by the player
    pub rotating: bool,
    /// Radians per second
    pub rotation_speed: f32,
    /// Current yaw in [0, 2π)
    pub angle: f32,
}

impl Mirror {
    /// Advance the yaw by `delta_ms` if rotating. Returns true when the angle changed.
    pub fn advance(&mut self, delta_ms: f32) -> bool {
        if !self.rotating {
            return false;
        }
        self.angle = wrap_angle(self.angle + self.rotation_speed * delta_ms / 1000.0);
        true
    }
}

/// Beam source state
#[derive(Debug, Clone)]
pub struct Emitter {
    pub direction: Direction,
    /// Candidate beam colors, cycled in order
    pub colors: Vec<Color>,
    pub color_index: usize,
    /// Set at placement; emission does not consult it
    pub powered: bool,
}

impl Emitter {
    /// Default candidates, starting on green
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            colors: vec![Color::RED, Color::GREEN, Color::BLUE],
            color_index: 1,
            powered: false,
        }
    }

    pub fn active_color(&self) -> Color {
        self.colors
            .get(self.color_index)
            .copied()
            .unwrap_or(Color::NONE)
    }

    /// Advance to the next candidate color, wrapping around
    pub fn cycle_color(&mut self) {
        if !self.colors.is_empty() {
            self.color_index = (self.color_index + 1) % self.colors.len();
        }
    }
}

/// Kind-specific data
#[derive(Debug, Clone)]
pub enum EntityKind {
    Gem,
    Mirror(Mirror),
    Emitter(Emitter),
}

/// A board entity
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub pos: CellCoord,
    pub opacity: Opacity,
    pub hit_points: u32,
    /// Never changes after creation
    pub color: Color,
    pub kind: EntityKind,
}

impl Entity {
    /// Gem with an explicit color token, or a random primary if the token
    /// yields no color
    pub fn gem<R: Rng + ?Sized>(id: EntityId, token: &str, rng: &mut R) -> Self {
        let mut color = Color::from_token(token);
        if color.is_empty() {
            color = Color::random_primary(rng);
        }
        Self {
            id,
            pos: CellCoord::new(0, 0),
            opacity: Opacity::Transparent,
            hit_points: GEM_HIT_POINTS,
            color,
            kind: EntityKind::Gem,
        }
    }

    pub fn mirror(id: EntityId, rotation_speed: f32) -> Self {
        Self {
            id,
            pos: CellCoord::new(0, 0),
            opacity: Opacity::Reflect,
            hit_points: HITPOINTS_INDESTRUCTIBLE,
            color: Color::NONE,
            kind: EntityKind::Mirror(Mirror {
                rotating: false,
                rotation_speed,
                angle: MIRROR_BASE_YAW,
            }),
        }
    }

    pub fn emitter(id: EntityId, direction: Direction) -> Self {
        Self {
            id,
            pos: CellCoord::new(0, 0),
            opacity: Opacity::Block,
            hit_points: HITPOINTS_INDESTRUCTIBLE,
            color: Color::NONE,
            kind: EntityKind::Emitter(Emitter::new(direction)),
        }
    }

    pub fn is_destructible(&self) -> bool {
        self.hit_points < HITPOINTS_INDESTRUCTIBLE
    }

    pub fn as_mirror(&self) -> Option<&Mirror> {
        match &self.kind {
            EntityKind::Mirror(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mirror_mut(&mut self) -> Option<&mut Mirror> {
        match &mut self.kind {
            EntityKind::Mirror(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_emitter(&self) -> Option<&Emitter> {
        match &self.kind {
            EntityKind::Emitter(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_emitter_mut(&mut self) -> Option<&mut Emitter> {
        match &mut self.kind {
            EntityKind::Emitter(e) => Some(e),
            _ => None,
        }
    }

    /// Yaw the visual should be shown with
    pub fn yaw(&self) -> f32 {
        match &self.kind {
            EntityKind::Gem => 0.0,
            EntityKind::Mirror(m) => m.angle,
            EntityKind::Emitter(e) => e.direction.angle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_gem_explicit_color() {
        let mut rng = Pcg32::seed_from_u64(1);
        let gem = Entity::gem(EntityId(0), "rg", &mut rng);
        assert_eq!(gem.color, Color::RED | Color::GREEN);
        assert!(gem.is_destructible());
        assert_eq!(gem.opacity, Opacity::Transparent);
        assert_eq!(gem.hit_points, 1);
    }

    #[test]
    fn test_mirror_and_emitter_indestructible() {
        let mirror = Entity::mirror(EntityId(0), MIRROR_ROTATION_SPEED);
        let emitter = Entity::emitter(EntityId(1), Direction::Right);
        assert!(!mirror.is_destructible());
        assert!(!emitter.is_destructible());
        assert_eq!(mirror.opacity, Opacity::Reflect);
        assert_eq!(emitter.opacity, Opacity::Block);
        assert_eq!(mirror.color, Color::NONE);
    }

    #[test]
    fn test_emitter_color_cycle() {
        let mut emitter = Emitter::new(Direction::Up);
        assert_eq!(emitter.active_color(), Color::GREEN);
        emitter.cycle_color();
        assert_eq!(emitter.active_color(), Color::BLUE);
        emitter.cycle_color();
        assert_eq!(emitter.active_color(), Color::RED);
    }

    #[test]
    fn test_mirror_advance() {
        let mut mirror = Mirror {
            rotating: false,
            rotation_speed: PI / 8.0,
            angle: 1.0,
        };
        assert!(!mirror.advance(1000.0));
        assert_eq!(mirror.angle, 1.0);

        mirror.rotating = true;
        assert!(mirror.advance(1000.0));
        assert!((mirror.angle - (1.0 + PI / 8.0)).abs() < 1e-6);

        // Wraps past a full turn
        mirror.angle = TAU - 0.1;
        mirror.advance(1000.0);
        assert!(mirror.angle >= 0.0 && mirror.angle < TAU);
        assert!((mirror.angle - (PI / 8.0 - 0.1)).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_empty_token_yields_single_primary(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let gem = Entity::gem(EntityId(0), "", &mut rng);
            prop_assert!(
                gem.color == Color::RED || gem.color == Color::GREEN || gem.color == Color::BLUE
            );
        }
    }
}
