//! Beam and gem colors as a 3-bit channel mask
//!
//! Matching is exact mask equality: a red beam does not break a red+green gem.

use bitflags::bitflags;
use rand::Rng;

use crate::error::BoardError;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Color: u8 {
        const BLUE = 0b001;
        const GREEN = 0b010;
        const RED = 0b100;
    }
}

impl Color {
    /// The empty mask, carried by mirrors and emitters
    pub const NONE: Color = Color::empty();
    pub const RG: Color = Color::RED.union(Color::GREEN);
    pub const RB: Color = Color::RED.union(Color::BLUE);
    pub const GB: Color = Color::GREEN.union(Color::BLUE);
    pub const RGB: Color = Color::all();

    /// Parse a token made of the letters r, g and b (OR'd together).
    ///
    /// Unrecognized characters are logged and skipped.
    pub fn from_token(token: &str) -> Color {
        let mut color = Color::NONE;
        for ch in token.chars() {
            match ch {
                'r' => color |= Color::RED,
                'g' => color |= Color::GREEN,
                'b' => color |= Color::BLUE,
                _ => log::warn!(
                    "{}",
                    BoardError::InvalidColorToken {
                        token: token.to_string(),
                        ch,
                    }
                ),
            }
        }
        color
    }

    /// Uniformly pick one primary channel
    pub fn random_primary<R: Rng + ?Sized>(rng: &mut R) -> Color {
        match rng.random_range(0..3) {
            0 => Color::RED,
            1 => Color::GREEN,
            _ => Color::BLUE,
        }
    }

    /// Display color as linear RGB (channel on = 1.0)
    pub fn to_rgb(self) -> [f32; 3] {
        let channel = |c: Color| if self.contains(c) { 1.0 } else { 0.0 };
        [channel(Color::RED), channel(Color::GREEN), channel(Color::BLUE)]
    }

    /// Short label like "rg", or "-" for no color
    pub fn label(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut s = String::with_capacity(3);
        if self.contains(Color::RED) {
            s.push('r');
        }
        if self.contains(Color::GREEN) {
            s.push('g');
        }
        if self.contains(Color::BLUE) {
            s.push('b');
        }
        s
    }
}
