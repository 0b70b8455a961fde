//! Board setup diagnostics
//!
//! Per-cell problems are recovered where they occur and only logged; file and
//! JSON problems are returned to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    /// A gem color token contained something other than r/g/b
    #[error("invalid color token {token:?}: unexpected character {ch:?}")]
    InvalidColorToken { token: String, ch: char },

    /// A level cell used a code no entity kind is registered for
    #[error("unknown entity type code {0}")]
    UnknownEntityType(u32),

    /// A raw direction code outside 0..=3
    #[error("unknown direction code {0}")]
    UnknownDirection(u8),

    /// A level row whose length disagrees with the declared column count
    #[error("level row {row} has {found} cells, expected {expected}")]
    LevelShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("level parse error: {0}")]
    LevelParse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BoardResult<T> = Result<T, BoardError>;
