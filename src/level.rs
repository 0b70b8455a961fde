//! Level descriptions
//!
//! A level is a grid of cell-type codes plus the number of beam emitters to
//! ring the board with. Levels load from JSON or come from the built-in set.

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, BoardResult};

/// What a level cell asks the board to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    /// Gem with a color token; an empty token means "random primary"
    Gem(&'static str),
    Mirror,
    /// In-grid emitter, firing right
    Emitter,
}

impl CellKind {
    pub const EMPTY: u32 = 0;
    pub const GEM_ANY: u32 = 1;
    pub const GEM_R: u32 = 2;
    pub const GEM_G: u32 = 3;
    pub const GEM_B: u32 = 4;
    pub const GEM_RG: u32 = 5;
    pub const GEM_RB: u32 = 6;
    pub const GEM_GB: u32 = 7;
    pub const GEM_RGB: u32 = 8;
    pub const MIRROR: u32 = 100;
    pub const EMITTER: u32 = 200;

    pub fn from_code(code: u32) -> BoardResult<Self> {
        Ok(match code {
            Self::EMPTY => CellKind::Empty,
            Self::GEM_ANY => CellKind::Gem(""),
            Self::GEM_R => CellKind::Gem("r"),
            Self::GEM_G => CellKind::Gem("g"),
            Self::GEM_B => CellKind::Gem("b"),
            Self::GEM_RG => CellKind::Gem("rg"),
            Self::GEM_RB => CellKind::Gem("rb"),
            Self::GEM_GB => CellKind::Gem("gb"),
            Self::GEM_RGB => CellKind::Gem("rgb"),
            Self::MIRROR => CellKind::Mirror,
            Self::EMITTER => CellKind::Emitter,
            other => return Err(BoardError::UnknownEntityType(other)),
        })
    }
}

/// Explicitly placed emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmitterDesc {
    pub row: i32,
    pub col: i32,
    /// 0=Right, 1=Down, 2=Left, 3=Up
    pub dir: u8,
    /// Candidate color tokens, e.g. ["r", "g", "b"]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDesc {
    pub rows: usize,
    pub cols: usize,
    /// Row-major cell-type codes
    pub cells: Vec<Vec<u32>>,
    /// Emitters auto-placed around the perimeter
    #[serde(default)]
    pub beam_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emitters: Vec<EmitterDesc>,
}

impl LevelDesc {
    /// An all-empty level
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![CellKind::EMPTY; cols]; rows],
            beam_count: 0,
            emitters: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &std::path::Path) -> BoardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set one cell code (grows nothing; out-of-range writes are ignored)
    pub fn with_cell(mut self, row: usize, col: usize, code: u32) -> Self {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = code;
        }
        self
    }

    pub fn with_emitter(mut self, emitter: EmitterDesc) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Code at (row, col), treating short rows as empty.
    ///
    /// Callers check row lengths first via [`LevelDesc::shape_errors`].
    pub fn code_at(&self, row: usize, col: usize) -> u32 {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(CellKind::EMPTY)
    }

    /// Rows whose length disagrees with `cols` (or missing rows)
    pub fn shape_errors(&self) -> Vec<BoardError> {
        (0..self.rows)
            .filter_map(|row| {
                let found = self.cells.get(row).map_or(0, Vec::len);
                (found != self.cols).then_some(BoardError::LevelShape {
                    row,
                    expected: self.cols,
                    found,
                })
            })
            .collect()
    }
}

/// The game's level set
pub fn builtin_levels() -> Vec<LevelDesc> {
    const A: u32 = CellKind::GEM_ANY;
    const R: u32 = CellKind::GEM_R;
    const G: u32 = CellKind::GEM_G;
    const B: u32 = CellKind::GEM_B;
    const M: u32 = CellKind::MIRROR;
    const O: u32 = CellKind::EMPTY;

    vec![
        LevelDesc {
            rows: 5,
            cols: 5,
            cells: vec![
                vec![A, A, A, A, A],
                vec![A, M, A, M, A],
                vec![A, A, A, A, A],
                vec![A, M, A, M, A],
                vec![A, A, A, A, A],
            ],
            beam_count: 4,
            emitters: Vec::new(),
        },
        LevelDesc {
            rows: 6,
            cols: 6,
            cells: vec![
                vec![R, O, G, G, O, B],
                vec![O, M, O, O, M, O],
                vec![G, O, A, A, O, R],
                vec![B, O, A, A, O, G],
                vec![O, M, O, O, M, O],
                vec![B, O, R, R, O, G],
            ],
            beam_count: 8,
            emitters: Vec::new(),
        },
    ]
}

/// Built-in level by 1-based number
pub fn builtin(level: usize) -> Option<LevelDesc> {
    builtin_levels().into_iter().nth(level.checked_sub(1)?)
}
