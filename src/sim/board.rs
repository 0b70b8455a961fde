//! The board: a grid of cells, the entity table and the mirror/emitter indexes
//!
//! Cells hold entity ids. An occupied cell's entity always reports that
//! cell's coordinates as its position. Removed entities stay in the table
//! (hit lists may still name them) but never return to the grid.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::color::Color;
use super::entity::{CellCoord, Entity, EntityId, EntityKind};
use crate::Direction;
use crate::level::{CellKind, EmitterDesc, LevelDesc};
use crate::renderer::{Presentation, VisualHandle, VisualKind};
use crate::settings::Settings;

#[derive(Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<EntityId>>,
    entities: Vec<Entity>,
    /// Visual of each entity, indexed by entity id
    visuals: Vec<VisualHandle>,
    mirrors: Vec<EntityId>,
    emitters: Vec<EntityId>,
    settings: Settings,
    rng: Pcg32,
}

impl Board {
    /// Empty board
    pub fn new(rows: usize, cols: usize, settings: Settings) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            entities: Vec::new(),
            visuals: Vec::new(),
            mirrors: Vec::new(),
            emitters: Vec::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
        }
    }

    /// Build a board from a level description, creating every visual
    pub fn from_level<P: Presentation>(
        level: &LevelDesc,
        settings: Settings,
        scene: &mut P,
    ) -> Self {
        let mut board = Self::new(level.rows, level.cols, settings);

        for err in level.shape_errors() {
            log::warn!("{}", err);
        }

        for row in 0..level.rows {
            for col in 0..level.cols {
                let pos = CellCoord::new(row as i32, col as i32);
                match CellKind::from_code(level.code_at(row, col)) {
                    Ok(CellKind::Empty) => {}
                    Ok(CellKind::Gem(token)) => {
                        board.place_gem(pos, token, scene);
                    }
                    Ok(CellKind::Mirror) => {
                        board.place_mirror(pos, scene);
                    }
                    Ok(CellKind::Emitter) => {
                        board.place_emitter(pos, Direction::Right, scene);
                    }
                    Err(e) => log::warn!("Cell ({}, {}) left empty: {}", row, col, e),
                }
            }
        }

        for i in 0..level.beam_count {
            let Some((pos, dir)) = perimeter_slot(i, level.rows, level.cols) else {
                log::warn!(
                    "beamCount {} exceeds the {} perimeter slots; extra emitters ignored",
                    level.beam_count,
                    2 * (level.rows + level.cols)
                );
                break;
            };
            board.place_emitter(pos, dir, scene);
        }

        for desc in &level.emitters {
            board.place_emitter_desc(desc, scene);
        }

        log::info!(
            "Board {}x{}: {} gems, {} mirrors, {} emitters",
            board.rows,
            board.cols,
            board.gem_count(),
            board.mirrors.len(),
            board.emitters.len()
        );
        board
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn in_bounds(&self, pos: CellCoord) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.rows
            && (pos.col as usize) < self.cols
    }

    fn index(&self, pos: CellCoord) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.row as usize * self.cols + pos.col as usize)
    }

    /// Entity occupying a cell, if any
    pub fn occupant(&self, pos: CellCoord) -> Option<EntityId> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    /// Entity occupying a cell, if any
    pub fn cell(&self, row: i32, col: i32) -> Option<&Entity> {
        self.occupant(CellCoord::new(row, col))
            .and_then(|id| self.entity(id))
    }

    pub fn is_empty(&self, pos: CellCoord) -> bool {
        self.occupant(pos).is_none()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0 as usize)
    }

    pub fn visual(&self, id: EntityId) -> Option<VisualHandle> {
        self.visuals.get(id.0 as usize).copied()
    }

    /// Mirrors in placement order
    pub fn mirrors(&self) -> &[EntityId] {
        &self.mirrors
    }

    /// Emitters in registration order
    pub fn emitters(&self) -> &[EntityId] {
        &self.emitters
    }

    /// Gems still on the grid
    pub fn gem_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|id| matches!(self.entity(**id).map(|e| &e.kind), Some(EntityKind::Gem)))
            .count()
    }

    /// World-space center of a cell (also valid for perimeter cells)
    pub fn cell_center(&self, pos: CellCoord) -> Vec3 {
        let cell = self.settings.cell_size;
        let width = cell * self.cols as f32;
        let height = cell * self.rows as f32;
        let left_x = -width / 2.0 + cell / 2.0;
        let top_z = height / 2.0 - cell / 2.0;
        Vec3::new(
            left_x + pos.col as f32 * cell,
            self.settings.board_y,
            top_z - pos.row as f32 * cell,
        )
    }

    /// Put a gem in an empty in-grid cell
    pub fn place_gem<P: Presentation>(
        &mut self,
        pos: CellCoord,
        token: &str,
        scene: &mut P,
    ) -> Option<EntityId> {
        if !self.can_occupy(pos) {
            return None;
        }
        let id = self.next_id();
        let entity = Entity::gem(id, token, &mut self.rng);
        Some(self.insert(entity, pos, scene))
    }

    /// Put a mirror in an empty in-grid cell
    pub fn place_mirror<P: Presentation>(
        &mut self,
        pos: CellCoord,
        scene: &mut P,
    ) -> Option<EntityId> {
        if !self.can_occupy(pos) {
            return None;
        }
        let id = self.next_id();
        let entity = Entity::mirror(id, self.settings.mirror_rotation_speed);
        let id = self.insert(entity, pos, scene);
        self.mirrors.push(id);
        Some(id)
    }

    /// Register an emitter. Emitters may sit outside the grid; inside it they
    /// need an empty cell.
    pub fn place_emitter<P: Presentation>(
        &mut self,
        pos: CellCoord,
        direction: Direction,
        scene: &mut P,
    ) -> Option<EntityId> {
        if self.in_bounds(pos) && !self.can_occupy(pos) {
            return None;
        }
        let id = self.next_id();
        let mut entity = Entity::emitter(id, direction);
        if let Some(emitter) = entity.as_emitter_mut() {
            emitter.powered = true;
        }
        let id = self.insert(entity, pos, scene);
        self.emitters.push(id);
        Some(id)
    }

    fn place_emitter_desc<P: Presentation>(&mut self, desc: &EmitterDesc, scene: &mut P) {
        let pos = CellCoord::new(desc.row, desc.col);
        let Some(id) = self.place_emitter(pos, Direction::from_code(desc.dir), scene) else {
            return;
        };
        let colors: Vec<Color> = desc
            .colors
            .iter()
            .filter_map(|token| {
                let color = Color::from_token(token);
                if color.is_empty() {
                    log::warn!(
                        "Emitter {:?}: color token {:?} has no channels, skipped",
                        id,
                        token
                    );
                    None
                } else {
                    Some(color)
                }
            })
            .collect();
        if let Some(emitter) = self.entity_mut(id).and_then(Entity::as_emitter_mut) {
            if !colors.is_empty() {
                emitter.colors = colors;
            }
            if let Some(index) = desc.color_index {
                emitter.color_index = index;
            }
            emitter.color_index %= emitter.colors.len().max(1);
        }
    }

    fn can_occupy(&self, pos: CellCoord) -> bool {
        if !self.in_bounds(pos) {
            log::warn!(
                "Cell ({}, {}) is outside the {}x{} grid",
                pos.row,
                pos.col,
                self.rows,
                self.cols
            );
            return false;
        }
        if !self.is_empty(pos) {
            log::warn!("Cell ({}, {}) is already occupied", pos.row, pos.col);
            return false;
        }
        true
    }

    fn next_id(&self) -> EntityId {
        EntityId(self.entities.len() as u32)
    }

    fn insert<P: Presentation>(
        &mut self,
        mut entity: Entity,
        pos: CellCoord,
        scene: &mut P,
    ) -> EntityId {
        let id = entity.id;
        entity.pos = pos;
        let visual = scene.create_visual(
            id,
            VisualKind::for_entity(&entity),
            self.cell_center(pos),
            entity.yaw(),
        );
        if let Some(i) = self.index(pos) {
            self.cells[i] = Some(id);
        }
        self.entities.push(entity);
        self.visuals.push(visual);
        id
    }

    /// Empty a cell. Returns the entity that was there.
    pub(crate) fn clear_cell(&mut self, pos: CellCoord) -> Option<EntityId> {
        let i = self.index(pos)?;
        self.cells[i].take()
    }

    /// Player clicked a mirror: flip its rotation. Returns the new state.
    pub fn toggle_mirror_rotation(&mut self, id: EntityId) -> Option<bool> {
        let mirror = self.entity_mut(id)?.as_mirror_mut()?;
        mirror.rotating = !mirror.rotating;
        log::debug!("Mirror {:?} rotating: {}", id, mirror.rotating);
        Some(mirror.rotating)
    }

    /// Player asked an emitter for its next color. Returns the new active color.
    pub fn cycle_emitter_color(&mut self, id: EntityId) -> Option<Color> {
        let emitter = self.entity_mut(id)?.as_emitter_mut()?;
        emitter.cycle_color();
        log::debug!("Emitter {:?} color: {}", id, emitter.active_color().label());
        Some(emitter.active_color())
    }
}

/// Position and inward direction of the `i`-th perimeter emitter.
///
/// Slots run along the top edge left to right, down the right edge, along the
/// bottom edge right to left, then up the left edge.
pub fn perimeter_slot(i: usize, rows: usize, cols: usize) -> Option<(CellCoord, Direction)> {
    let (r, c) = (rows as i32, cols as i32);
    let i = i as i32;
    if i < c {
        Some((CellCoord::new(-1, i), Direction::Down))
    } else if i < c + r {
        Some((CellCoord::new(i - c, c), Direction::Left))
    } else if i < 2 * c + r {
        Some((CellCoord::new(r, c - 1 - (i - c - r)), Direction::Up))
    } else if i < 2 * c + 2 * r {
        Some((CellCoord::new(r - 1 - (i - 2 * c - r), -1), Direction::Right))
    } else {
        None
    }
}
