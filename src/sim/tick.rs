//! Per-frame simulation tick
//!
//! Rotates mirrors, then fires every emitter against the updated geometry and
//! removes what each beam matched.

use super::beam::{Emission, emit};
use super::board::Board;
use super::entity::CellCoord;
use super::resolve::resolve;
use crate::renderer::Presentation;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Cells emptied this tick, in removal order
    pub removed: Vec<CellCoord>,
    /// One emission per emitter, in registration order
    pub beams: Vec<Emission>,
}

/// Advance the board by `delta_ms` milliseconds
pub fn tick<P: Presentation + ?Sized>(
    board: &mut Board,
    scene: &mut P,
    delta_ms: f32,
) -> TickReport {
    // Mirrors first so every emitter sees the same geometry
    let mirrors = board.mirrors().to_vec();
    for id in mirrors {
        let Some(entity) = board.entity_mut(id) else {
            continue;
        };
        let Some(mirror) = entity.as_mirror_mut() else {
            continue;
        };
        if !mirror.advance(delta_ms) {
            continue;
        }
        let angle = mirror.angle;
        if let Some(visual) = board.visual(id) {
            scene.set_orientation(visual, angle);
        }
    }

    let mut report = TickReport::default();
    let emitters = board.emitters().to_vec();
    for id in emitters {
        let Some(emission) = emit(board, &*scene, id) else {
            continue;
        };
        scene.draw_beam_path(id, &emission.path, emission.color);
        let removed = resolve(board, scene, emission.color, &emission.hits);
        report.removed.extend(removed);
        report.beams.push(emission);
    }

    if !report.removed.is_empty() {
        log::debug!(
            "Tick removed {} cell(s), {} gem(s) left",
            report.removed.len(),
            board.gem_count()
        );
    }
    report
}
