//! Color matching and removal

use super::board::Board;
use super::color::Color;
use super::entity::{CellCoord, EntityId};
use crate::renderer::Presentation;

/// Remove every destructible entity in `hits` whose color equals
/// `beam_color` and which still occupies its cell.
///
/// Returns the emptied cells in removal order. Entities already gone (earlier
/// duplicate in `hits`, another emitter this tick) are skipped, so calling this
/// again with the same hits removes nothing more.
pub fn resolve<P: Presentation + ?Sized>(
    board: &mut Board,
    scene: &mut P,
    beam_color: Color,
    hits: &[EntityId],
) -> Vec<CellCoord> {
    let mut removed = Vec::new();

    for &id in hits {
        let Some(entity) = board.entity(id) else {
            continue;
        };
        if entity.color != beam_color || !entity.is_destructible() {
            continue;
        }
        let pos = entity.pos;
        if board.occupant(pos) != Some(id) {
            continue;
        }

        board.clear_cell(pos);
        if let (Some(visual), Some(entity)) = (board.visual(id), board.entity(id)) {
            scene.play_destruction_effect(visual, entity);
        }
        log::debug!(
            "Removed {:?} ({}) at ({}, {})",
            id,
            beam_color.label(),
            pos.row,
            pos.col
        );
        removed.push(pos);
    }

    removed
}
