//! Beam casting: ray segments and the bounce recurrence
//!
//! A beam starts at its emitter and is traced one segment at a time. Each
//! segment asks the scene for every surface along the ray, stops at the
//! nearest blocking surface, and bounces if that surface is a mirror's broad
//! face. Nothing is cached between ticks; every emission is recomputed from the
//! current board and mirror angles.

use glam::Vec3;

use super::board::Board;
use super::color::Color;
use super::entity::{EntityId, Opacity};
use crate::consts::LAST_REFLECTIVE_FACE;
use crate::reflect;
use crate::renderer::{Presentation, RayHit, VisualHandle};

/// The surface that stopped a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockingHit {
    pub entity: EntityId,
    pub opacity: Opacity,
    pub hit: RayHit,
}

/// Result of casting one ray segment
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Where the segment ends: the blocking point, or the ray's full length
    pub endpoint: Vec3,
    /// Transparent entities before the block (scene report order), then the blocker
    pub hits: Vec<EntityId>,
    pub blocking: Option<BlockingHit>,
}

/// Cast one ray segment from `origin` along `direction`, ignoring `exclude`
pub fn cast<P: Presentation + ?Sized>(
    board: &Board,
    scene: &P,
    origin: Vec3,
    direction: Vec3,
    exclude: Option<VisualHandle>,
) -> Segment {
    let dir = direction.normalize_or_zero();
    let max_length = board.settings().max_ray_length;
    let hits = scene.query_ray(origin, dir, max_length, exclude);

    let opacity_of = |hit: &RayHit| {
        hit.entity
            .and_then(|id| board.entity(id))
            .map(|e| (e.id, e.opacity))
    };

    let blocking = hits
        .iter()
        .filter_map(|hit| match opacity_of(hit) {
            Some((entity, opacity)) if opacity.is_blocking() => Some(BlockingHit {
                entity,
                opacity,
                hit: *hit,
            }),
            _ => None,
        })
        .min_by(|a, b| a.hit.distance.total_cmp(&b.hit.distance));

    let mut entities: Vec<EntityId> = hits
        .iter()
        .filter(|hit| blocking.is_none_or(|b| hit.distance < b.hit.distance))
        .filter_map(|hit| match opacity_of(hit) {
            Some((entity, Opacity::Transparent)) => Some(entity),
            _ => None,
        })
        .collect();

    let endpoint = match &blocking {
        Some(b) => {
            entities.push(b.entity);
            b.hit.point
        }
        None => origin + dir * max_length,
    };

    Segment {
        endpoint,
        hits: entities,
        blocking,
    }
}

/// Why an emission stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamEnd {
    /// Nothing blocking within range
    LeftBoard,
    /// Stopped by a non-reflective entity
    Blocked,
    /// Hit a mirror on an edge rather than a broad face
    NonReflectiveFace,
    /// The bounce cap was reached; the last reflection is not cast
    BounceLimit,
    /// The reflected direction collapsed to zero
    Degenerate,
}

/// One emitter's beam for this tick
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub emitter: EntityId,
    pub color: Color,
    /// Every entity the beam touched, in order; may contain repeats
    pub hits: Vec<EntityId>,
    /// Polyline from the emitter through each bounce
    pub path: Vec<Vec3>,
    pub bounces: u32,
    pub casts: u32,
    pub end: BeamEnd,
}

/// Trace the beam of `emitter_id`. Returns `None` if the id is not an emitter.
pub fn emit<P: Presentation + ?Sized>(
    board: &Board,
    scene: &P,
    emitter_id: EntityId,
) -> Option<Emission> {
    let entity = board.entity(emitter_id)?;
    let emitter = entity.as_emitter()?;
    let max_bounces = board.settings().max_bounces;

    let mut origin = board.cell_center(entity.pos);
    let mut direction = emitter.direction.vector();
    // The emitter's own body must not stop its first segment
    let mut exclude = board.visual(emitter_id);

    let mut path = vec![origin];
    let mut hits = Vec::new();
    let mut bounces = 0u32;
    let mut casts = 0u32;

    let end = loop {
        let segment = cast(board, scene, origin, direction, exclude);
        casts += 1;
        path.push(segment.endpoint);
        hits.extend_from_slice(&segment.hits);

        let Some(block) = segment.blocking else {
            break BeamEnd::LeftBoard;
        };
        if block.opacity != Opacity::Reflect {
            break BeamEnd::Blocked;
        }
        if block.hit.face > LAST_REFLECTIVE_FACE {
            break BeamEnd::NonReflectiveFace;
        }
        // Only reachable with a cap of zero
        if bounces >= max_bounces {
            break BeamEnd::BounceLimit;
        }

        let incoming = segment.endpoint - origin;
        let reflected = reflect(incoming, block.hit.normal);
        if reflected.length_squared() <= f32::EPSILON {
            break BeamEnd::Degenerate;
        }
        bounces += 1;
        log::trace!(
            "Beam {:?} bounce {} off {:?} face {} at {:?}",
            emitter_id,
            bounces,
            block.entity,
            block.hit.face,
            segment.endpoint
        );
        if bounces >= max_bounces {
            break BeamEnd::BounceLimit;
        }

        origin = segment.endpoint;
        direction = reflected;
        exclude = Some(block.hit.visual);
    };

    Some(Emission {
        emitter: emitter_id,
        color: emitter.active_color(),
        hits,
        path,
        bounces,
        casts,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;
    use crate::renderer::HeadlessScene;
    use crate::settings::Settings;
    use crate::sim::CellCoord;
    use proptest::prelude::*;

    fn setup(rows: usize, cols: usize) -> (Board, HeadlessScene) {
        (Board::new(rows, cols, Settings::default()), HeadlessScene::new())
    }

    #[test]
    fn test_straight_beam_passes_gems_and_leaves() {
        let (mut board, mut scene) = setup(1, 4);
        let a = board.place_gem(CellCoord::new(0, 1), "r", &mut scene).expect("placed");
        let b = board.place_gem(CellCoord::new(0, 3), "g", &mut scene).expect("placed");
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.end, BeamEnd::LeftBoard);
        assert_eq!(emission.hits, vec![a, b]);
        assert_eq!(emission.path.len(), 2);
        assert_eq!(emission.casts, 1);
        assert_eq!(emission.color, Color::GREEN);
        // Full-length final segment
        let len = (emission.path[1] - emission.path[0]).length();
        assert!((len - board.settings().max_ray_length).abs() < 1e-3);
    }

    #[test]
    fn test_block_stops_and_hides_later_gems() {
        let (mut board, mut scene) = setup(1, 5);
        let near = board.place_gem(CellCoord::new(0, 0), "r", &mut scene).expect("placed");
        let wall = board
            .place_emitter(CellCoord::new(0, 2), Direction::Left, &mut scene)
            .expect("placed");
        board.place_gem(CellCoord::new(0, 4), "r", &mut scene).expect("placed");
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.end, BeamEnd::Blocked);
        assert_eq!(emission.hits, vec![near, wall]);
        // Stops at the blocker's near face, short of its center
        let stop = emission.path[1];
        assert!(stop.x < board.cell_center(CellCoord::new(0, 2)).x);
    }

    #[test]
    fn test_single_mirror_turns_beam_down() {
        let (mut board, mut scene) = setup(3, 3);
        let mirror = board.place_mirror(CellCoord::new(0, 1), &mut scene).expect("placed");
        let gem = board.place_gem(CellCoord::new(2, 1), "b", &mut scene).expect("placed");
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.bounces, 1);
        assert_eq!(emission.hits, vec![mirror, gem]);
        assert_eq!(emission.end, BeamEnd::LeftBoard);
        // Second segment heads toward increasing rows (-Z)
        let leg = emission.path[2] - emission.path[1];
        assert!(leg.z < 0.0);
        assert!(leg.x.abs() < 1e-3);
    }

    #[test]
    fn test_mirror_edge_does_not_reflect() {
        let (mut board, mut scene) = setup(1, 3);
        let mirror = board.place_mirror(CellCoord::new(0, 1), &mut scene).expect("placed");
        // Edge-on to a horizontal beam
        if let Some(m) = board.entity_mut(mirror).and_then(|e| e.as_mirror_mut()) {
            m.angle = 0.0;
        }
        let visual = board.visual(mirror).expect("visual");
        scene.set_orientation(visual, 0.0);
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.end, BeamEnd::NonReflectiveFace);
        assert_eq!(emission.bounces, 0);
        assert_eq!(emission.hits, vec![mirror]);
    }

    #[test]
    fn test_bounce_cap() {
        // Four mirrors in a square keep the beam circling
        let settings = Settings {
            max_bounces: 3,
            ..Default::default()
        };
        let mut board = Board::new(3, 3, settings);
        let mut scene = HeadlessScene::new();
        for pos in [(0, 0), (0, 2), (2, 2), (2, 0)] {
            board.place_mirror(CellCoord::new(pos.0, pos.1), &mut scene).expect("placed");
        }
        // Right -> Down -> Right -> Up -> Left around the ring; only (2,2) needs 135°
        let corner = board.mirrors()[2];
        let angle = 3.0 * std::f32::consts::FRAC_PI_4;
        if let Some(m) = board.entity_mut(corner).and_then(|e| e.as_mirror_mut()) {
            m.angle = angle;
        }
        scene.set_orientation(board.visual(corner).expect("visual"), angle);
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.end, BeamEnd::BounceLimit);
        assert_eq!(emission.bounces, 3);
        assert_eq!(emission.casts, 3);
        assert_eq!(emission.path.len(), 4);
    }

    #[test]
    fn test_capped_bounce_is_not_cast() {
        let settings = Settings {
            max_bounces: 1,
            ..Default::default()
        };
        let mut board = Board::new(3, 3, settings);
        let mut scene = HeadlessScene::new();
        let mirror = board.place_mirror(CellCoord::new(0, 1), &mut scene).expect("placed");
        board.place_gem(CellCoord::new(2, 1), "b", &mut scene).expect("placed");
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.end, BeamEnd::BounceLimit);
        assert_eq!(emission.bounces, 1);
        assert_eq!(emission.casts, 1);
        // The gem below the mirror is past the cap
        assert_eq!(emission.hits, vec![mirror]);
        assert_eq!(emission.path.len(), 2);
    }

    #[test]
    fn test_zero_cap_stops_at_first_mirror() {
        let settings = Settings {
            max_bounces: 0,
            ..Default::default()
        };
        let mut board = Board::new(1, 2, settings);
        let mut scene = HeadlessScene::new();
        let mirror = board.place_mirror(CellCoord::new(0, 1), &mut scene).expect("placed");
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.end, BeamEnd::BounceLimit);
        assert_eq!(emission.bounces, 0);
        assert_eq!(emission.casts, 1);
        assert_eq!(emission.hits, vec![mirror]);
    }

    #[test]
    fn test_head_on_mirror_repeats_gem_in_hits() {
        let mut board = Board::new(1, 2, Settings::default());
        let mut scene = HeadlessScene::new();
        let gem = board.place_gem(CellCoord::new(0, 0), "g", &mut scene).expect("placed");
        let mirror = board.place_mirror(CellCoord::new(0, 1), &mut scene).expect("placed");
        // Broad face square to the beam sends it straight back
        let angle = std::f32::consts::FRAC_PI_2;
        if let Some(m) = board.entity_mut(mirror).and_then(|e| e.as_mirror_mut()) {
            m.angle = angle;
        }
        scene.set_orientation(board.visual(mirror).expect("visual"), angle);
        let src = board
            .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
            .expect("placed");

        let emission = emit(&board, &scene, src).expect("emitter");
        assert_eq!(emission.hits, vec![gem, mirror, gem, src]);
        assert_eq!(emission.end, BeamEnd::Blocked);
        assert_eq!(emission.bounces, 1);

        // The repeated gem breaks once
        let report = crate::sim::tick(&mut board, &mut scene, 16.0);
        assert_eq!(report.removed, vec![CellCoord::new(0, 0)]);
        assert_eq!(scene.effects().len(), 1);
        assert!(board.is_empty(CellCoord::new(0, 0)));
    }

    #[test]
    fn test_emit_rejects_non_emitters() {
        let (mut board, mut scene) = setup(1, 1);
        let gem = board.place_gem(CellCoord::new(0, 0), "r", &mut scene).expect("placed");
        assert!(emit(&board, &scene, gem).is_none());
        assert!(emit(&board, &scene, EntityId(99)).is_none());
    }

    proptest! {
        #[test]
        fn prop_reflection_preserves_length(
            dx in -10.0f32..10.0,
            dz in -10.0f32..10.0,
            theta in 0.0f32..std::f32::consts::TAU,
        ) {
            let d = Vec3::new(dx, 0.0, dz);
            let n = Vec3::new(theta.sin(), 0.0, theta.cos());
            let r = reflect(d, n);
            prop_assert!((r.length() - d.length()).abs() < 1e-3);
            prop_assert!((r - (d - 2.0 * d.dot(n) * n)).length() < 1e-5);
            // Tangential part unchanged, normal part flipped
            prop_assert!((r.dot(n) + d.dot(n)).abs() < 1e-3);
        }

        #[test]
        fn prop_emission_bounded(
            angles in proptest::collection::vec(0.0f32..std::f32::consts::TAU, 4),
        ) {
            let mut board = Board::new(3, 3, Settings::default());
            let mut scene = HeadlessScene::new();
            for (i, pos) in [(0, 0), (0, 2), (2, 2), (2, 0)].into_iter().enumerate() {
                let id = board
                    .place_mirror(CellCoord::new(pos.0, pos.1), &mut scene)
                    .expect("placed");
                if let Some(m) = board.entity_mut(id).and_then(|e| e.as_mirror_mut()) {
                    m.angle = angles[i];
                }
                scene.set_orientation(board.visual(id).expect("visual"), angles[i]);
            }
            let src = board
                .place_emitter(CellCoord::new(0, -1), Direction::Right, &mut scene)
                .expect("placed");
            let emission = emit(&board, &scene, src).expect("emitter");
            let cap = board.settings().max_bounces;
            prop_assert!(emission.bounces <= cap);
            prop_assert!(emission.casts <= cap.max(1));
            prop_assert_eq!(emission.path.len() as u32, emission.casts + 1);
        }
    }
}
