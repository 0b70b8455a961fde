//! Headless scene: the in-process presentation layer
//!
//! Keeps one template per [`VisualKind`] (built lazily, once), instances that
//! reference those templates, and the handle → entity back-references used to
//! answer ray queries. Destruction effects and beam lines are recorded so a
//! frontend (or a test) can consume them.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;

use super::shapes::{Shape, ray_shape};
use super::vertex::{BeamVertex, beam_line};
use super::{Presentation, RayHit, VisualHandle, VisualKind};
use crate::consts::*;
use crate::sim::{Color, Entity, EntityId};

/// Prototype shared by every instance of one kind
#[derive(Debug, Clone)]
pub struct Template {
    pub kind: VisualKind,
    pub shape: Shape,
}

impl Template {
    fn build(kind: VisualKind) -> Self {
        let shape = match kind {
            VisualKind::Gem(_) => Shape::Sphere { radius: GEM_RADIUS },
            VisualKind::Mirror => Shape::Cuboid {
                half_extents: Vec3::new(MIRROR_WIDTH, MIRROR_HEIGHT, MIRROR_DEPTH) * 0.5,
            },
            VisualKind::Emitter => Shape::Cuboid {
                half_extents: Vec3::new(EMITTER_LENGTH, EMITTER_DIAMETER, EMITTER_DIAMETER) * 0.5,
            },
        };
        Self { kind, shape }
    }
}

/// A placed copy of a template
#[derive(Debug, Clone)]
pub struct Instance {
    pub kind: VisualKind,
    pub position: Vec3,
    pub yaw: f32,
    pub visible: bool,
    pub pickable: bool,
}

/// A destruction effect that was triggered
#[derive(Debug, Clone, PartialEq)]
pub struct DestructionEffect {
    pub entity: EntityId,
    pub color: Color,
    pub position: Vec3,
}

#[derive(Debug, Default)]
pub struct HeadlessScene {
    templates: HashMap<VisualKind, Template>,
    templates_built: u32,
    instances: Vec<Instance>,
    owners: HashMap<VisualHandle, EntityId>,
    effects: Vec<DestructionEffect>,
    beam_lines: BTreeMap<EntityId, Vec<BeamVertex>>,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of templates built so far (one per kind ever instanced)
    pub fn templates_built(&self) -> u32 {
        self.templates_built
    }

    pub fn instance(&self, visual: VisualHandle) -> Option<&Instance> {
        self.instances.get(visual.0 as usize)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Entity that owns a visual
    pub fn entity_for(&self, visual: VisualHandle) -> Option<EntityId> {
        self.owners.get(&visual).copied()
    }

    pub fn effects(&self) -> &[DestructionEffect] {
        &self.effects
    }

    /// Drain recorded destruction effects
    pub fn take_effects(&mut self) -> Vec<DestructionEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Current beam line for an emitter
    pub fn beam_line(&self, emitter: EntityId) -> Option<&[BeamVertex]> {
        self.beam_lines.get(&emitter).map(Vec::as_slice)
    }

    fn template(&mut self, kind: VisualKind) -> &Template {
        let built = &mut self.templates_built;
        self.templates.entry(kind).or_insert_with(|| {
            *built += 1;
            log::debug!("Built template for {:?}", kind);
            Template::build(kind)
        })
    }

    fn template_shape(&self, kind: VisualKind) -> Option<Shape> {
        self.templates.get(&kind).map(|t| t.shape)
    }
}

impl Presentation for HeadlessScene {
    fn create_visual(
        &mut self,
        entity: EntityId,
        kind: VisualKind,
        position: Vec3,
        yaw: f32,
    ) -> VisualHandle {
        self.template(kind);
        let handle = VisualHandle(self.instances.len() as u32);
        self.instances.push(Instance {
            kind,
            position,
            yaw,
            visible: true,
            pickable: true,
        });
        self.owners.insert(handle, entity);
        handle
    }

    fn set_orientation(&mut self, visual: VisualHandle, yaw: f32) {
        if let Some(instance) = self.instances.get_mut(visual.0 as usize) {
            instance.yaw = yaw;
        }
    }

    fn query_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_length: f32,
        exclude: Option<VisualHandle>,
    ) -> Vec<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (index, instance) in self.instances.iter().enumerate() {
            let handle = VisualHandle(index as u32);
            if !instance.pickable || exclude == Some(handle) {
                continue;
            }
            let Some(shape) = self.template_shape(instance.kind) else {
                continue;
            };
            if let Some(hit) = ray_shape(
                origin,
                dir,
                max_length,
                shape,
                instance.position,
                instance.yaw,
            ) {
                hits.push(RayHit {
                    visual: handle,
                    entity: self.owners.get(&handle).copied(),
                    distance: hit.distance,
                    point: hit.point,
                    face: hit.face,
                    normal: hit.normal,
                });
            }
        }
        hits
    }

    fn play_destruction_effect(&mut self, visual: VisualHandle, entity: &Entity) {
        let Some(instance) = self.instances.get_mut(visual.0 as usize) else {
            log::warn!("Destruction effect for unknown visual {:?}", visual);
            return;
        };
        instance.visible = false;
        instance.pickable = false;
        self.effects.push(DestructionEffect {
            entity: entity.id,
            color: entity.color,
            position: instance.position,
        });
    }

    fn draw_beam_path(&mut self, emitter: EntityId, path: &[Vec3], color: Color) {
        self.beam_lines.insert(emitter, beam_line(path, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_templates_built_once_per_kind() {
        let mut scene = HeadlessScene::new();
        scene.create_visual(EntityId(0), VisualKind::Mirror, Vec3::ZERO, 0.0);
        scene.create_visual(EntityId(1), VisualKind::Mirror, Vec3::X, 0.0);
        scene.create_visual(EntityId(2), VisualKind::Gem(Color::RED), Vec3::Z, 0.0);
        scene.create_visual(EntityId(3), VisualKind::Gem(Color::BLUE), Vec3::Z, 0.0);
        scene.create_visual(EntityId(4), VisualKind::Gem(Color::RED), Vec3::Z, 0.0);
        assert_eq!(scene.templates_built(), 3);
        assert_eq!(scene.instance_count(), 5);
    }

    #[test]
    fn test_query_reports_in_creation_order_with_owner() {
        let mut scene = HeadlessScene::new();
        let far = scene.create_visual(
            EntityId(7),
            VisualKind::Gem(Color::RED),
            Vec3::new(8.0, 0.0, 0.0),
            0.0,
        );
        let near = scene.create_visual(
            EntityId(9),
            VisualKind::Gem(Color::RED),
            Vec3::new(4.0, 0.0, 0.0),
            0.0,
        );
        let hits = scene.query_ray(Vec3::ZERO, Vec3::X, 100.0, None);
        assert_eq!(hits.len(), 2);
        // Not re-sorted by distance
        assert_eq!(hits[0].visual, far);
        assert_eq!(hits[0].entity, Some(EntityId(7)));
        assert_eq!(hits[1].visual, near);
        assert!(hits[1].distance < hits[0].distance);

        // Excluded surfaces are skipped
        let hits = scene.query_ray(Vec3::ZERO, Vec3::X, 100.0, Some(far));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].visual, near);
    }

    #[test]
    fn test_destruction_hides_and_records() {
        let mut scene = HeadlessScene::new();
        let mut rng = Pcg32::seed_from_u64(3);
        let gem = Entity::gem(EntityId(0), "g", &mut rng);
        let handle = scene.create_visual(
            gem.id,
            VisualKind::Gem(gem.color),
            Vec3::new(3.0, 0.0, 0.0),
            0.0,
        );
        scene.play_destruction_effect(handle, &gem);

        let instance = scene.instance(handle).expect("instance exists");
        assert!(!instance.visible);
        assert!(!instance.pickable);
        assert_eq!(scene.effects().len(), 1);
        assert_eq!(scene.effects()[0].color, Color::GREEN);
        // Hidden visuals no longer intercept rays
        assert!(scene.query_ray(Vec3::ZERO, Vec3::X, 100.0, None).is_empty());
        assert_eq!(scene.take_effects().len(), 1);
        assert!(scene.effects().is_empty());
    }

    #[test]
    fn test_beam_line_replaced_each_draw() {
        let mut scene = HeadlessScene::new();
        let emitter = EntityId(1);
        scene.draw_beam_path(emitter, &[Vec3::ZERO, Vec3::X, Vec3::Z], Color::RED);
        assert_eq!(scene.beam_line(emitter).map(<[_]>::len), Some(4));
        scene.draw_beam_path(emitter, &[Vec3::ZERO, Vec3::X], Color::BLUE);
        let line = scene.beam_line(emitter).expect("line drawn");
        assert_eq!(line.len(), 2);
        assert_eq!(line[0].color, [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_set_orientation_changes_pick() {
        let mut scene = HeadlessScene::new();
        let mirror = scene.create_visual(EntityId(0), VisualKind::Mirror, Vec3::ZERO, 0.0);
        // Edge-on along X at yaw 0: a +X ray enters through an edge facet
        let hits = scene.query_ray(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 100.0, None);
        assert!(hits[0].face >= 4);
        // Quarter turn puts a broad face across the ray
        scene.set_orientation(mirror, std::f32::consts::FRAC_PI_2);
        let hits = scene.query_ray(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 100.0, None);
        assert!(hits[0].face <= 3);
    }
}
