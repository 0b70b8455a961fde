//! Presentation-layer seam
//!
//! The simulation never touches meshes directly. It asks a [`Presentation`]
//! implementation to create visuals, answer ray queries against the scene,
//! play destruction effects and draw beam lines. [`scene::HeadlessScene`] is
//! the in-process implementation used by the native runner and the tests.

pub mod scene;
pub mod shapes;
pub mod vertex;

pub use scene::HeadlessScene;
pub use vertex::BeamVertex;

use glam::Vec3;

use crate::sim::{Color, Entity, EntityId};

/// Opaque handle to one visual instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u32);

/// Which template a visual is instanced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Gem(Color),
    Mirror,
    Emitter,
}

impl VisualKind {
    pub fn for_entity(entity: &Entity) -> Self {
        match &entity.kind {
            crate::sim::EntityKind::Gem => VisualKind::Gem(entity.color),
            crate::sim::EntityKind::Mirror(_) => VisualKind::Mirror,
            crate::sim::EntityKind::Emitter(_) => VisualKind::Emitter,
        }
    }
}

/// One surface crossed by a scene ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub visual: VisualHandle,
    /// Owning entity, if the visual belongs to one
    pub entity: Option<EntityId>,
    /// Distance from the ray origin
    pub distance: f32,
    pub point: Vec3,
    /// Facet index of the primitive that was entered
    pub face: u32,
    /// World-space unit normal of that facet
    pub normal: Vec3,
}

/// Capabilities the simulation consumes from the presentation layer
pub trait Presentation {
    /// Instance a visual for `entity` (creating the kind's template on first use)
    fn create_visual(
        &mut self,
        entity: EntityId,
        kind: VisualKind,
        position: Vec3,
        yaw: f32,
    ) -> VisualHandle;

    /// Update a visual's yaw (rotating mirrors)
    fn set_orientation(&mut self, visual: VisualHandle, yaw: f32);

    /// Every pickable surface crossed by the ray within `max_length`, in the
    /// scene's own report order. `exclude` is skipped entirely.
    fn query_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_length: f32,
        exclude: Option<VisualHandle>,
    ) -> Vec<RayHit>;

    /// Play the destruction effect for a removed entity and hide its visual
    fn play_destruction_effect(&mut self, visual: VisualHandle, entity: &Entity);

    /// Replace the beam line drawn for `emitter` with `path`
    fn draw_beam_path(&mut self, emitter: EntityId, path: &[Vec3], color: Color);
}
