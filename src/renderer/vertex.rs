//! Vertex types for beam line rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::sim::Color;

/// Line-list vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BeamVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl BeamVertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Expand a beam polyline into line-list vertices (two per segment)
pub fn beam_line(path: &[Vec3], color: Color) -> Vec<BeamVertex> {
    if path.len() < 2 {
        return Vec::new();
    }
    let [r, g, b] = color.to_rgb();
    let rgba = [r, g, b, 1.0];

    let mut vertices = Vec::with_capacity((path.len() - 1) * 2);
    for pair in path.windows(2) {
        vertices.push(BeamVertex::new(pair[0].to_array(), rgba));
        vertices.push(BeamVertex::new(pair[1].to_array(), rgba));
    }
    vertices
}
