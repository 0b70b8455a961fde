//! Ray intersection against the primitive shapes used for board visuals
//!
//! Boxes report Babylon-style facet ids: two triangles per face, faces in the
//! order +Z, -Z, +X, -X, +Y, -Y. A mirror is a box that is thin along local Z,
//! so its two broad faces are facets 0..=3.

use glam::{Quat, Vec3};

/// Primitive collision shape of a template
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Box with the given half extents in its local frame
    Cuboid { half_extents: Vec3 },
}

/// Where a ray enters a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub distance: f32,
    pub point: Vec3,
    pub face: u32,
    pub normal: Vec3,
}

/// Intersect a ray (unit `dir`) with a shape placed at `center` with rotation
/// `yaw` about +Y. Hits behind the origin or beyond `max_length` are ignored.
pub fn ray_shape(
    origin: Vec3,
    dir: Vec3,
    max_length: f32,
    shape: Shape,
    center: Vec3,
    yaw: f32,
) -> Option<ShapeHit> {
    match shape {
        Shape::Sphere { radius } => ray_sphere(origin, dir, max_length, center, radius),
        Shape::Cuboid { half_extents } => {
            ray_cuboid(origin, dir, max_length, center, half_extents, yaw)
        }
    }
}

fn ray_sphere(
    origin: Vec3,
    dir: Vec3,
    max_length: f32,
    center: Vec3,
    radius: f32,
) -> Option<ShapeHit> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    // Entry point, or exit point when the origin is inside
    let t = if -b - sqrt_disc >= 0.0 {
        -b - sqrt_disc
    } else {
        -b + sqrt_disc
    };
    if t < 0.0 || t > max_length {
        return None;
    }
    let point = origin + dir * t;
    Some(ShapeHit {
        distance: t,
        point,
        face: 0,
        normal: (point - center).normalize_or_zero(),
    })
}

fn ray_cuboid(
    origin: Vec3,
    dir: Vec3,
    max_length: f32,
    center: Vec3,
    half: Vec3,
    yaw: f32,
) -> Option<ShapeHit> {
    let rot = Quat::from_rotation_y(yaw);
    let inv = rot.inverse();
    let lo = inv * (origin - center);
    let ld = inv * dir;

    // Slab test, tracking which axis produced the entry/exit
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut near_axis = 0usize;
    let mut far_axis = 0usize;
    for axis in 0..3 {
        let o = lo[axis];
        let d = ld[axis];
        let h = half[axis];
        if d.abs() < 1e-8 {
            if o < -h || o > h {
                return None;
            }
            continue;
        }
        let mut t0 = (-h - o) / d;
        let mut t1 = (h - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_near {
            t_near = t0;
            near_axis = axis;
        }
        if t1 < t_far {
            t_far = t1;
            far_axis = axis;
        }
        if t_near > t_far {
            return None;
        }
    }

    let (t, axis) = if t_near >= 0.0 {
        (t_near, near_axis)
    } else {
        (t_far, far_axis)
    };
    if t < 0.0 || t > max_length {
        return None;
    }

    let local_point = lo + ld * t;
    let (face_slot, local_normal, u, v) = match axis {
        2 => {
            let n = if local_point.z >= 0.0 { Vec3::Z } else { Vec3::NEG_Z };
            let slot = if local_point.z >= 0.0 { 0 } else { 1 };
            (slot, n, local_point.x / half.x, local_point.y / half.y)
        }
        0 => {
            let n = if local_point.x >= 0.0 { Vec3::X } else { Vec3::NEG_X };
            let slot = if local_point.x >= 0.0 { 2 } else { 3 };
            (slot, n, local_point.z / half.z, local_point.y / half.y)
        }
        _ => {
            let n = if local_point.y >= 0.0 { Vec3::Y } else { Vec3::NEG_Y };
            let slot = if local_point.y >= 0.0 { 4 } else { 5 };
            (slot, n, local_point.x / half.x, local_point.z / half.z)
        }
    };
    // Each quad face is split along its diagonal into two facets
    let triangle = if u >= v { 0 } else { 1 };

    Some(ShapeHit {
        distance: t,
        point: origin + dir * t,
        face: face_slot * 2 + triangle,
        normal: rot * local_normal,
    })
}
