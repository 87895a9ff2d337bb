//! Coordinate convention transforms
//!
//! Canonical space is the normalized cube produced by bounding-box
//! normalization. The renderer expects a Z-up convention, reached through the
//! fixed permutation `(x, y, z) -> (-z, x, y)`. Positions additionally receive
//! a small lift on the vertical axis so points resting on the canonical floor
//! do not coincide exactly with a ground plane placed there.

use crate::point::*;

/// Vertical lift applied to remapped positions
pub const RENDER_VERTICAL_OFFSET: f32 = 0.0125;

/// Map a canonical-space position into renderer space (with the lift)
pub fn to_render_space(point: &Point3f) -> Point3f {
    Point3f::new(-point.z, point.x, point.y + RENDER_VERTICAL_OFFSET)
}

/// Map a direction into renderer space (permutation only)
pub fn to_render_vector(vector: &Vector3f) -> Vector3f {
    Vector3f::new(-vector.z, vector.x, vector.y)
}

/// Inverse of [`to_render_space`]
pub fn from_render_space(point: &Point3f) -> Point3f {
    Point3f::new(point.y, point.z - RENDER_VERTICAL_OFFSET, -point.x)
}

/// Remap every position of a canonical point list into renderer space
pub fn remap_points(points: &[Point3f]) -> Vec<Point3f> {
    points.iter().map(to_render_space).collect()
}
