//! Bounding box computation

use crate::{point::*, point_cloud::PointSet};

/// Axis-aligned bounding box of a point collection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3f,
    pub max: Point3f,
}

impl BoundingBox {
    /// Midpoint of min and max
    pub fn center(&self) -> Point3f {
        Point3f::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Per-axis extent
    pub fn extent(&self) -> Vector3f {
        self.max - self.min
    }

    /// Largest extent across the three axes
    pub fn max_extent(&self) -> f32 {
        self.extent().max()
    }
}

/// Trait for collections that have a bounding box
pub trait Bounded {
    /// Get the bounding box, or `None` when there are no points
    fn bounding_box(&self) -> Option<BoundingBox>;
}

impl Bounded for [Point3f] {
    fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.first()?;
        let mut min = first;
        let mut max = first;

        for p in self {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some(BoundingBox { min, max })
    }
}

impl Bounded for Vec<Point3f> {
    fn bounding_box(&self) -> Option<BoundingBox> {
        self.as_slice().bounding_box()
    }
}

impl Bounded for PointSet {
    fn bounding_box(&self) -> Option<BoundingBox> {
        self.points.bounding_box()
    }
}
