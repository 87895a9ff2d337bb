//! Point set container with optional per-point colors

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ordered set of 3D positions with an optional parallel color array.
///
/// Colors are expected to be sRGB encoded in [0, 1]. Their count should match
/// the position count; consumers that find a mismatch fall back to a
/// position-derived colormap instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub points: Vec<Point3f>,
    pub colors: Option<Vec<Rgb>>,
}

impl PointSet {
    /// Create a new empty point set
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            colors: None,
        }
    }

    /// Create a point set from positions only
    pub fn from_points(points: Vec<Point3f>) -> Self {
        Self { points, colors: None }
    }

    /// Create a point set from positions and colors
    pub fn with_colors(points: Vec<Point3f>, colors: Vec<Rgb>) -> Self {
        Self {
            points,
            colors: Some(colors),
        }
    }

    /// Get the number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set holds no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get an iterator over the positions
    pub fn iter(&self) -> std::slice::Iter<'_, Point3f> {
        self.points.iter()
    }

    /// True when colors are present and there is exactly one per point
    pub fn has_matching_colors(&self) -> bool {
        self.colors
            .as_ref()
            .is_some_and(|colors| colors.len() == self.points.len())
    }

}

impl Index<usize> for PointSet {
    type Output = Point3f;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point3f;
    type IntoIter = std::slice::Iter<'a, Point3f>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_colors() {
        let points = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)];

        assert!(PointSet::with_colors(points.clone(), vec![[0.5, 0.5, 0.5]; 2]).has_matching_colors());
        assert!(!PointSet::with_colors(points.clone(), vec![[0.5, 0.5, 0.5]]).has_matching_colors());
        assert!(!PointSet::from_points(points).has_matching_colors());
    }
}
