//! Camera poses and the viewer-to-renderer camera transform

use crate::error::{Error, Result};
use crate::point::*;
use crate::transform::{to_render_vector, RENDER_VERTICAL_OFFSET};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distances below this are treated as coincident points
pub const POSE_EPSILON: f32 = 1e-6;

/// A lookat camera description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub origin: Point3f,
    pub target: Point3f,
    pub up: Vector3f,
}

impl CameraPose {
    /// Create a validated pose.
    ///
    /// Fails when origin and target coincide or when `up` has zero length.
    /// `up` is neither normalized nor orthogonalized against the view
    /// direction.
    pub fn new(origin: Point3f, target: Point3f, up: Vector3f) -> Result<Self> {
        let pose = Self { origin, target, up };
        pose.validate()?;
        Ok(pose)
    }

    /// Check the pose invariants
    pub fn validate(&self) -> Result<()> {
        if (self.target - self.origin).norm() < POSE_EPSILON {
            tracing::debug!("rejecting camera {}: origin equals target", self);
            return Err(Error::InvalidInput(format!(
                "camera origin {:?} and target {:?} coincide",
                self.origin, self.target
            )));
        }
        if self.up.norm() < POSE_EPSILON {
            tracing::debug!("rejecting camera {}: zero up vector", self);
            return Err(Error::InvalidInput("camera up vector has zero length".to_string()));
        }
        Ok(())
    }

    /// Unit vector from origin towards target
    pub fn view_direction(&self) -> Vector3f {
        (self.target - self.origin).normalize()
    }

    /// Distance between origin and target
    pub fn distance(&self) -> f32 {
        (self.target - self.origin).norm()
    }

    /// Convert a pose given in the interactive viewer's convention into the
    /// renderer convention.
    ///
    /// Origin and target go through the axis permutation; the target also
    /// receives the same vertical lift as point geometry. `up` is negated
    /// before the permutation and is not renormalized.
    pub fn to_render_convention(&self) -> Self {
        let origin = to_render_vector(&self.origin.coords);
        let mut target = to_render_vector(&self.target.coords);
        target.z += RENDER_VERTICAL_OFFSET;
        let up = to_render_vector(&(-self.up));

        let converted = Self {
            origin: Point3f::from(origin),
            target: Point3f::from(target),
            up,
        };
        tracing::debug!("viewer camera {} -> renderer camera {}", self, converted);
        converted
    }

    /// Move the origin along the current view line so that its distance to
    /// the target is multiplied by `factor`
    pub fn with_distance_scale(&self, factor: f32) -> Result<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "distance factor must be positive, got {}",
                factor
            )));
        }
        let offset = self.origin - self.target;
        let current = offset.norm();
        if current < POSE_EPSILON {
            return Err(Error::InvalidInput(
                "camera origin and target coincide, cannot rescale distance".to_string(),
            ));
        }
        Ok(Self {
            origin: self.target + offset / current * (current * factor),
            ..*self
        })
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            origin: Point3f::new(0.0, -4.0, 2.0),
            target: Point3f::origin(),
            up: Vector3f::new(0.0, 0.0, 1.0),
        }
    }
}

/// Parse exactly nine numbers separated by commas and/or whitespace
pub fn parse_pose_numbers(s: &str) -> Result<[f32; 9]> {
    let tokens: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.len() != 9 {
        return Err(Error::InvalidInput(format!(
            "expected 9 numbers (origin target up), found {} in {:?}",
            tokens.len(),
            s
        )));
    }

    let mut values = [0.0f32; 9];
    for (value, token) in values.iter_mut().zip(&tokens) {
        *value = token
            .parse::<f32>()
            .map_err(|_| Error::InvalidInput(format!("invalid number {:?} in camera pose", token)))?;
    }
    Ok(values)
}

impl FromStr for CameraPose {
    type Err = Error;

    /// Accepts `"ox,oy,oz tx,ty,tz ux,uy,uz"` or any mix of commas and spaces
    fn from_str(s: &str) -> Result<Self> {
        let v = parse_pose_numbers(s)?;
        Self::new(
            Point3f::new(v[0], v[1], v[2]),
            Point3f::new(v[3], v[4], v[5]),
            Vector3f::new(v[6], v[7], v[8]),
        )
    }
}

impl fmt::Display for CameraPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            format_triple(self.origin.x, self.origin.y, self.origin.z),
            format_triple(self.target.x, self.target.y, self.target.z),
            format_triple(self.up.x, self.up.y, self.up.z)
        )
    }
}

/// Convert a vertical field of view into the horizontal one for a given
/// aspect ratio (width / height). Angles are in degrees.
pub fn vertical_to_horizontal_fov(fov_vertical_deg: f32, aspect_ratio: f32) -> f32 {
    let half = (fov_vertical_deg.to_radians() / 2.0).tan();
    (2.0 * (aspect_ratio * half).atan()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_pose_mixed_separators() {
        let pose: CameraPose = "0,-4,2 0,0,0 0,0,1".parse().unwrap();
        assert_eq!(pose, CameraPose::default());

        let pose: CameraPose = "1 2 3, 0 0 0, 0 1 0".parse().unwrap();
        assert_eq!(pose.origin, Point3f::new(1.0, 2.0, 3.0));
        assert_eq!(pose.up, Vector3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_parse_pose_rejects_wrong_count() {
        assert!(matches!("1,2,3 0,0,0".parse::<CameraPose>(), Err(Error::InvalidInput(_))));
        assert!(matches!("1 2 3 4 5 6 7 8 9 10".parse::<CameraPose>(), Err(Error::InvalidInput(_))));
        assert!(matches!("1 2 3 4 5 6 7 8 x".parse::<CameraPose>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_degenerate_poses_rejected() {
        let p = Point3f::new(1.0, 1.0, 1.0);
        assert!(CameraPose::new(p, p, Vector3f::z()).is_err());
        assert!(CameraPose::new(p, Point3f::origin(), Vector3f::zeros()).is_err());
    }

    #[test]
    fn test_render_convention_negates_up() {
        let pose = CameraPose::new(
            Point3f::new(1.0, 2.0, 3.0),
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        let converted = pose.to_render_convention();

        assert_relative_eq!(converted.origin, Point3f::new(-3.0, 1.0, 2.0));
        assert_relative_eq!(converted.target, Point3f::new(0.0, 0.0, RENDER_VERTICAL_OFFSET));
        assert_relative_eq!(converted.up, Vector3f::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_render_convention_keeps_up_length() {
        let pose = CameraPose::new(
            Point3f::new(0.0, 0.0, 2.0),
            Point3f::origin(),
            Vector3f::new(0.0, 3.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(pose.to_render_convention().up.norm(), pose.up.norm(), epsilon = 1e-6);
    }

    #[test]
    fn test_distance_scale() {
        let pose = CameraPose::default();
        let farther = pose.with_distance_scale(1.5).unwrap();

        assert_relative_eq!(farther.distance(), pose.distance() * 1.5, epsilon = 1e-5);
        assert_relative_eq!(farther.view_direction(), pose.view_direction(), epsilon = 1e-6);
        assert!(pose.with_distance_scale(0.0).is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let pose = CameraPose::default();
        let parsed: CameraPose = pose.to_string().parse().unwrap();
        assert_eq!(parsed, pose);
    }

    #[test]
    fn test_fov_conversion() {
        assert_relative_eq!(vertical_to_horizontal_fov(60.0, 1.0), 60.0, epsilon = 1e-4);
        let horizontal = vertical_to_horizontal_fov(60.0, 16.0 / 9.0);
        assert!(horizontal > 60.0 && horizontal < 180.0);
    }
}
