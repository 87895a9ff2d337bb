//! Point, vector and color types

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// An RGB triple, each channel nominally in [0, 1]
pub type Rgb = [f32; 3];

/// Neutral gray used wherever a point has no color of its own
pub const FALLBACK_GRAY: Rgb = [0.7, 0.7, 0.7];

/// One of the three world coordinate axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index (0, 1 or 2)
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Axis for a component index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            2 => Some(Axis::Z),
            _ => None,
        }
    }

    /// World unit vector along this axis
    pub fn unit(self) -> Vector3f {
        match self {
            Axis::X => Vector3f::x(),
            Axis::Y => Vector3f::y(),
            Axis::Z => Vector3f::z(),
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "0" => Ok(Axis::X),
            "y" | "1" => Ok(Axis::Y),
            "z" | "2" => Ok(Axis::Z),
            other => Err(Error::Unsupported(format!("unknown axis '{}'", other))),
        }
    }
}

/// Clamp every channel of a color into `[lo, hi]`
pub fn clamp_rgb(color: Rgb, lo: f32, hi: f32) -> Rgb {
    [
        color[0].clamp(lo, hi),
        color[1].clamp(lo, hi),
        color[2].clamp(lo, hi),
    ]
}

/// Format three floats as a comma-joined triple without whitespace.
///
/// Values always carry a decimal point or exponent (`1.0`, not `1`), which
/// is what the renderer's vector attribute parser expects.
pub fn format_triple(x: f32, y: f32, z: f32) -> String {
    format!("{:?},{:?},{:?}", x, y, z)
}

/// Check whether every channel lies in [0, 1]
pub fn is_unit_rgb(color: &Rgb) -> bool {
    color.iter().all(|c| (0.0..=1.0).contains(c))
}
