//! Core data structures and conventions for pcrender
//!
//! This crate provides the fundamental types shared by the preparation and
//! scene synthesis stages: points and colors, point sets, bounding boxes,
//! camera poses and the mapping from canonical space into the renderer's
//! coordinate convention.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod transform;
pub mod camera;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use transform::*;
pub use camera::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Rotation3, Unit};
