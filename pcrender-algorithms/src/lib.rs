//! # pcrender Algorithms
//!
//! Numerical stages that turn a raw point set into render-ready data.
//!
//! This crate provides bounding-box normalization with optional
//! subsampling, per-point color assignment (input colors, position and
//! height colormaps, fixed and user-defined colors) and camera orbits for
//! turntable animations.

pub mod normalize;
pub mod color;
pub mod orbit;

// Re-export commonly used items
pub use normalize::*;
pub use color::*;
pub use orbit::*;
