//! Scene synthesis for pcrender
//!
//! This crate turns prepared point data into the declarative scene
//! documents consumed by the external renderer:
//!
//! - [`config`]: serde-backed scene settings with the renderer defaults
//! - [`document`]: the element tree and its deterministic XML form
//! - [`builder`]: node-by-node scene construction
//! - [`pipeline`]: normalization, remapping and coloring of a point set, and
//!   per-frame documents for camera orbits

pub mod config;
pub mod document;
pub mod builder;
pub mod pipeline;

pub use config::*;
pub use document::*;
pub use builder::*;
pub use pipeline::*;
