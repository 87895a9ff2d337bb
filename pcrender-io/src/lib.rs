//! I/O for pcrender
//!
//! Point sets are read from PLY and XYZ files, scene documents are written
//! as XML next to their JSON configuration, and rendering is delegated to an
//! external renderer executable.

pub mod error;
pub mod ply;
pub mod renderer;
pub mod scene_file;
pub mod xyz;

pub use error::*;
pub use ply::{PlyReader, PlyWriter};
pub use renderer::{RendererConfig, RendererInvoker};
pub use scene_file::{frame_file_name, load_scene_config, write_frames, write_scene, write_scene_config};
pub use xyz::{XyzReader, XyzWriter};

use pcrender_core::{Error, PointSet, Result};
use std::path::Path;

/// Trait for reading point sets from files
pub trait PointSetReader {
    fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet>;
}

/// Trait for writing point sets to files
pub trait PointSetWriter {
    fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()>;
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
}

/// Auto-detect format and read a point set
pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let path = path.as_ref();
    let set = match extension(path).as_deref() {
        Some("ply") => PlyReader::read_point_set(path)?,
        Some("xyz") | Some("txt") | Some("csv") => XyzReader::read_point_set(path)?,
        _ => {
            return Err(Error::Unsupported(format!(
                "unsupported point cloud format: {}",
                path.display()
            )))
        }
    };
    tracing::info!(
        "loaded {} points from {} ({})",
        set.len(),
        path.display(),
        if set.colors.is_some() { "colored" } else { "uncolored" }
    );
    Ok(set)
}

/// Auto-detect format and write a point set
pub fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()> {
    let path = path.as_ref();
    match extension(path).as_deref() {
        Some("ply") => PlyWriter::write_point_set(set, path),
        Some("xyz") | Some("txt") => XyzWriter::write_point_set(set, path),
        _ => Err(Error::Unsupported(format!(
            "unsupported point cloud format: {}",
            path.display()
        ))),
    }
}
