//! Scene documents and configurations on disk

use pcrender_core::Result;
use pcrender_scene::{SceneConfig, SceneDocument};
use std::fs;
use std::path::{Path, PathBuf};

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a scene document as XML, creating missing parent directories
pub fn write_scene<P: AsRef<Path>>(document: &SceneDocument, path: P) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, document.to_xml())?;
    tracing::debug!("wrote scene {}", path.display());
    Ok(())
}

/// Load a JSON scene configuration
pub fn load_scene_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = SceneConfig::from_json_str(&text)?;
    tracing::debug!("loaded scene configuration {}", path.display());
    Ok(config)
}

/// Save a scene configuration as pretty-printed JSON
pub fn write_scene_config<P: AsRef<Path>>(config: &SceneConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    create_parent(path)?;
    fs::write(path, config.to_json_string()?)?;
    Ok(())
}

/// `frame_007.xml` style names, zero-padded to three digits
pub fn frame_file_name(prefix: &str, index: usize, extension: &str) -> String {
    format!("{}_{:03}.{}", prefix, index, extension)
}

/// Write one document per frame into `dir` and return their paths in order
pub fn write_frames<P: AsRef<Path>>(documents: &[SceneDocument], dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(documents.len());
    for (i, document) in documents.iter().enumerate() {
        let path = dir.join(frame_file_name("frame", i, "xml"));
        write_scene(document, &path)?;
        paths.push(path);
    }
    tracing::info!("wrote {} frame scenes to {}", paths.len(), dir.display());
    Ok(paths)
}
