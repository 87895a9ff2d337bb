//! External renderer invocation
//!
//! Scenes are rendered by a separate executable called as
//! `<exe> -m <variant> <scene.xml> -o <image.exr>`. The executable path is
//! passed in explicitly; nothing here reads global state.

use crate::error::RenderError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default renderer variant
pub const DEFAULT_VARIANT: &str = "scalar_rgb";

/// Which renderer to run and in which variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    pub executable: PathBuf,
    pub variant: String,
}

impl RendererConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            variant: DEFAULT_VARIANT.to_string(),
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }
}

/// Runs the renderer synchronously, one scene at a time
#[derive(Debug, Clone)]
pub struct RendererInvoker {
    config: RendererConfig,
}

impl RendererInvoker {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// The command line for rendering `scene` into `output`
    pub fn command(&self, scene: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.config.executable);
        command
            .arg("-m")
            .arg(&self.config.variant)
            .arg(scene)
            .arg("-o")
            .arg(output);
        command
    }

    /// Render `scene` to `output` and return the image path.
    ///
    /// Fails when the executable cannot be started, exits unsuccessfully,
    /// or leaves no file at `output`.
    pub fn render(&self, scene: &Path, output: &Path) -> Result<PathBuf, RenderError> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("rendering {} -> {}", scene.display(), output.display());
        let result = self.command(scene, output).output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => RenderError::ExecutableNotFound {
                path: self.config.executable.display().to_string(),
            },
            _ => RenderError::Io(e),
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(RenderError::Failed {
                status: result.status.to_string(),
                stderr,
            });
        }
        if !output.exists() {
            return Err(RenderError::MissingOutput {
                path: output.display().to_string(),
            });
        }

        Ok(output.to_path_buf())
    }

    /// Render scenes in order, stopping at the first failure
    pub fn render_all(&self, jobs: &[(PathBuf, PathBuf)]) -> Result<Vec<PathBuf>, RenderError> {
        let mut images = Vec::with_capacity(jobs.len());
        for (i, (scene, output)) in jobs.iter().enumerate() {
            tracing::debug!("frame {}/{}", i + 1, jobs.len());
            images.push(self.render(scene, output)?);
        }
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let invoker = RendererInvoker::new(RendererConfig::new("/opt/renderer/bin/mitsuba"));
        let command = invoker.command(Path::new("scene.xml"), Path::new("out/scene.exr"));

        assert_eq!(command.get_program(), "/opt/renderer/bin/mitsuba");
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-m", "scalar_rgb", "scene.xml", "-o", "out/scene.exr"]);
    }

    #[test]
    fn test_variant_override() {
        let config = RendererConfig::new("mitsuba").with_variant("llvm_ad_rgb");
        let invoker = RendererInvoker::new(config);
        let command = invoker.command(Path::new("a.xml"), Path::new("a.exr"));
        assert_eq!(command.get_args().nth(1).unwrap(), "llvm_ad_rgb");
    }

    #[test]
    fn test_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = RendererInvoker::new(RendererConfig::new(dir.path().join("no-such-renderer")));
        let result = invoker.render(&dir.path().join("scene.xml"), &dir.path().join("scene.exr"));
        assert!(matches!(result, Err(RenderError::ExecutableNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = RendererInvoker::new(RendererConfig::new("false"));
        let result = invoker.render(&dir.path().join("scene.xml"), &dir.path().join("scene.exr"));
        assert!(matches!(result, Err(RenderError::Failed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_renderer_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = RendererInvoker::new(RendererConfig::new("true"));
        let result = invoker.render(&dir.path().join("scene.xml"), &dir.path().join("scene.exr"));
        assert!(matches!(result, Err(RenderError::MissingOutput { .. })));
    }
}
