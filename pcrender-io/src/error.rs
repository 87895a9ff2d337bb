//! Error types for renderer invocation

use thiserror::Error;

/// Errors raised while running the external renderer
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Renderer executable not found: {path}")]
    ExecutableNotFound { path: String },

    #[error("Renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Renderer reported success but wrote no image at {path}")]
    MissingOutput { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
