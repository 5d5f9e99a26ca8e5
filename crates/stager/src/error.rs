//! Pipeline errors

use std::path::PathBuf;

use stager_camera::CameraError;
use stager_scene::SceneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    /// The substitute file must hold exactly one object
    #[error("Expected exactly one object in '{path}', found {count}")]
    SubstituteCount { path: PathBuf, count: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Usage: {0}")]
    Usage(String),

    #[error("Failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
