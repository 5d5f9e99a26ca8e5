//! Error types for scene handling and substitution

use std::path::PathBuf;

use thiserror::Error;

use crate::object::ObjectId;

/// Scene errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Object id not present in the scene
    #[error("Scene object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Replacement fraction outside [0, 1]
    #[error("Replace fraction must be within [0, 1], got {0}")]
    InvalidFraction(f32),

    /// Substitution requested without any substitute
    #[error("Substitute pool is empty")]
    EmptySubstitutePool,

    /// Invalid replacement options
    #[error("Invalid replacement options: {0}")]
    InvalidOptions(String),

    /// Mesh data could not be turned into geometry
    #[error("Invalid mesh in '{name}': {source}")]
    InvalidMesh {
        name: String,
        #[source]
        source: stager_geometry::GeometryError,
    },

    /// glTF import failure
    #[error("Failed to load glTF '{path}': {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    /// Malformed label mapping
    #[error("Invalid label mapping at line {line}: {reason}")]
    LabelMapping { line: usize, reason: String },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
