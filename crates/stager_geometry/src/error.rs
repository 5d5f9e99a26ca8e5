//! Error types for geometry construction

use thiserror::Error;

/// Geometry errors
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Index list is not a whole number of triangles
    #[error("Triangle index count {0} is not a multiple of 3")]
    InvalidIndexCount(usize),

    /// Index points past the vertex list
    #[error("Triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// Vertex with NaN or infinite coordinates
    #[error("Vertex {0} has non-finite coordinates")]
    NonFiniteVertex(usize),
}

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, GeometryError>;
