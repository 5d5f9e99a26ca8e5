//! Error types for camera sampling

use thiserror::Error;

/// Camera errors
#[derive(Debug, Error)]
pub enum CameraError {
    /// Room sampler built over a scene without floor objects
    #[error("No floor objects to sample camera positions from")]
    NoFloors,

    /// Every attempt to find a point above a floor failed
    #[error("Could not find a point above a floor after {tries} tries")]
    NoRoomPoint { tries: u32 },

    /// A sampling range with min > max or non-finite bounds
    #[error("Invalid {name} range: [{min}, {max}]")]
    InvalidRange { name: String, min: f32, max: f32 },

    /// Invalid configuration
    #[error("Invalid camera configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for camera operations
pub type Result<T> = std::result::Result<T, CameraError>;

pub(crate) fn check_range(name: &str, min: f32, max: f32) -> Result<()> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(CameraError::InvalidRange {
            name: name.to_string(),
            min,
            max,
        })
    }
}
