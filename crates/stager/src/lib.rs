//! # stager - Scene Synthesis Pipeline
//!
//! Swaps selected furniture in an indoor scene for a substitute object, then
//! searches the resulting scene for camera viewpoints worth rendering.
//!
//! The heavy lifting lives in `stager_scene` (substitution, spatial index)
//! and `stager_camera` (viewpoint search). This crate wires them together
//! behind a configuration file and a small command line.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;

pub mod prelude {
    pub use crate::cli::CliArgs;
    pub use crate::config::{CameraConfig, ReplacementConfig, SynthConfig};
    pub use crate::error::{PipelineError, Result};
    pub use crate::output::{JsonReportSink, NullSink};
    pub use crate::pipeline::{AssignmentRecord, OutputSink, PipelineInputs, SynthesisPipeline, SynthesisReport};
}

pub use prelude::*;
