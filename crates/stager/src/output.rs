//! Report output

use std::path::Path;

use crate::error::Result;
use crate::pipeline::{OutputSink, SynthesisReport};

/// Writes the report as pretty-printed JSON into the output directory
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    pub file_name: String,
}

impl Default for JsonReportSink {
    fn default() -> Self {
        Self {
            file_name: "synthesis.json".to_string(),
        }
    }
}

impl OutputSink for JsonReportSink {
    fn persist(&self, output_dir: &Path, report: &SynthesisReport) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(&self.file_name);
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;
        log::info!(
            "Wrote {} poses and {} substitutions to {}",
            report.poses.len(),
            report.assignments.len(),
            path.display()
        );
        Ok(())
    }
}

/// Discards reports
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn persist(&self, _output_dir: &Path, _report: &SynthesisReport) -> Result<()> {
        Ok(())
    }
}
