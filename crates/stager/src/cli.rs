//! Command line arguments
//!
//! ```text
//! stager <scene.gltf> <object.gltf> [output_dir] [--config FILE] [--labels FILE] [--seed N]
//! ```

use std::path::PathBuf;

use crate::config::SynthConfig;
use crate::error::{PipelineError, Result};

pub const USAGE: &str =
    "stager <scene.gltf> <object.gltf> [output_dir] [--config FILE] [--labels FILE] [--seed N]";

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub scene: PathBuf,
    pub object: PathBuf,
    pub output_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub labels: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl CliArgs {
    /// Parse arguments, program name excluded
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut positional = Vec::new();
        let mut config = None;
        let mut labels = None;
        let mut seed = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(Self::value(&mut args, "--config")?)),
                "--labels" => labels = Some(PathBuf::from(Self::value(&mut args, "--labels")?)),
                "--seed" => {
                    let value = Self::value(&mut args, "--seed")?;
                    let parsed = value
                        .parse()
                        .map_err(|_| PipelineError::Usage(format!("--seed expects an integer, got '{}'", value)))?;
                    seed = Some(parsed);
                }
                flag if flag.starts_with("--") => {
                    return Err(PipelineError::Usage(format!("unknown flag '{}'\n{}", flag, USAGE)));
                }
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        if !(2..=3).contains(&positional.len()) {
            return Err(PipelineError::Usage(USAGE.to_string()));
        }
        let mut positional = positional.into_iter();
        let (Some(scene), Some(object)) = (positional.next(), positional.next()) else {
            return Err(PipelineError::Usage(USAGE.to_string()));
        };
        let output_dir = positional.next().unwrap_or_else(|| PathBuf::from("output"));

        Ok(Self {
            scene,
            object,
            output_dir,
            config,
            labels,
            seed,
        })
    }

    fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
        args.next()
            .ok_or_else(|| PipelineError::Usage(format!("{} expects a value", flag)))
    }

    /// Command line values win over everything else
    pub fn apply_to(&self, config: &mut SynthConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
            log::info!("Seed from args: {}", seed);
        }
        if let Some(labels) = &self.labels {
            config.labels = Some(labels.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_only() {
        let cli = CliArgs::parse(args(&["room.gltf", "chair.gltf"])).unwrap();
        assert_eq!(cli.scene, PathBuf::from("room.gltf"));
        assert_eq!(cli.object, PathBuf::from("chair.gltf"));
        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_flags_anywhere() {
        let cli = CliArgs::parse(args(&[
            "--seed", "12", "room.gltf", "--labels", "labels.csv", "chair.gltf", "out", "--config", "synth.toml",
        ]))
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.seed, Some(12));
        assert_eq!(cli.labels, Some(PathBuf::from("labels.csv")));
        assert_eq!(cli.config, Some(PathBuf::from("synth.toml")));

        let mut config = SynthConfig {
            seed: Some(1),
            ..Default::default()
        };
        cli.apply_to(&mut config);
        assert_eq!(config.seed, Some(12));
        assert_eq!(config.labels, Some(PathBuf::from("labels.csv")));
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(CliArgs::parse(args(&["room.gltf"])), Err(PipelineError::Usage(_))));
        assert!(matches!(CliArgs::parse(args(&["a", "b", "c", "d"])), Err(PipelineError::Usage(_))));
        assert!(matches!(CliArgs::parse(args(&["a", "b", "--seed"])), Err(PipelineError::Usage(_))));
        assert!(matches!(CliArgs::parse(args(&["a", "b", "--seed", "x"])), Err(PipelineError::Usage(_))));
        assert!(matches!(CliArgs::parse(args(&["a", "b", "--fast"])), Err(PipelineError::Usage(_))));
    }
}
