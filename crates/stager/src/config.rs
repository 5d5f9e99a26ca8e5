//! Synthesis Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line: `--seed 7`
//! 2. Environment variables: `STAGER_SEED`, `STAGER_MAX_TRIES`,
//!    `STAGER_TARGET_POSES`
//! 3. Config file given with `--config`
//! 4. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! seed = 42
//!
//! [replacement]
//! replace_fraction = 1.0
//! copy_properties = true
//! random_yaw = true
//!
//! [replacement.candidates]
//! coarse_grained_class = "chair"
//!
//! [replacement.ignore_collisions_with]
//! type = "Floor"
//!
//! [camera]
//! fov = 0.691111
//! resolution_x = 512
//! resolution_y = 512
//!
//! [search]
//! max_tries = 10000
//! target_count = 5
//! coverage_threshold = 0.4
//!
//! [search.proximity]
//! min = 1.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stager_camera::{CameraIntrinsics, SearchConfig};
use stager_scene::{Properties, PropertyFilter, PropertyValue, ReplaceOptions};

use crate::error::{PipelineError, Result};

/// Turn an equality map into a filter
pub fn filter_from(properties: &Properties) -> PropertyFilter {
    properties
        .iter()
        .fold(PropertyFilter::new(), |filter, (key, value)| filter.with(key.clone(), value.clone()))
}

/// Which objects get substituted and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplacementConfig {
    /// Objects matching all of these are substitution candidates
    pub candidates: Properties,
    /// Objects matching all of these never block a substitute
    pub ignore_collisions_with: Properties,
    /// Turn substitutes by a random heading; otherwise keep the original's
    pub random_yaw: bool,
    #[serde(flatten)]
    pub options: ReplaceOptions,
}

impl Default for ReplacementConfig {
    fn default() -> Self {
        Self {
            candidates: Properties::new().with("coarse_grained_class", "chair"),
            ignore_collisions_with: Properties::new().with("type", "Floor"),
            random_yaw: true,
            options: ReplaceOptions::default(),
        }
    }
}

/// Camera model, room sampling and coverage scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    #[serde(flatten)]
    pub intrinsics: CameraIntrinsics,
    /// Objects camera positions are sampled above
    pub floors: Properties,
    /// Attempts per room point
    pub room_sampling_tries: u32,
    /// Property grouping hits for the coverage score
    pub class_key: String,
    /// Classes counted with `special_weight`
    pub special_classes: Vec<PropertyValue>,
    pub special_weight: f32,
    /// Count each object as its own coverage class
    pub per_object_coverage: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            intrinsics: CameraIntrinsics::default(),
            floors: Properties::new().with("type", "Floor"),
            room_sampling_tries: 1000,
            class_key: "category_id".to_string(),
            special_classes: Vec::new(),
            special_weight: 2.0,
            per_object_coverage: false,
        }
    }
}

/// Complete synthesis configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// RNG seed; a random one is drawn and logged when unset
    pub seed: Option<u64>,
    /// `id,name` CSV mapping category names to ids
    pub labels: Option<PathBuf>,
    pub replacement: ReplacementConfig,
    pub camera: CameraConfig,
    pub search: SearchConfig,
    /// Where the file part came from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl SynthConfig {
    /// Defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `STAGER_*` overrides looked up through `lookup`
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("STAGER_SEED") {
            match value.trim().parse() {
                Ok(seed) => {
                    self.seed = Some(seed);
                    log::info!("Seed from env: {}", seed);
                }
                Err(_) => log::warn!("Ignoring STAGER_SEED={:?}", value),
            }
        }

        if let Some(value) = lookup("STAGER_MAX_TRIES") {
            match value.trim().parse() {
                Ok(tries) => {
                    self.search.max_tries = tries;
                    log::info!("Max tries from env: {}", tries);
                }
                Err(_) => log::warn!("Ignoring STAGER_MAX_TRIES={:?}", value),
            }
        }

        if let Some(value) = lookup("STAGER_TARGET_POSES") {
            match value.trim().parse() {
                Ok(count) => {
                    self.search.target_count = count;
                    log::info!("Target poses from env: {}", count);
                }
                Err(_) => log::warn!("Ignoring STAGER_TARGET_POSES={:?}", value),
            }
        }
    }

    /// Reject inconsistent values before any work starts
    pub fn validate(&self) -> Result<()> {
        self.replacement.options.validate()?;
        self.camera.intrinsics.validate()?;
        self.search.validate()?;
        if self.camera.room_sampling_tries == 0 {
            return Err(PipelineError::Config(
                "camera.room_sampling_tries must be at least 1".to_string(),
            ));
        }
        if !(self.camera.special_weight.is_finite() && self.camera.special_weight >= 0.0) {
            return Err(PipelineError::Config(format!(
                "camera.special_weight must be a non-negative number, got {}",
                self.camera.special_weight
            )));
        }
        Ok(())
    }

    pub fn candidate_filter(&self) -> PropertyFilter {
        filter_from(&self.replacement.candidates)
    }

    pub fn collision_exclusion_filter(&self) -> PropertyFilter {
        filter_from(&self.replacement.ignore_collisions_with)
    }

    pub fn floor_filter(&self) -> PropertyFilter {
        filter_from(&self.camera.floors)
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Synthesis Configuration:");
        match self.seed {
            Some(seed) => log::info!("  Seed: {}", seed),
            None => log::info!("  Seed: random"),
        }
        log::info!(
            "  Replacement: fraction={}, copy_properties={}, random_yaw={}",
            self.replacement.options.replace_fraction,
            self.replacement.options.copy_properties,
            self.replacement.random_yaw
        );
        log::info!(
            "  Camera: fov={}, {}x{}",
            self.camera.intrinsics.fov,
            self.camera.intrinsics.resolution_x,
            self.camera.intrinsics.resolution_y
        );
        log::info!(
            "  Search: {} poses, {} tries, coverage > {}",
            self.search.target_count,
            self.search.max_tries,
            self.search.coverage_threshold
        );
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SynthConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.replacement.options.replace_fraction, 1.0);
        assert!(config.replacement.options.copy_properties);
        assert_eq!(config.replacement.options.placement_attempts, 100);
        assert!(config.replacement.options.match_scale);
        assert!(config.replacement.random_yaw);
        assert!(!config.camera.per_object_coverage);
        assert_eq!(config.search.target_count, 5);
        assert_eq!(config.search.max_tries, 10_000);
        assert_eq!(config.search.proximity.min, Some(1.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = SynthConfig::from_toml_str(
            r#"
            seed = 9

            [replacement]
            replace_fraction = 0.5
            selection = "bernoulli"
            match_scale = false

            [replacement.candidates]
            category_id = 3

            [camera]
            fov = 1.0
            special_classes = [3, "lamp"]

            [search]
            target_count = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, Some(9));
        assert_eq!(config.replacement.options.replace_fraction, 0.5);
        assert_eq!(config.replacement.options.selection, stager_scene::SelectionPolicy::Bernoulli);
        assert_eq!(config.replacement.candidates.get("category_id"), Some(&PropertyValue::Int(3)));
        assert!(!config.replacement.options.match_scale);
        // Untouched fields keep their defaults
        assert!(config.replacement.options.copy_properties);
        assert_eq!(config.replacement.options.placement_attempts, 100);
        assert_eq!(config.camera.intrinsics.fov, 1.0);
        assert_eq!(config.camera.intrinsics.resolution_x, 512);
        assert_eq!(config.camera.special_classes.len(), 2);
        assert_eq!(config.search.target_count, 2);
        assert_eq!(config.search.max_tries, 10_000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("STAGER_SEED", "17"), ("STAGER_MAX_TRIES", "300"), ("STAGER_TARGET_POSES", "oops")]
            .into_iter()
            .collect();
        let mut config = SynthConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.seed, Some(17));
        assert_eq!(config.search.max_tries, 300);
        assert_eq!(config.search.target_count, 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SynthConfig::default();
        config.replacement.options.replace_fraction = 1.5;
        assert!(matches!(config.validate(), Err(PipelineError::Scene(_))));

        let mut config = SynthConfig::default();
        config.camera.intrinsics.resolution_x = 0;
        assert!(matches!(config.validate(), Err(PipelineError::Camera(_))));

        let mut config = SynthConfig::default();
        config.camera.room_sampling_tries = 0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_filters() {
        let config = SynthConfig::default();
        let chair = Properties::new().with("coarse_grained_class", "chair");
        assert!(config.candidate_filter().passes(&chair));
        assert!(!config.floor_filter().passes(&chair));
        assert!(config.collision_exclusion_filter().passes(&Properties::new().with("type", "Floor")));
    }
}
