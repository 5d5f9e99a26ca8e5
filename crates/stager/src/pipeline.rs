//! Synthesis pipeline
//!
//! Load scene → substitute objects → rebuild index → search viewpoints →
//! persist the report. Collaborators are trait objects so tests and other
//! front ends can swap loaders, coverage scoring and output.

use std::path::{Path, PathBuf};

use glam::Mat4;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use stager_camera::{
    CoverageEstimator, FloorPointSampler, RayCoverageEstimator, StopReason, ViewpointSearch,
};
use stager_scene::{
    ExclusionSet, GeometryIndex, GltfLoader, KeepPose, LabelMapping, ObjectId, ObjectLoader, ObjectReplacer,
    RandomYaw, RelativePoseSampler, Scene, SceneLoader,
};

use crate::config::SynthConfig;
use crate::error::{PipelineError, Result};
use crate::output::JsonReportSink;

/// Persists a finished synthesis run
pub trait OutputSink {
    fn persist(&self, output_dir: &Path, report: &SynthesisReport) -> Result<()>;
}

/// One substitution as written to the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub original: ObjectId,
    pub original_name: String,
    pub inserted: ObjectId,
    pub inserted_name: String,
    /// Column-major world transform
    pub transform: [[f32; 4]; 4],
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub seed: u64,
    pub scene: PathBuf,
    pub object: PathBuf,
    pub assignments: Vec<AssignmentRecord>,
    /// Candidates left in place because every placement collided
    pub skipped: Vec<ObjectId>,
    /// Accepted camera poses, column-major camera-to-world
    pub poses: Vec<[[f32; 4]; 4]>,
    pub tries: u32,
    pub stop_reason: StopReason,
}

impl SynthesisReport {
    pub fn pose_matrices(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.poses.iter().map(Mat4::from_cols_array_2d)
    }
}

/// Input files and output location of one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineInputs {
    pub scene: PathBuf,
    pub object: PathBuf,
    pub output_dir: PathBuf,
}

/// Scores poses once the final scene and index exist
type CoverageFactory = Box<dyn for<'s> Fn(&'s Scene, &'s GeometryIndex) -> Box<dyn CoverageEstimator + 's>>;

/// End-to-end orchestration
pub struct SynthesisPipeline {
    config: SynthConfig,
    scene_loader: Box<dyn SceneLoader>,
    object_loader: Box<dyn ObjectLoader>,
    sink: Box<dyn OutputSink>,
    coverage: Option<CoverageFactory>,
}

impl SynthesisPipeline {
    /// Pipeline with glTF loaders and a JSON report
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            scene_loader: Box::new(GltfLoader::new()),
            object_loader: Box::new(GltfLoader::new()),
            sink: Box::new(JsonReportSink::default()),
            coverage: None,
        }
    }

    pub fn with_scene_loader(mut self, loader: impl SceneLoader + 'static) -> Self {
        self.scene_loader = Box::new(loader);
        self
    }

    pub fn with_object_loader(mut self, loader: impl ObjectLoader + 'static) -> Self {
        self.object_loader = Box::new(loader);
        self
    }

    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replace the ray-based coverage score
    pub fn with_coverage<F>(mut self, factory: F) -> Self
    where
        F: for<'s> Fn(&'s Scene, &'s GeometryIndex) -> Box<dyn CoverageEstimator + 's> + 'static,
    {
        self.coverage = Some(Box::new(factory));
        self
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn run(&self, inputs: &PipelineInputs) -> Result<SynthesisReport> {
        let config = &self.config;
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("Using seed {}", seed);
        let mut rng = StdRng::seed_from_u64(seed);

        // Scene and substitute
        let labels = match &config.labels {
            Some(path) => LabelMapping::from_csv_file(path)?,
            None => LabelMapping::new(),
        };
        let mut scene = Scene::from_objects(self.scene_loader.load_scene(&inputs.scene, &labels)?);
        log::info!("Loaded {} objects from {}", scene.len(), inputs.scene.display());

        let substitutes = self.object_loader.load_objects(&inputs.object)?;
        if substitutes.len() != 1 {
            return Err(PipelineError::SubstituteCount {
                path: inputs.object.clone(),
                count: substitutes.len(),
            });
        }

        // Substitution
        let candidates = scene.select(&config.candidate_filter());
        let exclusion = ExclusionSet::from_filter(&scene, &config.collision_exclusion_filter());
        log::info!(
            "{} substitution candidates, {} objects ignored for collisions",
            candidates.len(),
            exclusion.len()
        );
        let pose_sampler: Box<dyn RelativePoseSampler> = if config.replacement.random_yaw {
            Box::new(RandomYaw::full_turn())
        } else {
            Box::new(KeepPose)
        };
        let replacer = ObjectReplacer::new(config.replacement.options.clone())?;
        let replacement = replacer.replace(
            &mut scene,
            &candidates,
            &substitutes,
            &exclusion,
            pose_sampler.as_ref(),
            &mut rng,
        )?;

        // Viewpoint search on the final scene
        let index = GeometryIndex::build(&scene);
        let rooms = FloorPointSampler::new(&scene, &config.floor_filter())?
            .with_max_tries(config.camera.room_sampling_tries);
        let coverage: Box<dyn CoverageEstimator + '_> = match &self.coverage {
            Some(factory) => factory(&scene, &index),
            None => Box::new(
                RayCoverageEstimator::new(&scene, &index, config.camera.intrinsics)
                    .with_class_key(config.camera.class_key.clone())
                    .with_special_classes(config.camera.special_classes.clone(), config.camera.special_weight)
                    .with_per_object(config.camera.per_object_coverage)
                    .with_rays_per_side(config.search.rays_per_side),
            ),
        };
        let search = ViewpointSearch::new(
            config.search.clone(),
            config.camera.intrinsics,
            &rooms,
            &index,
            coverage.as_ref(),
        )?;
        let outcome = search.run(&mut rng);

        let assignments = replacement
            .assignments
            .iter()
            .map(|assignment| AssignmentRecord {
                original: assignment.original,
                original_name: scene.get(assignment.original).map(|o| o.name.clone()).unwrap_or_default(),
                inserted: assignment.inserted,
                inserted_name: scene.get(assignment.inserted).map(|o| o.name.clone()).unwrap_or_default(),
                transform: assignment.transform.to_cols_array_2d(),
            })
            .collect();
        let report = SynthesisReport {
            seed,
            scene: inputs.scene.clone(),
            object: inputs.object.clone(),
            assignments,
            skipped: replacement.skipped,
            poses: outcome.poses.iter().map(Mat4::to_cols_array_2d).collect(),
            tries: outcome.tries,
            stop_reason: outcome.stop_reason,
        };

        self.sink.persist(&inputs.output_dir, &report)?;
        Ok(report)
    }
}
