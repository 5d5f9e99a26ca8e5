//! Object substitution under collision constraints
//!
//! Replaces a fraction of candidate objects with instances of substitute
//! templates. A substitute is only inserted where it does not overlap the
//! rest of the scene; on success the original is invalidated.

use glam::{Mat4, Vec3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::collision::{CollisionChecker, ExclusionSet};
use crate::error::{Result, SceneError};
use crate::index::GeometryIndex;
use crate::object::{ObjectId, SceneObject};
use crate::placement::RelativePoseSampler;
use crate::properties::Properties;
use crate::scene::Scene;

/// How candidates are chosen for replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Deterministic: replace the i-th live candidate while fewer than
    /// `floor((i + 1) * fraction + 0.5)` replacements have been performed
    #[default]
    Proportional,
    /// Each candidate independently with probability `fraction`
    Bernoulli,
}

/// How a substitute template is picked from the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstitutePolicy {
    /// The k-th selected candidate uses `pool[k % pool.len()]`
    #[default]
    RoundRobin,
    /// Drawn uniformly for every placement attempt
    UniformRandom,
}

/// Substitution options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaceOptions {
    /// Fraction of candidates to replace, within [0, 1]
    pub replace_fraction: f32,
    /// Give the substitute the original's custom properties
    pub copy_properties: bool,
    pub selection: SelectionPolicy,
    pub substitute: SubstitutePolicy,
    /// Pose samples tried per selected candidate before it is skipped
    pub placement_attempts: u32,
    /// Scale each substitute so its bounds match the original's
    pub match_scale: bool,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            replace_fraction: 1.0,
            copy_properties: true,
            selection: SelectionPolicy::Proportional,
            substitute: SubstitutePolicy::RoundRobin,
            placement_attempts: 100,
            match_scale: true,
        }
    }
}

impl ReplaceOptions {
    pub fn with_fraction(mut self, fraction: f32) -> Self {
        self.replace_fraction = fraction;
        self
    }

    pub fn with_copy_properties(mut self, copy: bool) -> Self {
        self.copy_properties = copy;
        self
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_substitute_policy(mut self, policy: SubstitutePolicy) -> Self {
        self.substitute = policy;
        self
    }

    pub fn with_placement_attempts(mut self, attempts: u32) -> Self {
        self.placement_attempts = attempts;
        self
    }

    pub fn with_match_scale(mut self, match_scale: bool) -> Self {
        self.match_scale = match_scale;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.replace_fraction) {
            return Err(SceneError::InvalidFraction(self.replace_fraction));
        }
        if self.placement_attempts == 0 {
            return Err(SceneError::InvalidOptions(
                "placement_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One performed substitution
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementAssignment {
    /// The object that was replaced (now invalid)
    pub original: ObjectId,
    /// Index of the template in the substitute pool
    pub substitute: usize,
    /// The newly inserted object
    pub inserted: ObjectId,
    /// World transform of the inserted object
    pub transform: Mat4,
    /// Properties copied from the original, when copying was enabled
    pub inherited_properties: Option<Properties>,
}

/// Outcome of one substitution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementReport {
    pub assignments: Vec<ReplacementAssignment>,
    /// Selected candidates left in place because every placement collided
    pub skipped: Vec<ObjectId>,
    /// Live candidates considered
    pub considered: usize,
}

impl ReplacementReport {
    pub fn replaced_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Substitution engine
#[derive(Debug, Clone, Default)]
pub struct ObjectReplacer {
    options: ReplaceOptions,
}

impl ObjectReplacer {
    pub fn new(options: ReplaceOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ReplaceOptions {
        &self.options
    }

    /// Replace candidates with substitutes drawn from `pool`
    ///
    /// Candidates are visited in order; invalid or repeated candidates are
    /// ignored. Collisions are checked against every valid object except
    /// `exclusion` and the candidate itself. The geometry index is rebuilt
    /// after each insertion so later substitutes avoid earlier ones.
    pub fn replace(
        &self,
        scene: &mut Scene,
        candidates: &[ObjectId],
        pool: &[SceneObject],
        exclusion: &ExclusionSet,
        pose_sampler: &dyn RelativePoseSampler,
        rng: &mut dyn RngCore,
    ) -> Result<ReplacementReport> {
        let mut live = Vec::with_capacity(candidates.len());
        for &id in candidates {
            if scene.object(id)?.is_valid() && !live.contains(&id) {
                live.push(id);
            }
        }

        let mut report = ReplacementReport {
            considered: live.len(),
            ..Default::default()
        };
        if live.is_empty() || self.options.replace_fraction == 0.0 {
            log::info!("Nothing to replace ({} live candidates)", live.len());
            return Ok(report);
        }
        if pool.is_empty() {
            return Err(SceneError::EmptySubstitutePool);
        }

        let mut index = GeometryIndex::build(scene);
        let mut selected = 0usize;

        for (position, &original_id) in live.iter().enumerate() {
            if !self.is_selected(position, report.assignments.len(), rng) {
                continue;
            }
            let original = scene.object(original_id)?;
            let base = rigid_part(&original.transform);
            let original_bounds = original.local_bounds();
            let checker = CollisionChecker::new(&index);
            let ignore = exclusion.with(original_id);

            let mut placement = None;
            for attempt in 0..self.options.placement_attempts {
                let substitute = self.pick_substitute(selected, pool.len(), rng);
                let template = &pool[substitute];
                let mut transform = pose_sampler.sample(&base, rng);
                if self.options.match_scale {
                    transform *= Mat4::from_scale(bounds_ratio(original_bounds, template.local_bounds()));
                }

                let collides = template
                    .mesh
                    .as_deref()
                    .map(|mesh| checker.placement_collides(mesh, &transform, &ignore))
                    .unwrap_or(false);
                if collides {
                    log::debug!(
                        "Placement {} of '{}' for {} collides",
                        attempt + 1,
                        template.name,
                        original_id
                    );
                    continue;
                }
                placement = Some((substitute, transform));
                break;
            }
            selected += 1;

            let Some((substitute, transform)) = placement else {
                log::debug!("Skipping {}: no collision-free placement", original_id);
                report.skipped.push(original_id);
                continue;
            };

            let template = &pool[substitute];
            let inherited = self
                .options
                .copy_properties
                .then(|| original.properties.clone());
            let mut instance = SceneObject::new(format!("{}.{:03}", template.name, report.assignments.len() + 1))
                .with_transform(transform)
                .with_properties(inherited.clone().unwrap_or_else(|| template.properties.clone()));
            instance.mesh = template.mesh.clone();

            let inserted = scene.insert(instance);
            scene.invalidate(original_id)?;
            log::debug!("Replaced {} with {} ('{}')", original_id, inserted, template.name);

            report.assignments.push(ReplacementAssignment {
                original: original_id,
                substitute,
                inserted,
                transform,
                inherited_properties: inherited,
            });
            index = GeometryIndex::build(scene);
        }

        log::info!(
            "Replaced {}/{} candidates ({} skipped on collision)",
            report.replaced_count(),
            report.considered,
            report.skipped.len()
        );
        Ok(report)
    }

    fn is_selected(&self, position: usize, replaced: usize, rng: &mut dyn RngCore) -> bool {
        let fraction = self.options.replace_fraction;
        match self.options.selection {
            SelectionPolicy::Proportional => {
                let quota = ((position + 1) as f64 * fraction as f64 + 0.5).floor() as usize;
                replaced < quota
            }
            SelectionPolicy::Bernoulli => rng.random::<f32>() < fraction,
        }
    }

    fn pick_substitute(&self, selected: usize, pool_len: usize, rng: &mut dyn RngCore) -> usize {
        match self.options.substitute {
            SubstitutePolicy::RoundRobin => selected % pool_len,
            SubstitutePolicy::UniformRandom => rng.random_range(0..pool_len),
        }
    }
}

/// Rotation and translation of a transform, scale dropped
fn rigid_part(transform: &Mat4) -> Mat4 {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    Mat4::from_rotation_translation(rotation, translation)
}

/// Per-axis scale taking `substitute` bounds to `original` bounds
fn bounds_ratio(original: Option<stager_geometry::Aabb>, substitute: Option<stager_geometry::Aabb>) -> Vec3 {
    let (Some(original), Some(substitute)) = (original, substitute) else {
        return Vec3::ONE;
    };
    let target = original.size();
    let source = substitute.size();
    Vec3::select(source.cmpgt(Vec3::splat(1e-6)), target / source, Vec3::ONE)
}
