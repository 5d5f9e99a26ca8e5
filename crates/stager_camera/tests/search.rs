//! Viewpoint search over small synthetic rooms

use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use stager_camera::*;
use stager_geometry::TriangleMesh;
use stager_scene::{GeometryIndex, PropertyFilter, Scene, SceneObject};

fn flat_floor() -> Scene {
    Scene::from_objects([SceneObject::new("floor")
        .with_mesh(TriangleMesh::plane(20.0, 20.0))
        .with_property("type", "Floor")])
}

fn floors() -> PropertyFilter {
    PropertyFilter::equals("type", "Floor")
}

fn config() -> SearchConfig {
    SearchConfig {
        height: HeightRange::new(1.5, 2.0),
        ..Default::default()
    }
}

fn full_coverage(_: &Mat4) -> f32 {
    1.0
}

fn no_coverage(_: &Mat4) -> f32 {
    0.0
}

struct Nowhere;

impl PointInRoomSampler for Nowhere {
    fn sample(&self, _height: f32, _rng: &mut dyn RngCore) -> Result<RoomPoint> {
        Err(CameraError::NoRoomPoint { tries: 1 })
    }
}

#[test]
fn flat_floor_yields_target_poses() {
    let scene = flat_floor();
    let index = GeometryIndex::build(&scene);
    let rooms = FloorPointSampler::new(&scene, &floors()).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    let search = ViewpointSearch::new(config(), CameraIntrinsics::default(), &rooms, &index, &full_coverage).unwrap();
    let outcome = search.run(&mut rng);

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.poses.len(), 5);
    assert!(outcome.tries < 10_000);
    for pose in &outcome.poses {
        let position = pose.w_axis.truncate();
        assert!(position.x.abs() <= 10.0 && position.y.abs() <= 10.0);
        assert!((1.5 - 1e-4..=2.0 + 1e-4).contains(&position.z));
    }
}

#[test]
fn accepted_poses_revalidate() {
    let scene = flat_floor();
    let index = GeometryIndex::build(&scene);
    let rooms = FloorPointSampler::new(&scene, &floors()).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let config = SearchConfig {
        target_count: 8,
        ..config()
    };

    let search = ViewpointSearch::new(config.clone(), CameraIntrinsics::default(), &rooms, &index, &full_coverage)
        .unwrap();
    let outcome = search.run(&mut rng);
    assert_eq!(outcome.poses.len(), 8);

    let validator = PoseValidator::new(&index, &full_coverage)
        .with_checks(config.proximity)
        .with_coverage_threshold(config.coverage_threshold)
        .with_rays_per_side(config.rays_per_side);
    assert!(outcome.poses.iter().all(|pose| validator.accepts(pose)));
}

#[test]
fn budget_is_exhausted_without_coverage() {
    let scene = flat_floor();
    let index = GeometryIndex::build(&scene);
    let rooms = FloorPointSampler::new(&scene, &floors()).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let config = SearchConfig {
        max_tries: 50,
        ..config()
    };

    let search = ViewpointSearch::new(config, CameraIntrinsics::default(), &rooms, &index, &no_coverage).unwrap();
    let outcome = search.run(&mut rng);

    assert_eq!(outcome.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(outcome.tries, 50);
    assert!(outcome.poses.is_empty());
}

#[test]
fn sampler_failures_count_as_tries() {
    let index = GeometryIndex::build(&flat_floor());
    let mut rng = StdRng::seed_from_u64(4);
    let config = SearchConfig {
        max_tries: 20,
        ..config()
    };

    let search = ViewpointSearch::new(config, CameraIntrinsics::default(), &Nowhere, &index, &full_coverage).unwrap();
    let outcome = search.run(&mut rng);

    assert_eq!(outcome.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(outcome.tries, 20);
}

#[test]
fn zero_target_stops_immediately() {
    let scene = flat_floor();
    let index = GeometryIndex::build(&scene);
    let rooms = FloorPointSampler::new(&scene, &floors()).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let config = SearchConfig {
        target_count: 0,
        ..config()
    };

    let mut search = ViewpointSearch::new(config, CameraIntrinsics::default(), &rooms, &index, &full_coverage).unwrap();
    assert_eq!(search.state(), SearchState::Searching);
    assert_eq!(search.step(&mut rng), SearchState::Done(StopReason::TargetReached));
    assert_eq!(search.tries(), 0);
}

#[test]
fn steps_walk_through_states() {
    let scene = flat_floor();
    let index = GeometryIndex::build(&scene);
    let rooms = FloorPointSampler::new(&scene, &floors()).unwrap();
    let mut rng = StdRng::seed_from_u64(6);
    let config = SearchConfig {
        target_count: 2,
        ..config()
    };

    let mut search = ViewpointSearch::new(config, CameraIntrinsics::default(), &rooms, &index, &full_coverage).unwrap();
    assert_eq!(search.step(&mut rng), SearchState::Accepted);
    assert_eq!(search.step(&mut rng), SearchState::Accepted);
    assert_eq!(search.step(&mut rng), SearchState::Done(StopReason::TargetReached));
    // Done is terminal
    assert_eq!(search.step(&mut rng), SearchState::Done(StopReason::TargetReached));
    assert_eq!(search.tries(), 2);
    assert_eq!(search.accepted().len(), 2);
}

#[test]
fn floor_too_close_rejects_everything() {
    // Looking straight down from below a metre
    let scene = flat_floor();
    let index = GeometryIndex::build(&scene);
    let rooms = FloorPointSampler::new(&scene, &floors()).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let config = SearchConfig {
        max_tries: 100,
        height: HeightRange::new(0.3, 0.5),
        orientation: OrientationRanges::fixed([0.0, 0.0, 0.0]),
        ..Default::default()
    };

    let search = ViewpointSearch::new(config, CameraIntrinsics::default(), &rooms, &index, &full_coverage).unwrap();
    let outcome = search.run(&mut rng);
    assert_eq!(outcome.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(outcome.tries, 100);
    assert!(outcome.poses.is_empty());
}

#[test]
fn coverage_driven_search_respects_bounds() {
    let mut scene = flat_floor();
    for (i, (x, y)) in [(-4.0, 3.0), (0.0, 5.0), (4.0, -2.0), (-3.0, -5.0), (6.0, 6.0)]
        .into_iter()
        .enumerate()
    {
        scene.insert(
            SceneObject::new(format!("cabinet_{i}"))
                .with_mesh(TriangleMesh::cuboid(Vec3::new(0.8, 0.8, 1.0)))
                .with_transform(Mat4::from_translation(Vec3::new(x, y, 1.0)))
                .with_property("category_id", i as i64),
        );
    }
    let index = GeometryIndex::build(&scene);
    let rooms = FloorPointSampler::new(&scene, &floors()).unwrap();
    let coverage = RayCoverageEstimator::new(&scene, &index, CameraIntrinsics::default());
    let mut rng = StdRng::seed_from_u64(10);
    let config = SearchConfig {
        max_tries: 500,
        coverage_threshold: 0.05,
        ..config()
    };

    let search = ViewpointSearch::new(config.clone(), CameraIntrinsics::default(), &rooms, &index, &coverage).unwrap();
    let outcome = search.run(&mut rng);

    assert!(outcome.poses.len() <= config.target_count);
    assert!(outcome.tries <= config.max_tries);
    for pose in &outcome.poses {
        assert!(coverage.score(pose) > config.coverage_threshold);
        assert!(obstacle_in_view(pose, &config.proximity, &index, &CameraIntrinsics::default(), config.rays_per_side));
    }
}
