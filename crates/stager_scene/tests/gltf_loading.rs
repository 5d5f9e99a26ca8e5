//! Loading scenes and objects from glTF fixtures

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use stager_scene::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

#[test]
fn loads_scene_with_hierarchy_and_labels() {
    let labels = LabelMapping::from_csv_file(fixture("labels.csv")).unwrap();
    let objects = GltfLoader::new().load_scene(&fixture("room.gltf"), &labels).unwrap();

    let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Floor", "Chair_1", "Chair_2", "Table"]);

    let floor = &objects[0];
    assert_eq!(floor.property("type").and_then(|v| v.as_str()), Some("Floor"));
    assert_eq!(floor.mesh.as_ref().unwrap().triangle_count(), 2);

    // Parent translation is folded into the world transform
    let chair = &objects[2];
    let position = chair.transform.w_axis.truncate();
    assert_relative_eq!(position.x, 3.0, epsilon = 1e-5);
    assert_relative_eq!(position.y, 1.5, epsilon = 1e-5);
    assert_relative_eq!(position.z, 0.45, epsilon = 1e-5);
    assert_eq!(chair.property("category_id").and_then(|v| v.as_int()), Some(3));

    let table = &objects[3];
    assert_eq!(table.property("category_id").and_then(|v| v.as_int()), Some(4));
    assert!(table.property("bbox").is_none());
    let bounds = table.world_bounds().unwrap();
    assert_relative_eq!(bounds.min.z, 0.0, epsilon = 1e-5);
}

#[test]
fn loaded_scene_supports_queries() {
    let objects = GltfLoader::new()
        .load_scene(&fixture("room.gltf"), &LabelMapping::new())
        .unwrap();
    let scene = Scene::from_objects(objects);

    let chairs = scene.select(&PropertyFilter::equals("coarse_grained_class", "chair"));
    assert_eq!(chairs.len(), 2);

    let index = GeometryIndex::build(&scene);
    assert_eq!(index.len(), 4);
    let floors = ExclusionSet::from_filter(&scene, &PropertyFilter::equals("type", "Floor"));
    let chair = scene.object(chairs[0]).unwrap();
    let mesh = chair.mesh.as_deref().unwrap();
    // The chair only touches the floor
    assert!(!index.overlaps(mesh, &chair.transform, &floors.with(chairs[0])));
    assert!(index.overlaps(mesh, &chair.transform, &ExclusionSet::from_iter([chairs[0]])));
}

#[test]
fn loads_single_object_file() {
    let objects = GltfLoader::new().load_objects(&fixture("chair.gltf")).unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name, "replacement_chair");
    assert_eq!(objects[0].property("source").and_then(|v| v.as_str()), Some("catalog"));

    let two = GltfLoader::new().load_objects(&fixture("two_objects.gltf")).unwrap();
    assert_eq!(two.len(), 2);
}

#[test]
fn missing_file_is_an_error() {
    let result = GltfLoader::new().load_objects(&fixture("does_not_exist.gltf"));
    assert!(matches!(result, Err(SceneError::Gltf { .. })));
}
