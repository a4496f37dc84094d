use std::path::{Path, PathBuf};

use raytracing_scene::geometry::Vec3f;
use raytracing_scene::scene::{Light, Shape3D, TrianglePrimitive};
use raytracing_scene::{ParseError, Scene, SceneParser};

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn test_parser() -> SceneParser {
    SceneParser::new(data_path("objects"))
}

fn load(name: &str) -> Scene {
    test_parser()
        .load_scene_from_file(&data_path(name))
        .expect("scene file should parse")
}

fn mesh_triangles(scene: &Scene, index: usize) -> &[TrianglePrimitive] {
    match &scene.surfaces()[index].shape {
        Shape3D::Mesh { triangles } => triangles,
        other => panic!("expected a mesh, got {:?}", other),
    }
}

#[test]
fn minimal_scene_file() {
    let scene = load("minimal.xml");
    assert_eq!(scene.output_file_name(), "out.png");
    assert_eq!(scene.camera().res_horizontal(), 512);
    assert_eq!(scene.camera().max_bounces(), 8);
    assert!(scene.ambient_light().is_none());
    assert!(scene.lights().is_empty());
    assert!(scene.surfaces().is_empty());
}

#[test]
fn mesh_references_resolve_against_assets_dir() {
    let scene = load("meshes.xml");
    assert_eq!(scene.surfaces().len(), 3);

    // "../../../secrets/triangle.obj" is looked up as triangle.obj
    let triangle = mesh_triangles(&scene, 0);
    assert_eq!(triangle.len(), 1);
    assert_eq!(
        triangle[0].vertices,
        [
            Vec3f::new(0.0, 0.0, 0.0),
            Vec3f::new(1.0, 0.0, 0.0),
            Vec3f::new(0.0, 1.0, 0.0)
        ]
    );
    assert_eq!(triangle[0].normals, [Vec3f::new(0.0, 0.0, 1.0); 3]);
    assert_eq!(triangle[0].uvs[1], Vec3f::new(1.0, 0.0, 0.0));
    assert_eq!(triangle[0].uvs[2], Vec3f::new(0.0, 1.0, 0.0));

    let transform = &scene.surfaces()[0].transform;
    assert_eq!(
        transform.apply_point(&Vec3f::zeros()),
        Vec3f::new(0.0, 0.0, -1.0)
    );

    assert_eq!(mesh_triangles(&scene, 2).len(), 12);
}

#[test]
fn defective_obj_keeps_valid_triangles() {
    let scene = load("meshes.xml");
    let messy = mesh_triangles(&scene, 1);

    // the quad and the faces with index 0 or 99 are dropped
    assert_eq!(messy.len(), 3);
    assert_eq!(messy[0].normals, [Vec3f::new(0.0, 0.0, 1.0); 3]);
    assert_eq!(
        messy[1].vertices,
        [
            Vec3f::new(0.0, 0.0, 0.0),
            Vec3f::new(1.0, 1.0, 0.0),
            Vec3f::new(0.0, 1.0, 0.0)
        ]
    );
    assert_eq!(messy[2].vertices[0], Vec3f::new(2.0, 2.0, 0.0));
    assert_eq!(messy[2].normals, [Vec3f::zeros(); 3]);
    assert_eq!(messy[2].uvs, [Vec3f::zeros(); 3]);
}

#[test]
fn missing_mesh_file_is_a_mesh_error() {
    let err = test_parser()
        .load_scene_from_file(&data_path("missing_mesh.xml"))
        .unwrap_err();
    assert!(matches!(err, ParseError::Mesh(_)), "{:?}", err);
    let message = err.to_string();
    assert!(message.starts_with("Mesh load/parse failed:"), "{}", message);
    assert!(message.contains("does_not_exist.obj"), "{}", message);
}

#[test]
fn missing_scene_file_is_an_io_error() {
    let err = test_parser()
        .load_scene_from_file(&data_path("no_such_scene.xml"))
        .unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }), "{:?}", err);
    assert!(err.to_string().contains("no_such_scene.xml"));
}

#[test]
fn bundled_example_scene() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let parser = SceneParser::new(root.join("assets/objects"));
    let scene = parser
        .load_scene_from_file(&root.join("scenes/example.xml"))
        .expect("example scene should parse");

    assert_eq!(scene.output_file_name(), "example.png");
    assert_eq!(scene.camera().res_horizontal(), 800);
    assert_eq!(scene.camera().res_vertical(), 600);
    assert_eq!(
        scene.ambient_light().map(|ambient| ambient.color),
        Some(Vec3f::new(0.2, 0.2, 0.2))
    );
    assert_eq!(scene.lights().len(), 2);
    assert!(matches!(scene.lights()[0], Light::Point(_)));
    match &scene.lights()[1] {
        Light::Parallel(light) => {
            assert!((light.direction().norm() - 1.0).abs() < 1e-9);
        }
        other => panic!("expected a parallel light, got {:?}", other),
    }

    assert_eq!(scene.surfaces().len(), 2);
    assert!(matches!(
        scene.surfaces()[0].shape,
        Shape3D::Sphere { radius, .. } if radius == 1.0
    ));
    assert_eq!(scene.surfaces()[1].material.phong.exponent, 20.0);
    assert_eq!(mesh_triangles(&scene, 1).len(), 12);
}
