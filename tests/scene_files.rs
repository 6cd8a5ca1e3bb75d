use std::fs;
use std::path::{Path, PathBuf};

use meshtracer::camera::Camera;
use meshtracer::config::RenderConfig;
use meshtracer::light::{Light, LightShape};
use meshtracer::scenes::SceneDescription;
use meshtracer::session::{RenderMode, Session};
use meshtracer::types::color::{Color, ColorOps};
use meshtracer::Error;
use nalgebra::{Point3, Vector3};

const FLOOR_OBJ: &str = "mtllib floor.mtl
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
usemtl red
f 1 4 3
f 1 3 2
";

const FLOOR_MTL: &str = "newmtl red
Ka 0.1 0 0
Kd 0.8 0.1 0.1
Ks 0 0 0
";

fn write_floor(dir: &Path) -> PathBuf {
    fs::write(dir.join("floor.mtl"), FLOOR_MTL).unwrap();
    let path = dir.join("floor.obj");
    fs::write(&path, FLOOR_OBJ).unwrap();
    path
}

fn overhead_light() -> Light {
    Light::new(
        Point3::new(0.0, 1.0, 0.0),
        -Vector3::y(),
        Color::gray(4.0),
        0.25,
        LightShape::Quad,
    )
}

fn config() -> RenderConfig {
    RenderConfig {
        width: 16,
        height: 12,
        ..Default::default()
    }
}

#[test]
fn imports_materials_from_the_mtl_library() {
    let dir = tempfile::tempdir().unwrap();
    let obj = write_floor(dir.path());

    let mut session = Session::new(config());
    session.load_model(&obj).unwrap();
    let model = session.model();
    assert_eq!(model.triangles().len(), 2);
    assert_eq!(model.material_of(0).name, "red");
    assert_eq!(model.material_of(1).diffuse, Color::new(0.8, 0.1, 0.1));
    assert_eq!(model.mesh_descriptors().len(), 1);
}

#[test]
fn scene_file_round_trip_restores_the_view() {
    let dir = tempfile::tempdir().unwrap();
    let obj = write_floor(dir.path());

    let mut session = Session::new(config());
    session.load_model(&obj).unwrap();
    session.set_light(overhead_light());
    session.set_camera(Camera::look_at(
        Point3::new(0.0, 1.5, 2.0),
        Point3::new(0.2, 0.0, -0.3),
        50.0,
    ));
    let scene_path = dir.path().join("view.scene");
    session.save_scene_file(&scene_path).unwrap();

    let mut restored = Session::new(config());
    restored.load_scene_file(&scene_path).unwrap();
    assert_eq!(restored.light(), session.light());
    assert_eq!(restored.camera(), session.camera());
    assert_eq!(restored.model().triangles().len(), 2);

    restored.set_render_mode(RenderMode::RayTrace);
    restored.render_frame();
    let center = restored.canvas().pixel(8, 6);
    assert!(center.get_r() > center.get_g());
    assert!(center.max_channel() > 0.0);
}

#[test]
fn relative_model_paths_resolve_next_to_the_scene_file() {
    let dir = tempfile::tempdir().unwrap();
    write_floor(dir.path());
    let scene = SceneDescription {
        model_path: PathBuf::from("floor.obj"),
        light: overhead_light(),
        camera: Camera::default(),
    };
    let scene_path = dir.path().join("relative.scene");
    scene.save(&scene_path).unwrap();

    let mut session = Session::new(config());
    session.load_scene_file(&scene_path).unwrap();
    assert_eq!(session.model().triangles().len(), 2);
    assert_eq!(SceneDescription::load(&scene_path).unwrap(), scene);
}

#[test]
fn scene_saved_into_another_directory_still_finds_its_model() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    write_floor(a.path());
    let original = SceneDescription {
        model_path: PathBuf::from("floor.obj"),
        light: overhead_light(),
        camera: Camera::default(),
    };
    let first = a.path().join("first.scene");
    original.save(&first).unwrap();

    let mut session = Session::new(config());
    session.load_scene_file(&first).unwrap();
    let copy = b.path().join("copy.scene");
    session.save_scene_file(&copy).unwrap();

    let saved = SceneDescription::load(&copy).unwrap();
    assert!(saved.model_path.is_absolute());
    assert_eq!(saved.light, original.light);

    let mut reloaded = Session::new(config());
    reloaded.load_scene_file(&copy).unwrap();
    assert_eq!(reloaded.model().triangles().len(), 2);
    assert_eq!(reloaded.camera(), session.camera());
}

#[test]
fn broken_scene_file_leaves_the_session_alone() {
    let dir = tempfile::tempdir().unwrap();
    let obj = write_floor(dir.path());
    let mut session = Session::new(config());
    session.load_model(&obj).unwrap();
    let camera = *session.camera();

    let bad_light = dir.path().join("bad.scene");
    fs::write(&bad_light, "floor.obj\nlight 0 1 0\ncamera 0 0 5 0 0 45\n").unwrap();
    assert!(matches!(
        session.load_scene_file(&bad_light),
        Err(Error::MalformedScene { line: 2, .. })
    ));

    let missing_model = dir.path().join("missing.scene");
    fs::write(
        &missing_model,
        "gone.obj\nlight 0 1 0 0 -1 0 1 1 1 0.5 disk 1\ncamera 0 0 5 0 0 45\n",
    )
    .unwrap();
    assert!(matches!(
        session.load_scene_file(&missing_model),
        Err(Error::Unreadable { .. })
    ));

    assert!(matches!(
        session.load_scene_file(&dir.path().join("nope.scene")),
        Err(Error::Io { .. })
    ));

    assert_eq!(session.model().triangles().len(), 2);
    assert_eq!(*session.camera(), camera);
    assert!(!session.light().is_active());
}
