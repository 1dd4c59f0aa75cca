use std::fs;
use std::path::PathBuf;

use nalgebra::{Point3, Vector2, Vector3, Vector4};
use tempfile::TempDir;

use beacon::beacon::geometry::compute_triangles;
use beacon::beacon::index::SceneIndex;
use beacon::beacon::pick::get_selection;
use beacon::beacon::scene::Material;
use beacon::beacon::{Scene, Settings};
use beacon::error::Error;

const QUAD: &str = "v -1 -1 -3\nv 1 -1 -3\nv 1 1 -3\nv -1 1 -3\nf 1 2 3\nf 1 3 4\n";

fn write_mesh(directory: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = directory.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn settings(max_spheres: usize, max_triangles: usize) -> Settings {
    Settings {
        max_spheres,
        max_triangles,
        ..Default::default()
    }
}

#[test]
fn picking_resolves_to_the_quad_mesh() {
    let directory = tempfile::tempdir().unwrap();
    let quad = write_mesh(&directory, "quad.obj", QUAD);

    let mut scene = Scene::new(&settings(2, 30));
    let red = Material::new(Vector3::new(1.0, 0.0, 0.0), 0.0, Vector4::new(1.0, 1.0, 1.0, 0.0));
    scene
        .add_sphere(Point3::new(15.0, 15.0, 0.0), 20.0, red)
        .unwrap();
    let mesh = scene.load_mesh(&quad).unwrap();
    assert_eq!(mesh, SceneIndex::Mesh(0));
    compute_triangles(&mut scene.buffer);

    let max_spheres = scene.buffer.max_spheres();
    let at_quad = get_selection(&scene.buffer, &scene.meshes, Vector2::new(0.1, -0.05));
    assert_eq!(at_quad.map(|index| index.to_raw(max_spheres)), Some(max_spheres));

    let at_nothing = get_selection(&scene.buffer, &scene.meshes, Vector2::new(0.0, -0.9));
    assert_eq!(at_nothing, None);
}

#[test]
fn overflowing_mesh_leaves_triangle_count_alone() {
    let directory = tempfile::tempdir().unwrap();
    let quad = write_mesh(&directory, "quad.obj", QUAD);
    let mut big = String::new();
    for i in 0..12 {
        big.push_str(&format!("v {i} 0 0\n"));
    }
    for i in 1..=10 {
        big.push_str(&format!("f {} {} {}\n", i, i + 1, i + 2));
    }
    let big = write_mesh(&directory, "big.obj", &big);

    let mut scene = Scene::new(&settings(1, 10));
    scene.load_mesh(&quad).unwrap();
    let before = scene.buffer.num_triangles();

    // vertex count already goes past the bound while parsing
    let result = scene.load_mesh(&big);
    assert!(matches!(result, Err(Error::MeshTooLarge { max: 10 })));
    assert_eq!(scene.buffer.num_triangles(), before);
    assert_eq!(scene.meshes.len(), 1);
}

#[test]
fn mesh_that_fits_parsing_but_not_the_buffer_rolls_back() {
    let directory = tempfile::tempdir().unwrap();
    let quad = write_mesh(&directory, "quad.obj", QUAD);

    let mut scene = Scene::new(&settings(1, 5));
    scene.load_mesh(&quad).unwrap();
    scene.load_mesh(&quad).unwrap();

    let result = scene.load_mesh(&quad);
    assert!(matches!(result, Err(Error::TooManyTriangles { max: 5 })));
    assert_eq!(scene.buffer.num_triangles(), 4);
    assert_eq!(scene.meshes.len(), 2);
}

#[test]
fn registered_mesh_ranges_never_overlap() {
    let directory = tempfile::tempdir().unwrap();
    let quad = write_mesh(&directory, "quad.obj", QUAD);

    let mut scene = Scene::new(&settings(1, 20));
    for _ in 0..4 {
        scene.load_mesh(&quad).unwrap();
    }

    let meshes: Vec<_> = scene.meshes.iter().collect();
    for (i, a) in meshes.iter().enumerate() {
        for b in &meshes[i + 1..] {
            let last = a.last_triangle().unwrap();
            assert!(last < b.first_triangle() || b.last_triangle().unwrap() < a.first_triangle());
        }
    }
}

#[test]
fn moved_mesh_is_picked_at_its_new_place() {
    let directory = tempfile::tempdir().unwrap();
    let quad = write_mesh(&directory, "quad.obj", QUAD);

    let mut scene = Scene::new(&settings(1, 10));
    let mesh = scene.load_mesh(&quad).unwrap();
    scene.translate_object(mesh, &Vector3::new(3.0, 0.0, 0.0));
    compute_triangles(&mut scene.buffer);

    assert_eq!(scene.selection(Vector2::zeros()), None);
    assert_eq!(scene.selection(Vector2::new(1.0, -0.05)), Some(mesh));
}

#[test]
fn demo_mesh_fits_the_default_capacity() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("meshes/ico_sphere.obj");

    let mut scene = Scene::new(&Settings::default());
    let mesh = scene.load_mesh(&path).unwrap();
    assert_eq!(scene.buffer.num_triangles(), scene.buffer.max_triangles());

    let (buffer, loaded) = scene.mesh_mut(mesh).unwrap();
    buffer.translate_mesh(loaded, &Vector3::new(0.0, 0.0, -3.0));
    compute_triangles(&mut scene.buffer);

    assert_eq!(scene.selection(Vector2::new(0.05, 0.0)), Some(mesh));
}
