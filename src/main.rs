use std::path::PathBuf;
use std::process::ExitCode;

use log::error;
use nalgebra::{Point3, Vector3, Vector4};

use beacon::beacon::scene::Material;
use beacon::beacon::{Scene, Settings};

fn main() -> ExitCode {
    env_logger::init();

    let settings = Settings {
        shader_path: Some(PathBuf::from("shaders/trace.wgsl")),
        mesh_paths: vec![PathBuf::from("meshes/ico_sphere.obj")],
        ..Default::default()
    };
    let mut scene = Scene::new(&settings);

    // Large red sphere up and to the right of the mesh
    let red = Material::new(Vector3::new(1.0, 0.0, 0.0), 0.0, Vector4::new(1.0, 1.0, 1.0, 0.0));
    if let Err(error) = scene.add_sphere(Point3::new(15.0, 15.0, 0.0), 20.0, red) {
        error!("{error}");
    }

    let material = Material::new(Vector3::new(1.0, 0.0, 1.0), 0.3, Vector4::zeros());
    for path in &settings.mesh_paths {
        // A failed load leaves the scene as it was, keep going without the mesh
        let index = match scene.load_mesh(path) {
            Ok(index) => index,
            Err(error) => {
                error!("Could not load mesh {}: {error}", path.display());
                continue;
            }
        };
        if let Some((buffer, mesh)) = scene.mesh_mut(index) {
            buffer.set_mesh_material(mesh, material);
            buffer.translate_mesh(mesh, &Vector3::new(0.0, 0.0, -3.0));
        }
    }

    match beacon::run(settings, scene) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("beacon: {error}");
            ExitCode::FAILURE
        }
    }
}
