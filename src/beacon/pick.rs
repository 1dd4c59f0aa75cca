use log::debug;
use nalgebra::Vector2;

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::index::{RenderIndex, SceneIndex};
use crate::beacon::mesh::MeshList;
use crate::beacon::ray::Ray;

/// Finds the closest sphere or triangle under a screen offset.
///
/// Spheres are tested before triangles and a later primitive only wins when it
/// is strictly closer, so ties go to whatever was stored first.
pub fn index_at(buffer: &ObjectBuffer, offset: Vector2<f32>) -> Option<RenderIndex> {
    let ray = Ray {
        origin: buffer.camera.position,
        direction: buffer.camera.ray_direction(offset),
    };

    let spheres = buffer
        .spheres()
        .iter()
        .enumerate()
        .filter_map(|(index, sphere)| {
            ray.intersect_sphere(sphere)
                .map(|distance| (RenderIndex::Sphere(index), distance))
        });
    let triangles = buffer
        .triangles()
        .iter()
        .enumerate()
        .filter_map(|(index, triangle)| {
            ray.intersect_triangle(triangle)
                .map(|distance| (RenderIndex::Triangle(index), distance))
        });

    let mut closest: Option<(RenderIndex, f32)> = None;
    for (index, distance) in spheres.chain(triangles) {
        match closest {
            Some((_, previous)) if previous <= distance => {}
            _ => closest = Some((index, distance)),
        }
    }

    closest.map(|(index, _)| index)
}

/// Resolves a pick into the scene object space, `None` for misses and for
/// triangles no registered mesh owns.
pub fn get_selection(
    buffer: &ObjectBuffer,
    meshes: &MeshList,
    offset: Vector2<f32>,
) -> Option<SceneIndex> {
    let picked = index_at(buffer, offset)?;
    let selection = picked.to_scene_index(meshes);

    debug!("Picked {picked:?}, selected {selection:?}");
    selection
}
