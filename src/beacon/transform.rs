use log::{debug, warn};
use nalgebra::{Point3, Rotation3, Unit, Vector3, Vector4};

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::index::SceneIndex;
use crate::beacon::mesh::{Mesh, MeshList};
use crate::beacon::scene::{Material, Triangle};

// Only vertex positions are touched here. The edge/normal cache is stale until
// the next `compute_triangles`.
impl ObjectBuffer {
    fn mesh_triangles(&mut self, mesh: &Mesh) -> &mut [Triangle] {
        if mesh.is_empty() {
            return &mut [];
        }

        let live = self.num_triangles();
        let range = mesh.triangles.start.min(live)..mesh.triangles.end.min(live);
        &mut self.triangles_mut()[range]
    }

    fn map_mesh_vertices(&mut self, mesh: &Mesh, f: impl Fn(Point3<f32>) -> Point3<f32>) {
        for triangle in self.mesh_triangles(mesh) {
            for vertex in triangle.vertices_mut() {
                *vertex = f(*vertex);
            }
        }
    }

    pub fn translate_mesh(&mut self, mesh: &mut Mesh, translation: &Vector3<f32>) {
        if !mesh.was_loaded {
            return;
        }

        self.map_mesh_vertices(mesh, |vertex| vertex + translation);
        mesh.center += translation;
    }

    /// Rotates around `axis` through `pivot`.
    pub fn rotate_mesh(
        &mut self,
        mesh: &mut Mesh,
        angle: f32,
        axis: &Vector3<f32>,
        pivot: &Point3<f32>,
    ) {
        if !mesh.was_loaded {
            return;
        }

        let Some(axis) = Unit::try_new(*axis, f32::EPSILON) else {
            warn!("Ignoring rotation around a zero-length axis");
            return;
        };
        let rotation = Rotation3::from_axis_angle(&axis, angle);
        let rotate = |point: Point3<f32>| pivot + rotation * (point - pivot);

        self.map_mesh_vertices(mesh, rotate);
        mesh.center = rotate(mesh.center);
    }

    /// Component-wise scale about `pivot`.
    pub fn scale_mesh(&mut self, mesh: &mut Mesh, scale: &Vector3<f32>, pivot: &Point3<f32>) {
        if !mesh.was_loaded {
            return;
        }

        let apply = |point: Point3<f32>| pivot + (point - pivot).component_mul(scale);

        self.map_mesh_vertices(mesh, apply);
        mesh.center = apply(mesh.center);
    }

    pub fn set_mesh_material(&mut self, mesh: &Mesh, material: Material) {
        for triangle in self.mesh_triangles(mesh) {
            triangle.material = material;
        }
    }

    pub fn set_mesh_color(&mut self, mesh: &Mesh, color: Vector3<f32>) {
        for triangle in self.mesh_triangles(mesh) {
            triangle.material.color = color;
        }
    }

    pub fn set_mesh_smoothness(&mut self, mesh: &Mesh, smoothness: f32) {
        for triangle in self.mesh_triangles(mesh) {
            triangle.material.smoothness = smoothness;
        }
    }

    pub fn set_mesh_emission(&mut self, mesh: &Mesh, emission: Vector4<f32>) {
        for triangle in self.mesh_triangles(mesh) {
            triangle.material.emission = emission;
        }
    }

    pub fn translate_object(
        &mut self,
        meshes: &mut MeshList,
        index: SceneIndex,
        translation: &Vector3<f32>,
    ) {
        match index {
            SceneIndex::Sphere(sphere) => {
                if let Some(sphere) = self.spheres_mut().get_mut(sphere) {
                    sphere.center += translation;
                }
            }
            SceneIndex::Mesh(mesh) => match meshes.get_mut(mesh) {
                Some(mesh) => self.translate_mesh(mesh, translation),
                None => debug!("No mesh {mesh} to translate"),
            },
        }
    }

    pub fn set_object_color(&mut self, meshes: &MeshList, index: SceneIndex, color: Vector3<f32>) {
        match index {
            SceneIndex::Sphere(sphere) => {
                if let Some(sphere) = self.spheres_mut().get_mut(sphere) {
                    sphere.material.color = color;
                }
            }
            SceneIndex::Mesh(mesh) => {
                if let Some(mesh) = meshes.get(mesh) {
                    self.set_mesh_color(mesh, color);
                }
            }
        }
    }

    pub fn set_object_material(&mut self, meshes: &MeshList, index: SceneIndex, material: Material) {
        match index {
            SceneIndex::Sphere(sphere) => {
                if let Some(sphere) = self.spheres_mut().get_mut(sphere) {
                    sphere.material = material;
                }
            }
            SceneIndex::Mesh(mesh) => {
                if let Some(mesh) = meshes.get(mesh) {
                    self.set_mesh_material(mesh, material);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, TAU};

    use super::*;
    use crate::beacon::obj::{append_mesh, MeshData};

    fn close(a: &Point3<f32>, b: &Point3<f32>) -> bool {
        (a - b).norm() < 1e-4
    }

    fn vertices(buffer: &ObjectBuffer) -> Vec<Point3<f32>> {
        buffer
            .triangles()
            .iter()
            .flat_map(|triangle| [triangle.v0, triangle.v1, triangle.v2])
            .collect()
    }

    fn quad() -> (ObjectBuffer, Mesh) {
        let data = MeshData {
            vertices: vec![
                Point3::new(-1.0, -1.0, 0.0),
                Point3::new(1.0, -1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(-1.0, 1.0, 0.0),
            ],
            faces: vec![[0, 1, 2], [0, 2, 3]],
        };
        let mut buffer = ObjectBuffer::with_capacity(1, 4);
        let mut mesh = Mesh::default();
        append_mesh(&mut buffer, &data, &mut mesh).unwrap();
        (buffer, mesh)
    }

    #[test]
    fn translate_round_trip() {
        let (mut buffer, mut mesh) = quad();
        let before = vertices(&buffer);
        let t = Vector3::new(0.3, -2.5, 7.0);

        buffer.translate_mesh(&mut mesh, &t);
        assert!(close(&mesh.center, &Point3::from(t)));
        assert!(close(&buffer.triangles()[0].v0, &(before[0] + t)));

        buffer.translate_mesh(&mut mesh, &-t);
        for (after, before) in vertices(&buffer).iter().zip(&before) {
            assert!(close(after, before));
        }
        assert!(close(&mesh.center, &Point3::origin()));
    }

    #[test]
    fn zero_and_full_turn_rotations_change_nothing() {
        let (mut buffer, mut mesh) = quad();
        let before = vertices(&buffer);
        let pivot = Point3::new(2.0, -1.0, 5.0);

        buffer.rotate_mesh(&mut mesh, 0.0, &Vector3::new(1.0, 2.0, 3.0), &pivot);
        buffer.rotate_mesh(&mut mesh, TAU, &Vector3::y(), &pivot);

        for (after, before) in vertices(&buffer).iter().zip(&before) {
            assert!(close(after, before));
        }
        assert!(close(&mesh.center, &Point3::origin()));
    }

    #[test]
    fn quarter_turn_about_pivot() {
        let (mut buffer, mut mesh) = quad();
        let pivot = Point3::new(0.0, 0.0, -3.0);

        buffer.rotate_mesh(&mut mesh, FRAC_PI_2, &Vector3::y(), &pivot);

        // origin sits 3 units in front of the pivot, a quarter turn around +Y moves it to +X
        assert!(close(&mesh.center, &Point3::new(3.0, 0.0, -3.0)));
        assert!(close(&buffer.triangles()[0].v0, &Point3::new(3.0, -1.0, -2.0)));
    }

    #[test]
    fn scale_about_pivot() {
        let (mut buffer, mut mesh) = quad();
        let pivot = Point3::new(1.0, 1.0, 0.0);

        buffer.scale_mesh(&mut mesh, &Vector3::new(2.0, 3.0, 1.0), &pivot);

        assert!(close(&buffer.triangles()[0].v0, &Point3::new(-3.0, -5.0, 0.0)));
        assert!(close(&buffer.triangles()[0].v2, &Point3::new(1.0, 1.0, 0.0)));
        assert!(close(&mesh.center, &Point3::new(-1.0, -2.0, 0.0)));
    }

    #[test]
    fn unloaded_mesh_is_left_alone() {
        let (mut buffer, mut mesh) = quad();
        mesh.was_loaded = false;
        let before = buffer.clone();

        buffer.translate_mesh(&mut mesh, &Vector3::new(1.0, 1.0, 1.0));
        buffer.rotate_mesh(&mut mesh, 1.0, &Vector3::x(), &Point3::origin());
        buffer.scale_mesh(&mut mesh, &Vector3::new(2.0, 2.0, 2.0), &Point3::origin());
        buffer.set_mesh_color(&mesh, Vector3::new(1.0, 0.0, 0.0));

        assert_eq!(buffer, before);
        assert_eq!(mesh.center, Point3::origin());
    }

    #[test]
    fn material_setters_cover_the_whole_range() {
        let (mut buffer, mesh) = quad();
        let red = Vector3::new(1.0, 0.0, 0.0);

        buffer.set_mesh_color(&mesh, red);
        buffer.set_mesh_smoothness(&mesh, 0.5);
        buffer.set_mesh_emission(&mesh, Vector4::new(1.0, 1.0, 1.0, 2.0));

        for triangle in buffer.triangles() {
            assert_eq!(triangle.material.color, red);
            assert_eq!(triangle.material.smoothness, 0.5);
            assert_eq!(triangle.material.emission.w, 2.0);
        }

        buffer.set_mesh_material(&mesh, Material::default());
        assert!(buffer
            .triangles()
            .iter()
            .all(|triangle| triangle.material == Material::default()));
    }

    #[test]
    fn object_operations_dispatch_on_scene_index() {
        let (mut buffer, mesh) = quad();
        buffer
            .create_sphere(Point3::origin(), 1.0, Material::default())
            .unwrap();
        let mut meshes = MeshList::new();
        meshes.register(mesh).unwrap();

        let step = Vector3::new(0.0, 0.1, 0.0);
        buffer.translate_object(&mut meshes, SceneIndex::Sphere(0), &step);
        assert_eq!(buffer.spheres()[0].center, Point3::from(step));

        buffer.translate_object(&mut meshes, SceneIndex::Mesh(0), &step);
        assert!(close(&meshes.get(0).unwrap().center, &Point3::from(step)));

        let green = Vector3::new(0.0, 1.0, 0.0);
        buffer.set_object_color(&meshes, SceneIndex::Mesh(0), green);
        buffer.set_object_color(&meshes, SceneIndex::Sphere(0), green);
        assert_eq!(buffer.spheres()[0].material.color, green);
        assert!(buffer
            .triangles()
            .iter()
            .all(|triangle| triangle.material.color == green));

        let glowing = Material::new(green, 0.9, Vector4::new(1.0, 1.0, 1.0, 3.0));
        buffer.set_object_material(&meshes, SceneIndex::Sphere(0), glowing);
        buffer.set_object_material(&meshes, SceneIndex::Mesh(0), glowing);
        assert_eq!(buffer.spheres()[0].material, glowing);
        assert_eq!(buffer.triangles()[1].material, glowing);

        // missing targets are ignored
        buffer.translate_object(&mut meshes, SceneIndex::Mesh(7), &step);
        buffer.set_object_color(&meshes, SceneIndex::Sphere(5), green);
    }
}
