//! The two index spaces used to address things in the scene.
//!
//! A render object is a sphere or a single triangle, as seen by picking. A
//! scene object is a sphere or a whole mesh, as seen by interaction code.

use crate::beacon::mesh::MeshList;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderIndex {
    Sphere(usize),
    Triangle(usize),
}

impl RenderIndex {
    /// Spheres come first in the raw space, triangles follow the live spheres.
    pub fn from_raw(raw: usize, num_spheres: usize) -> Self {
        if raw < num_spheres {
            RenderIndex::Sphere(raw)
        } else {
            RenderIndex::Triangle(raw - num_spheres)
        }
    }

    pub fn to_raw(self, num_spheres: usize) -> usize {
        match self {
            RenderIndex::Sphere(index) => index,
            RenderIndex::Triangle(index) => num_spheres + index,
        }
    }

    pub fn is_triangle(self) -> bool {
        matches!(self, RenderIndex::Triangle(_))
    }

    /// `None` for triangles no registered mesh owns.
    pub fn to_scene_index(self, meshes: &MeshList) -> Option<SceneIndex> {
        match self {
            RenderIndex::Sphere(index) => Some(SceneIndex::Sphere(index)),
            RenderIndex::Triangle(index) => meshes.mesh_of(index).map(SceneIndex::Mesh),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneIndex {
    Sphere(usize),
    Mesh(usize),
}

impl SceneIndex {
    /// Sphere slots take `[0, max_spheres)`, meshes follow by ordinal.
    pub fn from_raw(raw: usize, max_spheres: usize) -> Self {
        if raw < max_spheres {
            SceneIndex::Sphere(raw)
        } else {
            SceneIndex::Mesh(raw - max_spheres)
        }
    }

    pub fn to_raw(self, max_spheres: usize) -> usize {
        match self {
            SceneIndex::Sphere(index) => index,
            SceneIndex::Mesh(index) => max_spheres + index,
        }
    }

    /// A mesh is represented by its first triangle; `None` for unknown or empty meshes.
    pub fn to_render_index(self, meshes: &MeshList) -> Option<RenderIndex> {
        match self {
            SceneIndex::Sphere(index) => Some(RenderIndex::Sphere(index)),
            SceneIndex::Mesh(index) => meshes
                .get(index)
                .filter(|mesh| !mesh.is_empty())
                .map(|mesh| RenderIndex::Triangle(mesh.first_triangle())),
        }
    }
}
