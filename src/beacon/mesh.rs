use std::ops::Range;

use log::warn;
use nalgebra::Point3;

use crate::error::{Error, Result};

/// A named, transformable slice of the triangle array.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub triangles: Range<usize>,
    pub was_loaded: bool,
    /// Pivot of the mesh, follows every transform applied to it.
    pub center: Point3<f32>,
}

impl Mesh {
    pub fn first_triangle(&self) -> usize {
        self.triangles.start
    }

    /// Inclusive upper end of the range, `None` when the mesh holds nothing.
    pub fn last_triangle(&self) -> Option<usize> {
        (!self.triangles.is_empty()).then(|| self.triangles.end - 1)
    }

    pub fn contains(&self, triangle: usize) -> bool {
        self.was_loaded && self.triangles.contains(&triangle)
    }

    pub fn is_empty(&self) -> bool {
        !self.was_loaded || self.triangles.is_empty()
    }

    fn overlaps(&self, other: &Mesh) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.triangles.start < other.triangles.end
            && other.triangles.start < self.triangles.end
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            triangles: 0..0,
            was_loaded: false,
            center: Point3::origin(),
        }
    }
}

/// The list of meshes the host registered, addressed by ordinal.
#[derive(Clone, Debug, Default)]
pub struct MeshList {
    meshes: Vec<Mesh>,
}

impl MeshList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a loaded mesh and returns its ordinal.
    pub fn register(&mut self, mesh: Mesh) -> Result<usize> {
        if self.meshes.iter().any(|other| other.overlaps(&mesh)) {
            let first = mesh.first_triangle();
            let last = mesh.last_triangle().unwrap_or(first);
            warn!("Refusing to register mesh {first}..={last}, it overlaps another mesh");
            return Err(Error::OverlappingMesh { first, last });
        }

        self.meshes.push(mesh);
        Ok(self.meshes.len() - 1)
    }

    /// First mesh whose range holds the given triangle.
    pub fn mesh_of(&self, triangle: usize) -> Option<usize> {
        self.meshes.iter().position(|mesh| mesh.contains(triangle))
    }

    pub fn get(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter()
    }
}
