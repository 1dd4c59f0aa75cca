use nalgebra::{Point3, Vector3, Vector4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Vector3<f32>,
    pub smoothness: f32,
    // rgb + intensity
    pub emission: Vector4<f32>,
}

impl Material {
    pub fn new(color: Vector3<f32>, smoothness: f32, emission: Vector4<f32>) -> Self {
        Self {
            color,
            smoothness,
            emission,
        }
    }
}

// Neutral white, not reflective, not emitting
impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vector3::new(1.0, 1.0, 1.0),
            smoothness: 0.0,
            emission: Vector4::zeros(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
    pub material: Material,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: 1.0,
            material: Material::default(),
        }
    }
}

/// A single triangle of the flat triangle array.
///
/// `v0`, `v1` and `v2` are authoritative. `edge1`, `edge2` and `normal` are a
/// cache that is only valid right after [`Triangle::recompute`] ran, see
/// [`crate::beacon::geometry::compute_triangles`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f32>,
    pub v1: Point3<f32>,
    pub v2: Point3<f32>,

    pub edge1: Vector3<f32>,
    pub edge2: Vector3<f32>,
    pub normal: Vector3<f32>,

    pub material: Material,
}

impl Triangle {
    /// Derived fields stay zeroed until the next recomputation pass.
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>, material: Material) -> Self {
        Self {
            v0,
            v1,
            v2,
            edge1: Vector3::zeros(),
            edge2: Vector3::zeros(),
            normal: Vector3::zeros(),
            material,
        }
    }

    pub fn vertices_mut(&mut self) -> [&mut Point3<f32>; 3] {
        [&mut self.v0, &mut self.v1, &mut self.v2]
    }

    pub fn recompute(&mut self) {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        self.edge1 = edge1;
        self.edge2 = edge2;
        // degenerate triangles get a zero normal instead of NaN
        self.normal = edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
    }
}
