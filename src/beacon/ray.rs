use nalgebra::{Point3, Unit, Vector3};

use crate::beacon::scene::{Sphere, Triangle};

// Rays hitting a triangle from behind or nearly edge-on are ignored
const TRIANGLE_EPSILON: f32 = 0.0001;

pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    /// Distance to the nearest intersection in front of the origin.
    pub fn intersect_sphere(&self, sphere: &Sphere) -> Option<f32> {
        // |o + t*d - c|^2 = r^2, solved with the sphere moved to the origin
        let origin = self.origin - sphere.center;
        let direction = self.direction.into_inner();

        let first = direction.magnitude_squared();
        let second = 2.0 * origin.dot(&direction);
        let third = origin.magnitude_squared() - sphere.radius.powi(2);

        let discriminant = second.powi(2) - 4.0 * first * third;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = (-second - root) / (2.0 * first);
        let far = (-second + root) / (2.0 * first);

        [near, far].into_iter().find(|distance| *distance > 0.0)
    }

    /// Möller–Trumbore against the cached edges, so the triangle has to be recomputed.
    pub fn intersect_triangle(&self, triangle: &Triangle) -> Option<f32> {
        let direction = self.direction.into_inner();

        let pvec = direction.cross(&triangle.edge2);
        let determinant = triangle.edge1.dot(&pvec);
        if determinant < TRIANGLE_EPSILON {
            return None;
        }
        let inverse = 1.0 / determinant;

        let tvec = self.origin - triangle.v0;
        let u = tvec.dot(&pvec) * inverse;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&triangle.edge1);
        let v = direction.dot(&qvec) * inverse;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let distance = triangle.edge2.dot(&qvec) * inverse;
        (distance > 0.0).then_some(distance)
    }
}
