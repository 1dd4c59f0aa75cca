use std::ops::{Deref, DerefMut};

use log::error;
use nalgebra::{Point3, Vector2};

use crate::beacon::scene::{Material, Sphere, Triangle};
use crate::beacon::Settings;
use crate::camera::Camera;
use crate::error::{Error, Result};

/// A sequence that never grows past the capacity it was built with.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounded<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Bounded<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `item` and returns its index, or hands it back when full.
    pub fn try_push(&mut self, item: T) -> std::result::Result<usize, T> {
        if self.is_full() {
            return Err(item);
        }

        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

impl<T> Deref for Bounded<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for Bounded<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}

/// Every renderable primitive plus the camera and render parameters.
///
/// Only the live spheres and triangles are stored; [`crate::beacon::gpu::encode`]
/// pads both arrays out to their capacity when the buffer is uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectBuffer {
    pub resolution: Vector2<f32>,

    pub max_bounces: u32,
    pub num_samples: u32,
    pub jitter_strength: f32,

    pub camera: Camera,

    spheres: Bounded<Sphere>,
    triangles: Bounded<Triangle>,
}

impl ObjectBuffer {
    pub fn new(settings: &Settings) -> Self {
        let mut buffer = Self::with_capacity(settings.max_spheres, settings.max_triangles);
        buffer.resolution = Vector2::new(
            settings.window_size.width as f32,
            settings.window_size.height as f32,
        );
        buffer.max_bounces = settings.max_bounces;
        buffer.num_samples = settings.num_samples;
        buffer.jitter_strength = settings.jitter_strength;
        buffer
    }

    pub fn with_capacity(max_spheres: usize, max_triangles: usize) -> Self {
        let defaults = Settings::default();

        Self {
            resolution: Vector2::new(
                defaults.window_size.width as f32,
                defaults.window_size.height as f32,
            ),
            max_bounces: defaults.max_bounces,
            num_samples: defaults.num_samples,
            jitter_strength: defaults.jitter_strength,
            camera: Camera::default(),
            spheres: Bounded::with_capacity(max_spheres),
            triangles: Bounded::with_capacity(max_triangles),
        }
    }

    pub fn create_sphere(
        &mut self,
        center: Point3<f32>,
        radius: f32,
        material: Material,
    ) -> Result<usize> {
        let sphere = Sphere {
            center,
            radius,
            material,
        };

        self.spheres.try_push(sphere).map_err(|_| {
            let max = self.spheres.capacity();
            error!("Too many spheres! Maximum is {max}");
            Error::TooManySpheres { max }
        })
    }

    /// Derived fields are left for [`crate::beacon::geometry::compute_triangles`].
    pub fn create_triangle(
        &mut self,
        v0: Point3<f32>,
        v1: Point3<f32>,
        v2: Point3<f32>,
        material: Material,
    ) -> Result<usize> {
        let triangle = Triangle::new(v0, v1, v2, material);

        self.triangles.try_push(triangle).map_err(|_| {
            let max = self.triangles.capacity();
            error!("Too many triangles! Maximum is {max}");
            Error::TooManyTriangles { max }
        })
    }

    pub fn set_sphere_radius(&mut self, index: usize, radius: f32) {
        if let Some(sphere) = self.spheres.get_mut(index) {
            sphere.radius = radius;
        }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn spheres_mut(&mut self) -> &mut [Sphere] {
        &mut self.spheres
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangles_mut(&mut self) -> &mut [Triangle] {
        &mut self.triangles
    }

    pub fn num_spheres(&self) -> usize {
        self.spheres.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn max_spheres(&self) -> usize {
        self.spheres.capacity()
    }

    pub fn max_triangles(&self) -> usize {
        self.triangles.capacity()
    }

    /// Rolls the triangle count back, used when an ingestion fails halfway.
    pub(crate) fn truncate_triangles(&mut self, len: usize) {
        self.triangles.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_rejects_past_capacity() {
        let mut bounded = Bounded::with_capacity(2);
        assert_eq!(bounded.try_push(1), Ok(0));
        assert_eq!(bounded.try_push(2), Ok(1));
        assert_eq!(bounded.try_push(3), Err(3));
        assert_eq!(&*bounded, &[1, 2]);

        bounded.truncate(1);
        assert_eq!(bounded.try_push(4), Ok(1));
    }

    #[test]
    fn sphere_at_capacity_leaves_count_unchanged() {
        let mut buffer = ObjectBuffer::with_capacity(1, 0);
        let material = Material::default();

        assert_eq!(
            buffer.create_sphere(Point3::origin(), 1.0, material).ok(),
            Some(0)
        );
        let overflow = buffer.create_sphere(Point3::new(1.0, 0.0, 0.0), 1.0, material);

        assert!(matches!(overflow, Err(Error::TooManySpheres { max: 1 })));
        assert_eq!(buffer.num_spheres(), 1);
        assert_eq!(buffer.spheres()[0].center, Point3::origin());
    }

    #[test]
    fn radius_setter_ignores_dead_slots() {
        let mut buffer = ObjectBuffer::with_capacity(2, 0);
        buffer
            .create_sphere(Point3::origin(), 1.0, Material::default())
            .unwrap();

        buffer.set_sphere_radius(0, 4.0);
        buffer.set_sphere_radius(1, 9.0);

        assert_eq!(buffer.spheres()[0].radius, 4.0);
        assert_eq!(buffer.num_spheres(), 1);
    }

    #[test]
    fn counts_never_exceed_capacity() {
        let mut buffer = ObjectBuffer::with_capacity(3, 5);
        let material = Material::default();

        for i in 0..10 {
            let offset = i as f32;
            let _ = buffer.create_sphere(Point3::new(offset, 0.0, 0.0), 1.0, material);
            let _ = buffer.create_triangle(
                Point3::new(offset, 0.0, 0.0),
                Point3::new(offset + 1.0, 0.0, 0.0),
                Point3::new(offset, 1.0, 0.0),
                material,
            );
            assert!(buffer.num_spheres() <= buffer.max_spheres());
            assert!(buffer.num_triangles() <= buffer.max_triangles());
        }

        assert_eq!(buffer.num_spheres(), 3);
        assert_eq!(buffer.num_triangles(), 5);
        assert!(matches!(
            buffer.create_triangle(Point3::origin(), Point3::origin(), Point3::origin(), material),
            Err(Error::TooManyTriangles { max: 5 })
        ));
    }

    #[test]
    fn new_buffer_takes_render_parameters_from_settings() {
        let settings = Settings {
            max_spheres: 4,
            max_triangles: 8,
            max_bounces: 3,
            num_samples: 7,
            ..Default::default()
        };
        let buffer = ObjectBuffer::new(&settings);

        assert_eq!(buffer.max_spheres(), 4);
        assert_eq!(buffer.max_triangles(), 8);
        assert_eq!(buffer.max_bounces, 3);
        assert_eq!(buffer.num_samples, 7);
        assert_eq!(buffer.num_spheres(), 0);
        assert_eq!(buffer.num_triangles(), 0);
    }
}
