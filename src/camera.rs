use nalgebra::{Point3, Unit, Vector2, Vector3};
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// Pinhole camera basis shared by picking and the tracing shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
}

impl Camera {
    /// Builds an orthonormal basis looking along `forward`, keeping `up` as close
    /// to the world up as possible.
    ///
    /// Looking straight along `world_up` falls back to another world axis for
    /// the basis, a zero `forward` looks down -Z.
    pub fn new(position: Point3<f32>, forward: Vector3<f32>, world_up: Vector3<f32>) -> Self {
        let direction = forward
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| Vector3::new(0.0, 0.0, -1.0));
        let right = [world_up, Vector3::z(), Vector3::x()]
            .iter()
            .find_map(|axis| direction.cross(axis).try_normalize(f32::EPSILON))
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&direction);

        Self {
            position,
            direction,
            up,
            right,
        }
    }

    /// `offset` is relative to the viewport centre and divided by its height.
    pub fn ray_direction(&self, offset: Vector2<f32>) -> Unit<Vector3<f32>> {
        Unit::new_normalize(self.direction + self.right * offset.x + self.up * offset.y)
    }
}

// Facing forward down -Z
impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            direction: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            right: Vector3::new(1.0, 0.0, 0.0),
        }
    }
}

/// Converts a window cursor position into the camera-relative offset used by
/// picking. Window y grows downwards, camera up does not.
pub fn screen_offset(cursor: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vector2<f32> {
    let height = size.height.max(1) as f32;
    let center = Vector2::new(size.width as f32 / 2.0, size.height as f32 / 2.0);

    let mut offset = (Vector2::new(cursor.x as f32, cursor.y as f32) - center) / height;
    offset.y = -offset.y;
    offset
}
