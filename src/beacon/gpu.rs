//! Uniform block layout shared with the tracing shader.
//!
//! Every 3-component vector is followed by one float of padding so that the
//! structs line up with std140. The order is header, camera, `max_spheres`
//! sphere slots, then `max_triangles` triangle slots. Slots past the live
//! counts are zeroed.

use std::mem::size_of;

use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{
    BindGroupEntry, BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, BufferUsages,
    Device, Queue, ShaderStages,
};

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::scene::{Material, Sphere, Triangle};
use crate::camera::Camera;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuMaterial {
    pub color: [f32; 3],
    pub smoothness: f32,
    pub emission: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuSphere {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: GpuMaterial,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuTriangle {
    pub v0: [f32; 3],
    pub pad0: f32,
    pub v1: [f32; 3],
    pub pad1: f32,
    pub v2: [f32; 3],
    pub pad2: f32,
    pub edge1: [f32; 3],
    pub pad3: f32,
    pub edge2: [f32; 3],
    pub pad4: f32,
    pub normal: [f32; 3],
    pub pad5: f32,
    pub material: GpuMaterial,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuCamera {
    pub position: [f32; 3],
    pub pad0: f32,
    pub direction: [f32; 3],
    pub pad1: f32,
    pub up: [f32; 3],
    pub pad2: f32,
    pub right: [f32; 3],
    pub pad3: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuHeader {
    pub resolution: [f32; 2],
    pub num_spheres: i32,
    pub num_triangles: i32,
    pub max_bounces: i32,
    pub num_samples: i32,
    pub jitter_strength: f32,
    pub pad0: f32,
}

impl From<&Material> for GpuMaterial {
    fn from(material: &Material) -> Self {
        Self {
            color: material.color.into(),
            smoothness: material.smoothness,
            emission: material.emission.into(),
        }
    }
}

impl From<&Sphere> for GpuSphere {
    fn from(sphere: &Sphere) -> Self {
        Self {
            center: sphere.center.coords.into(),
            radius: sphere.radius,
            material: (&sphere.material).into(),
        }
    }
}

impl From<&Triangle> for GpuTriangle {
    fn from(triangle: &Triangle) -> Self {
        Self {
            v0: triangle.v0.coords.into(),
            v1: triangle.v1.coords.into(),
            v2: triangle.v2.coords.into(),
            edge1: triangle.edge1.into(),
            edge2: triangle.edge2.into(),
            normal: triangle.normal.into(),
            material: (&triangle.material).into(),
            ..Default::default()
        }
    }
}

impl From<&Camera> for GpuCamera {
    fn from(camera: &Camera) -> Self {
        Self {
            position: camera.position.coords.into(),
            direction: camera.direction.into(),
            up: camera.up.into(),
            right: camera.right.into(),
            ..Default::default()
        }
    }
}

pub fn encoded_size(max_spheres: usize, max_triangles: usize) -> usize {
    size_of::<GpuHeader>()
        + size_of::<GpuCamera>()
        + max_spheres * size_of::<GpuSphere>()
        + max_triangles * size_of::<GpuTriangle>()
}

pub fn encode(buffer: &ObjectBuffer) -> Vec<u8> {
    let header = GpuHeader {
        resolution: buffer.resolution.into(),
        num_spheres: buffer.num_spheres() as i32,
        num_triangles: buffer.num_triangles() as i32,
        max_bounces: buffer.max_bounces as i32,
        num_samples: buffer.num_samples as i32,
        jitter_strength: buffer.jitter_strength,
        pad0: 0.0,
    };
    let camera = GpuCamera::from(&buffer.camera);

    let mut spheres = vec![GpuSphere::zeroed(); buffer.max_spheres()];
    for (slot, sphere) in spheres.iter_mut().zip(buffer.spheres()) {
        *slot = sphere.into();
    }
    let mut triangles = vec![GpuTriangle::zeroed(); buffer.max_triangles()];
    for (slot, triangle) in triangles.iter_mut().zip(buffer.triangles()) {
        *slot = triangle.into();
    }

    let mut bytes = Vec::with_capacity(encoded_size(buffer.max_spheres(), buffer.max_triangles()));
    bytes.extend_from_slice(bytes_of(&header));
    bytes.extend_from_slice(bytes_of(&camera));
    bytes.extend_from_slice(cast_slice(&spheres));
    bytes.extend_from_slice(cast_slice(&triangles));
    bytes
}

/// The object buffer as it lives on the GPU.
///
/// Has to fit in `max_uniform_buffer_binding_size`, which with the default
/// limits means a few hundred triangles.
pub struct SceneUniform {
    pub buffer: Buffer,
}

impl SceneUniform {
    pub const BINDING: u32 = 0;

    pub fn new(device: &Device, scene: &ObjectBuffer) -> Self {
        let buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Object Buffer"),
            contents: &encode(scene),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        Self { buffer }
    }

    /// Only call once every mutation for the frame is done and the triangles are recomputed.
    pub fn upload(&self, queue: &Queue, scene: &ObjectBuffer) {
        queue.write_buffer(&self.buffer, 0, &encode(scene));
    }

    pub fn layout_entry() -> BindGroupLayoutEntry {
        BindGroupLayoutEntry {
            binding: Self::BINDING,
            visibility: ShaderStages::FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    pub fn entry(&self) -> BindGroupEntry {
        BindGroupEntry {
            binding: Self::BINDING,
            resource: self.buffer.as_entire_binding(),
        }
    }
}
