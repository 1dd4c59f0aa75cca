use std::path::{Path, PathBuf};

use log::{info, warn};
use nalgebra::{Point3, Vector2, Vector3};
use winit::dpi::PhysicalSize;

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::geometry::compute_triangles;
use crate::beacon::index::SceneIndex;
use crate::beacon::interaction::{FrameInput, Interaction};
use crate::beacon::mesh::{Mesh, MeshList};
use crate::beacon::scene::Material;
use crate::error::Result;

pub mod buffer;
pub mod export;
pub mod geometry;
pub mod gpu;
pub mod index;
pub mod interaction;
pub mod mesh;
pub mod obj;
pub mod pick;
pub mod ray;
pub mod scene;
pub mod transform;

/// Rotation applied to the first registered mesh once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    /// Radians per frame.
    pub angle: f32,
    pub axis: Vector3<f32>,
    pub pivot: Point3<f32>,
}

impl Default for Spin {
    fn default() -> Self {
        Self {
            angle: 0.01,
            axis: Vector3::y(),
            pivot: Point3::new(0.0, 0.0, -3.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub max_spheres: usize,
    pub max_triangles: usize,

    pub max_bounces: u32,
    pub num_samples: u32,
    pub jitter_strength: f32,

    /// Quality used when F12 writes the current view to disk.
    pub export_samples: u32,
    pub export_bounces: u32,

    /// Distance one arrow key press moves the selection.
    pub nudge_step: f32,
    /// `None` keeps every mesh still.
    pub spin: Option<Spin>,
    pub window_size: PhysicalSize<u32>,

    /// WGSL source with `vs_main` and `fs_main`, reading the object buffer at group 0.
    /// No tracer ships with the crate; without one only the side panel is drawn.
    pub shader_path: Option<PathBuf>,
    /// Mesh files loaded at startup, relative to the working directory.
    /// `meshes/ico_sphere.obj` is a 20 triangle sphere that fits the default capacity.
    pub mesh_paths: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_spheres: 1,
            max_triangles: 20,
            max_bounces: 5,
            num_samples: 52,
            jitter_strength: 0.8,
            export_samples: 5000,
            export_bounces: 500,
            nudge_step: 0.1,
            spin: Some(Spin::default()),
            window_size: PhysicalSize::new(800, 600),
            shader_path: None,
            mesh_paths: vec![],
        }
    }
}

/// The object buffer together with the meshes living in it. Owned by the
/// per-frame update, nothing else mutates it.
pub struct Scene {
    pub buffer: ObjectBuffer,
    pub meshes: MeshList,
    pub spin: Option<Spin>,
}

impl Scene {
    pub fn new(settings: &Settings) -> Self {
        Self {
            buffer: ObjectBuffer::new(settings),
            meshes: MeshList::new(),
            spin: settings.spin,
        }
    }

    pub fn add_sphere(&mut self, center: Point3<f32>, radius: f32, material: Material) -> Result<SceneIndex> {
        self.buffer
            .create_sphere(center, radius, material)
            .map(SceneIndex::Sphere)
    }

    /// Loads a mesh file and registers it. Nothing is registered when loading fails.
    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> Result<SceneIndex> {
        let mut mesh = Mesh::default();
        obj::load_mesh(&mut self.buffer, path, &mut mesh)?;

        let ordinal = self.meshes.register(mesh)?;
        Ok(SceneIndex::Mesh(ordinal))
    }

    pub fn mesh_mut(&mut self, index: SceneIndex) -> Option<(&mut ObjectBuffer, &mut Mesh)> {
        match index {
            SceneIndex::Mesh(ordinal) => Some((&mut self.buffer, self.meshes.get_mut(ordinal)?)),
            SceneIndex::Sphere(_) => None,
        }
    }

    pub fn selection(&self, offset: Vector2<f32>) -> Option<SceneIndex> {
        pick::get_selection(&self.buffer, &self.meshes, offset)
    }

    pub fn translate_object(&mut self, index: SceneIndex, translation: &Vector3<f32>) {
        self.buffer
            .translate_object(&mut self.meshes, index, translation);
    }

    pub fn set_object_color(&mut self, index: SceneIndex, color: Vector3<f32>) {
        self.buffer.set_object_color(&self.meshes, index, color);
    }

    /// Applies one frame of input and leaves the triangles recomputed, ready for upload.
    pub fn update(&mut self, mut state: Interaction, input: &FrameInput, nudge_step: f32) -> Interaction {
        if input.mouse_down {
            if input.picked_color.is_none() && state.first_press {
                state.selected = self.selection(input.cursor_offset);
                match state.selected {
                    Some(selected) => info!("Selected {selected:?}"),
                    None => info!("Selection cleared"),
                }
            }
            state.first_press = false;
        } else {
            state.first_press = true;
        }

        if let Some(selected) = state.selected {
            if let Some(color) = input.picked_color {
                self.set_object_color(selected, color);
            }
            if let Some(direction) = input.nudge {
                self.translate_object(selected, &(direction * nudge_step));
            }
        } else if input.nudge.is_some() {
            warn!("Nothing selected to move");
        }

        if let Some(spin) = self.spin {
            if let Some((buffer, mesh)) = self.mesh_mut(SceneIndex::Mesh(0)) {
                buffer.rotate_mesh(mesh, spin.angle, &spin.axis, &spin.pivot);
            }
        }

        compute_triangles(&mut self.buffer);
        state
    }
}
