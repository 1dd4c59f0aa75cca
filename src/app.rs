use std::borrow::Cow;
use std::iter;
use std::path::Path;

use eframe::egui::{ClippedPrimitive, Slider};
use log::info;
use nalgebra::Vector3;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupLayout, BindGroupLayoutDescriptor, Backends,
    BlendState, BufferDescriptor, BufferUsages, Color, ColorTargetState, ColorWrites,
    CommandEncoder, CommandEncoderDescriptor, CompositeAlphaMode, Device, DeviceDescriptor,
    Dx12Compiler, Extent3d, Features, FragmentState, ImageCopyBuffer, ImageCopyTexture,
    ImageDataLayout, Instance, InstanceDescriptor, Limits, LoadOp, Maintain, MapMode,
    MultisampleState, Operations, Origin3d, PipelineLayoutDescriptor, PowerPreference,
    PresentMode, PrimitiveState, Queue, RenderPassColorAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions, ShaderModuleDescriptor,
    ShaderSource, Surface, SurfaceConfiguration, SurfaceError, TextureAspect, TextureDescriptor,
    TextureDimension, TextureFormat, TextureUsages, TextureViewDescriptor, VertexState,
    COPY_BYTES_PER_ROW_ALIGNMENT,
};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::export::write_render;
use crate::beacon::gpu::SceneUniform;
use crate::beacon::index::SceneIndex;
use crate::error::{Error, Result};
use crate::util::hsv_to_rgb;

pub struct Application {
    surface: Surface,
    device: Device,
    queue: Queue,
    config: SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    // Has to outlive the surface
    pub window: Window,

    scene_uniform: SceneUniform,
    scene_bind_group: BindGroup,
    // Without a shader only the side panel is drawn
    pipeline: Option<RenderPipeline>,

    egui_state: egui_winit::State,
    egui_context: eframe::egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    egui_screen: egui_wgpu::renderer::ScreenDescriptor,

    hue: f32,
    saturation: f32,
    picked_color: Option<Vector3<f32>>,
}

impl Application {
    pub async fn new(
        window: Window,
        event_loop: &EventLoop<()>,
        scene: &ObjectBuffer,
        shader: Option<&str>,
    ) -> Result<Self> {
        let size = window.inner_size();

        // Any backend will do: Vulkan, Metal, DX12 or GL
        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            dx12_shader_compiler: Dx12Compiler::default(),
        });

        // The window is stored next to the surface and dropped after it
        let surface = unsafe { instance.create_surface(&window) }
            .map_err(|error| Error::Gpu(error.to_string()))?;

        // The adapter is the physical GPU, it has to be able to present to our surface
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or_else(|| Error::Gpu("no compatible adapter".to_string()))?;

        // Logical device for creating resources, queue for submitting work to it
        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    features: Features::empty(),
                    limits: Limits::default(),
                    label: Some("Beacon GPU"),
                },
                None,
            )
            .await
            .map_err(|error| Error::Gpu(error.to_string()))?;

        // Prefer an sRGB surface so the traced colours come out as intended
        let capabilities = surface.get_capabilities(&adapter);
        let surface_format = capabilities
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(capabilities.formats[0]);
        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        // The whole object buffer is one uniform at group 0, binding 0
        let scene_uniform = SceneUniform::new(&device, scene);
        let scene_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Object Buffer Layout"),
            entries: &[SceneUniform::layout_entry()],
        });
        let scene_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Object Buffer Bind Group"),
            layout: &scene_layout,
            entries: &[scene_uniform.entry()],
        });

        let pipeline = shader.map(|source| {
            Self::create_pipeline(&device, &scene_layout, surface_format, source)
        });

        // egui draws the side panel on top of the traced image in the same pass
        let egui_state = egui_winit::State::new(event_loop);
        let egui_context = eframe::egui::Context::default();
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1);
        let egui_screen = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: egui_context.pixels_per_point(),
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            scene_uniform,
            scene_bind_group,
            pipeline,
            egui_state,
            egui_context,
            egui_renderer,
            egui_screen,
            hue: 0.0,
            saturation: 1.0,
            picked_color: None,
        })
    }

    // Fullscreen pass: the vertex stage emits a covering triangle, the fragment
    // stage traces against the object buffer.
    fn create_pipeline(
        device: &Device,
        scene_layout: &BindGroupLayout,
        format: TextureFormat,
        source: &str,
    ) -> RenderPipeline {
        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Trace Shader"),
            source: ShaderSource::Wgsl(Cow::Borrowed(source)),
        });
        let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Trace Pipeline Layout"),
            bind_group_layouts: &[scene_layout],
            push_constant_ranges: &[],
        });

        info!("Created trace pipeline");
        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Trace Pipeline"),
            layout: Some(&layout),
            vertex: VertexState {
                module: &module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fs_main",
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState::default(),
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.egui_screen.pixels_per_point = self.egui_context.pixels_per_point();
        self.egui_screen.size_in_pixels = [self.config.width, self.config.height];
    }

    /// Colour chosen in the side panel since the last call.
    pub fn take_picked_color(&mut self) -> Option<Vector3<f32>> {
        self.picked_color.take()
    }

    /// The scene has to be fully updated and recomputed for this frame.
    pub fn render(&mut self, scene: &ObjectBuffer, selected: Option<SceneIndex>) -> std::result::Result<(), SurfaceError> {
        self.scene_uniform.upload(&self.queue, scene);

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Encoder"),
        });

        {
            let primitives = self.update_egui(&mut encoder, selected);
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color {
                            r: 0.2,
                            g: 0.3,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            if let Some(pipeline) = &self.pipeline {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }

            self.egui_renderer
                .render(&mut render_pass, &primitives, &self.egui_screen)
        }

        self.queue.submit(iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Traces `scene` once into an offscreen texture and writes it to `path`.
    pub fn export_render(&mut self, scene: &ObjectBuffer, path: &Path) -> Result<()> {
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or_else(|| Error::Gpu("no trace shader to export with".to_string()))?;
        let width = scene.resolution.x as u32;
        let height = scene.resolution.y as u32;
        if width == 0 || height == 0 {
            return Err(Error::FrameBuffer(format!("cannot export a {width}x{height} render")));
        }

        self.scene_uniform.upload(&self.queue, scene);

        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("Export Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: self.config.format,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&TextureViewDescriptor::default());

        // Rows of a texture copy have to be aligned to 256 bytes
        let bytes_per_row = (width * 4 + COPY_BYTES_PER_ROW_ALIGNMENT - 1)
            / COPY_BYTES_PER_ROW_ALIGNMENT
            * COPY_BYTES_PER_ROW_ALIGNMENT;
        let readback = self.device.create_buffer(&BufferDescriptor {
            label: Some("Export Readback"),
            size: (bytes_per_row * height) as u64,
            usage: BufferUsages::COPY_DST | BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Export Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Export Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        encoder.copy_texture_to_buffer(
            ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            ImageCopyBuffer {
                buffer: &readback,
                layout: ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            size,
        );
        self.queue.submit(iter::once(encoder.finish()));

        let slice = readback.slice(..);
        slice.map_async(MapMode::Read, |_| {});
        self.device.poll(Maintain::Wait);

        let bgra = matches!(
            self.config.format,
            TextureFormat::Bgra8Unorm | TextureFormat::Bgra8UnormSrgb
        );
        // write_render takes rows bottom first
        let pixels: Vec<u8> = {
            let data = slice.get_mapped_range();
            (0..height as usize)
                .rev()
                .flat_map(|row| {
                    let start = row * bytes_per_row as usize;
                    data[start..start + width as usize * 4]
                        .chunks_exact(4)
                        .flat_map(move |texel| match bgra {
                            true => [texel[2], texel[1], texel[0]],
                            false => [texel[0], texel[1], texel[2]],
                        })
                })
                .collect()
        };
        readback.unmap();

        write_render(&pixels, PhysicalSize::new(width, height), path)
    }

    /// Returns true when the side panel consumed the event.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.egui_state
            .on_event(&self.egui_context, event)
            .consumed
    }

    fn update_egui(&mut self, encoder: &mut CommandEncoder, selected: Option<SceneIndex>) -> Vec<ClippedPrimitive> {
        let mut hue = self.hue;
        let mut saturation = self.saturation;
        let mut changed = false;

        let egui_input = self.egui_state.take_egui_input(&self.window);
        let egui_output = self.egui_context.run(egui_input, |ctx| {
            eframe::egui::SidePanel::right("Side Menu")
                .resizable(true)
                .width_range(0.0..=512.0)
                .default_width(160.0)
                .show(ctx, |ui| {
                    match selected {
                        Some(SceneIndex::Sphere(index)) => ui.label(format!("Sphere {index}")),
                        Some(SceneIndex::Mesh(index)) => ui.label(format!("Mesh {index}")),
                        None => ui.label("Nothing selected"),
                    };
                    changed |= ui.add(Slider::new(&mut hue, 0.0..=1.0).text("Hue")).changed();
                    changed |= ui
                        .add(Slider::new(&mut saturation, 0.0..=1.0).text("Saturation"))
                        .changed();
                });
        });

        self.hue = hue;
        self.saturation = saturation;
        if changed {
            self.picked_color = Some(hsv_to_rgb(hue, saturation, 1.0));
        }

        self.egui_state.handle_platform_output(&self.window, &self.egui_context, egui_output.platform_output);
        let primitives = self.egui_context.tessellate(egui_output.shapes);
        egui_output.textures_delta.set.iter().for_each(|(id, delta)| {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, delta);
        });
        egui_output.textures_delta.free.iter().for_each(|id| {
            self.egui_renderer.free_texture(id);
        });

        self.egui_renderer.update_buffers(&self.device, &self.queue, encoder, &primitives, &self.egui_screen);

        primitives
    }
}
