use std::fs;

use log::{error, info, warn};
use winit::dpi::PhysicalPosition;
use winit::event::{
    ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::app::Application;
use crate::beacon::export::{export_path, prepare_export};
use crate::beacon::interaction::{nudge_direction, InputLatch, Interaction};
use crate::beacon::{Scene, Settings};
use crate::camera::screen_offset;
use crate::error::Result;

pub mod app;
pub mod beacon;
pub mod camera;
pub mod error;
pub mod util;

/// Opens the window and drives the poll, update, upload, draw cycle until it closes.
///
/// Expects a logger to be installed already.
pub fn run(settings: Settings, mut scene: Scene) -> Result<()> {
    let shader = settings.shader_path.as_ref().and_then(|path| {
        fs::read_to_string(path)
            .map_err(|error| warn!("Could not read trace shader {}: {error}", path.display()))
            .ok()
    });
    if shader.is_none() {
        warn!("No trace shader, only the side panel will be drawn");
    }

    // Fixed size window, the object buffer resolution follows it
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Beacon: Ray Tracer")
        .with_inner_size(settings.window_size)
        .with_resizable(false)
        .build(&event_loop)?;

    scene.buffer.resolution = {
        let size = window.inner_size();
        nalgebra::Vector2::new(size.width as f32, size.height as f32)
    };
    beacon::geometry::compute_triangles(&mut scene.buffer);

    let mut app = pollster::block_on(Application::new(
        window,
        &event_loop,
        &scene.buffer,
        shader.as_deref(),
    ))?;

    // Selection survives across frames, the latch collects events until the next redraw
    let mut interaction = Interaction::default();
    let mut latch = InputLatch::default();
    let mut cursor = PhysicalPosition::<f64>::default();
    let mut frames = 0u64;
    let started = std::time::Instant::now();

    event_loop.run(move |event, _, control_flow| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == app.window.id() => {
            // Releases always count, otherwise a drag ending over the panel sticks
            if let WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } = event
            {
                latch.release();
            }
            // The side panel gets the first look, whatever it consumed never reaches the scene
            if app.input(event) {
                return;
            }

            match event {
                // Closing the window or pressing ESC quits and reports the frame rate
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(VirtualKeyCode::Escape),
                            ..
                        },
                    ..
                } => {
                    let seconds = started.elapsed().as_secs_f64();
                    info!("Executed {frames} frames in {seconds:.2} seconds");
                    info!("Average FPS: {:.1}", frames as f64 / seconds.max(f64::EPSILON));
                    *control_flow = ControlFlow::ExitWithCode(0)
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    // F12 writes a high quality render next to the binary, arrows move the selection
                    if *key == VirtualKeyCode::F12 {
                        let (samples, bounces) = (settings.export_samples, settings.export_bounces);
                        let export = prepare_export(&scene.buffer, samples, bounces, app.size);
                        if let Err(error) = app.export_render(&export, &export_path(samples, bounces)) {
                            error!("Export failed: {error}");
                        }
                    } else if let Some(direction) = nudge_direction(*key) {
                        latch.nudge(direction);
                    }
                }
                WindowEvent::CursorMoved { position, .. } => cursor = *position,
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => latch.press(),
                WindowEvent::Resized(size) => app.resize(*size),
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    app.resize(**new_inner_size)
                }
                _ => {}
            }
        }
        Event::RedrawRequested(window_id) if window_id == app.window.id() => {
            // Update the scene with everything gathered since the last frame, then upload and draw
            let frame = latch.take(screen_offset(cursor, app.size), app.take_picked_color());
            interaction = scene.update(interaction, &frame, settings.nudge_step);
            scene.buffer.resolution =
                nalgebra::Vector2::new(app.size.width as f32, app.size.height as f32);

            match app.render(&scene.buffer, interaction.selected) {
                Ok(()) => frames += 1,
                // Reconfigure a lost surface with the size it had
                Err(wgpu::SurfaceError::Lost) => app.resize(app.size),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("GPU is out of memory");
                    *control_flow = ControlFlow::ExitWithCode(0)
                }
                Err(error) => warn!("{error:?}"),
            }
        }
        // Keep redrawing, the scene animates every frame
        Event::MainEventsCleared => app.window.request_redraw(),
        _ => {}
    })
}
