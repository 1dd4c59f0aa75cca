use std::path::{Path, PathBuf};

use image::{imageops, RgbImage};
use log::info;
use nalgebra::Vector2;
use winit::dpi::PhysicalSize;

use crate::beacon::buffer::ObjectBuffer;
use crate::beacon::geometry::compute_triangles;
use crate::error::{Error, Result};

pub fn export_path(num_samples: u32, max_bounces: u32) -> PathBuf {
    PathBuf::from(format!("render_{num_samples}_{max_bounces}.png"))
}

/// A recomputed copy of `buffer` carrying the export's quality settings.
pub fn prepare_export(
    buffer: &ObjectBuffer,
    num_samples: u32,
    max_bounces: u32,
    resolution: PhysicalSize<u32>,
) -> ObjectBuffer {
    let mut export = buffer.clone();
    export.num_samples = num_samples;
    export.max_bounces = max_bounces;
    export.resolution = Vector2::new(resolution.width as f32, resolution.height as f32);
    compute_triangles(&mut export);
    export
}

/// Writes RGB pixels read back bottom row first as a PNG.
pub fn write_render(pixels: &[u8], resolution: PhysicalSize<u32>, path: &Path) -> Result<()> {
    let expected = (resolution.width * resolution.height * 3) as usize;
    if pixels.len() != expected {
        return Err(Error::FrameBuffer(format!(
            "expected {expected} bytes for {}x{}, got {}",
            resolution.width,
            resolution.height,
            pixels.len()
        )));
    }

    let image = RgbImage::from_raw(resolution.width, resolution.height, pixels.to_vec())
        .ok_or_else(|| Error::FrameBuffer("pixel buffer does not fit the image".to_string()))?;
    imageops::flip_vertical(&image).save(path)?;

    info!("Exported render to {}", path.display());
    Ok(())
}
