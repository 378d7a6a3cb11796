//! Reads the presented frame back from the GPU and writes it as a PNG.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, WrapErr};
use egui_wgpu::wgpu;
use image::RgbaImage;
use tracing::{info, warn};

use crate::Result;

/// `screenshot_<unix secs>.png` inside `dir`
pub fn screenshot_path(dir: &Path) -> Result<PathBuf> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .wrap_err("system clock is before the unix epoch")?
        .as_secs();
    Ok(dir.join(format!("screenshot_{}.png", now)))
}

/// Bytes per row rounded up to what `copy_texture_to_buffer` accepts.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the alignment padding at the end of every row.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let row_bytes = (width * 4) as usize;
    data.chunks(padded_bytes_per_row as usize)
        .take(height as usize)
        .flat_map(|row| &row[..row_bytes])
        .copied()
        .collect()
}

pub fn bgra_to_rgba(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}

fn is_bgra(format: wgpu::TextureFormat) -> Result<bool> {
    match format {
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => Ok(true),
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => Ok(false),
        other => Err(eyre!("cannot save screenshots of {:?} surfaces", other)),
    }
}

#[tracing::instrument(skip(device, queue, texture))]
pub async fn save_screenshot(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    filename: &Path,
) -> Result<()> {
    if !texture.usage().contains(wgpu::TextureUsages::COPY_SRC) {
        warn!("Surface cannot be copied from, skipping screenshot");
        return Ok(());
    }
    let swap_channels = is_bgra(texture.format())?;
    let width = texture.width();
    let height = texture.height();
    let bytes_per_row = padded_bytes_per_row(width);

    let buffer_size = (bytes_per_row * height) as wgpu::BufferAddress;
    let buffer_desc = wgpu::BufferDescriptor {
        label: Some("Screenshot Buffer"),
        size: buffer_size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    };
    let buffer = device.create_buffer(&buffer_desc);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Screenshot Encoder"),
    });

    let texture_copy_view = wgpu::ImageCopyTexture {
        texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
    };

    let buffer_copy_view = wgpu::ImageCopyBuffer {
        buffer: &buffer,
        layout: wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_row),
            rows_per_image: Some(height),
        },
    };

    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    encoder.copy_texture_to_buffer(texture_copy_view, buffer_copy_view, extent);
    queue.submit(Some(encoder.finish()));

    let buffer_slice = buffer.slice(..);
    let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |v| {
        // The receiver only goes away if the caller stopped waiting
        let _ = sender.send(v);
    });

    device.poll(wgpu::Maintain::Wait);
    receiver
        .receive()
        .await
        .ok_or_else(|| eyre!("screenshot buffer mapping was cancelled"))?
        .wrap_err("failed to map the screenshot buffer")?;

    let mut pixels = {
        let data = buffer_slice.get_mapped_range();
        unpad_rows(&data, width, height, bytes_per_row)
    };
    buffer.unmap();

    if swap_channels {
        bgra_to_rgba(&mut pixels);
    }
    let image = RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| eyre!("screenshot data does not fit {}x{}", width, height))?;
    image
        .save(filename)
        .wrap_err_with(|| format!("failed to write {}", filename.display()))?;

    info!("Screenshot saved to {}", filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1280), 5120);
        assert_eq!(padded_bytes_per_row(1) % wgpu::COPY_BYTES_PER_ROW_ALIGNMENT, 0);
    }

    #[test]
    fn unpad_strips_row_tails() {
        // 2x2 image with rows padded to 12 bytes
        let data = [
            1, 2, 3, 4, 5, 6, 7, 8, 0, 0, 0, 0, //
            9, 10, 11, 12, 13, 14, 15, 16, 0, 0, 0, 0,
        ];
        assert_eq!(
            unpad_rows(&data, 2, 2, 12),
            (1..=16).collect::<Vec<u8>>()
        );
    }

    #[test]
    fn bgra_channels_are_swapped() {
        let mut pixels = [10, 20, 30, 40, 1, 2, 3, 4];
        bgra_to_rgba(&mut pixels);
        assert_eq!(pixels, [30, 20, 10, 40, 3, 2, 1, 4]);
    }

    #[test]
    fn only_8_bit_color_surfaces_are_supported() {
        assert!(is_bgra(wgpu::TextureFormat::Bgra8UnormSrgb).unwrap());
        assert!(!is_bgra(wgpu::TextureFormat::Rgba8Unorm).unwrap());
        assert!(is_bgra(wgpu::TextureFormat::Rgba16Float).is_err());
    }

    #[test]
    fn screenshot_names_live_in_the_target_dir() {
        let path = screenshot_path(Path::new("shots")).unwrap();
        assert_eq!(path.parent(), Some(Path::new("shots")));
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("screenshot_") && name.ends_with(".png"));
    }
}
