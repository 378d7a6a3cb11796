use std::path::Path;

use color_eyre::eyre::WrapErr;
use egui_wgpu::wgpu;
use tracing::info;

use super::{BindGroupLayoutEntryUnbound, ToGpuResources};
use crate::gpu_context::GpuContext;
use crate::Result;

/// Sampled 2D texture with its default view and an immutable linear-clamp sampler.
#[derive(Debug)]
pub struct GpuTexture2D {
    pub texture_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    // Kept alive alongside its view
    _texture: wgpu::Texture,
}

impl GpuTexture2D {
    pub const BIND_GROUP_LAYOUT_ENTRIES: &'static [BindGroupLayoutEntryUnbound] = &[
        BindGroupLayoutEntryUnbound {
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        },
        BindGroupLayoutEntryUnbound {
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ];

    /// Loads an image file into an RGBA8 texture. `is_srgb` selects the sRGB view of the data so
    /// sampling returns linear values.
    #[tracing::instrument(skip(ctx))]
    pub fn from_path(ctx: &GpuContext, path: &Path, is_srgb: bool) -> Result<Self> {
        let image = image::open(path)
            .wrap_err_with(|| format!("failed to load texture {}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        info!(target = "texture", "Loaded {:?} ({}x{})", path, width, height);

        let label = path.file_name().and_then(|n| n.to_str()).unwrap_or("texture");
        Ok(Self::from_rgba8(ctx, label, width, height, &image, is_srgb))
    }

    pub fn from_rgba8(
        ctx: &GpuContext,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
        is_srgb: bool,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::format(is_srgb),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Linear Clamp Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture_view,
            sampler,
            _texture: texture,
        }
    }

    pub fn format(is_srgb: bool) -> wgpu::TextureFormat {
        if is_srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        }
    }
}

impl ToGpuResources for GpuTexture2D {
    fn to_gpu_resources(&self) -> Vec<wgpu::BindingResource> {
        vec![
            wgpu::BindingResource::TextureView(&self.texture_view),
            wgpu::BindingResource::Sampler(&self.sampler),
        ]
    }
}
