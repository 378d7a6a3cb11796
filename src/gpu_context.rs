/// Device, surface and depth buffer shared by the host loop and the samples
use color_eyre::eyre::{eyre, WrapErr};
use egui_wgpu::wgpu;
use egui_winit::winit;
use egui_winit::winit::window::Window;
use tracing::info;

use crate::config::AppConfig;
use crate::gpu_resources::depth::GpuDepthTexture;
use crate::Result;

#[derive(Debug)]
pub struct GpuContext<'a> {
    pub surface: wgpu::Surface<'a>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: &'a Window,
    pub depth: GpuDepthTexture,
    /// The surface stores what the shaders write without an sRGB encode, so shaders and clear
    /// colors must do the conversion.
    pub convert_output_to_gamma: bool,
}

/// Attachments a sample renders into for the current frame.
pub struct RenderTarget<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

impl<'a> GpuContext<'a> {
    // Creating some of the wgpu types requires async code
    pub async fn new(window: &'a Window, config: &AppConfig) -> Result<GpuContext<'a>> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .wrap_err("failed to create a surface for the window")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| eyre!("no graphics adapter compatible with the window surface"))?;
        info!(target = "gpu", "Using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .wrap_err("failed to create the device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = choose_surface_format(&surface_caps.formats, config.srgb_surface)
            .ok_or_else(|| eyre!("surface reports no supported formats"))?;

        // COPY_SRC lets the screenshot path read the presented frame back
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if surface_caps.usages.contains(wgpu::TextureUsages::COPY_SRC) {
            usage |= wgpu::TextureUsages::COPY_SRC;
        }

        let present_mode = if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth = GpuDepthTexture::new(&device, surface_config.width, surface_config.height);
        let convert_output_to_gamma = !surface_format.is_srgb();
        info!(
            target = "gpu",
            "Surface {}x{} {:?}, gamma conversion in shaders: {}",
            surface_config.width,
            surface_config.height,
            surface_format,
            convert_output_to_gamma
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            surface_config,
            size,
            depth,
            convert_output_to_gamma,
        })
    }

    pub fn window(&self) -> &Window {
        self.window
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height as f32
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth = GpuDepthTexture::new(&self.device, new_size.width, new_size.height);
        }
    }
}

/// First sRGB format when `prefer_srgb` is set, otherwise the first linear one. Falls back to
/// whatever the surface lists first.
pub fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or(formats.first())
        .copied()
}
