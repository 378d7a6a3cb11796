use egui_wgpu::wgpu;

use crate::config::AppConfig;
use crate::gpu_context::{GpuContext, RenderTarget};
use crate::Result;

pub mod pipeline;
pub mod text_editor;
pub mod texture;
pub mod triangle;

/// Window request a sample makes to the host. `None` leaves the choice to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DesiredSettings {
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,
}

impl DesiredSettings {
    pub const HD: DesiredSettings = DesiredSettings {
        window_width: Some(1280),
        window_height: Some(720),
    };
}

/// Lifecycle every sample implements. The host calls [`Sample::init`] once, then `update`,
/// `render` and `update_ui` once per frame, in that order.
///
/// A sample value only exists after a successful `init`, so nothing can be drawn with GPU
/// objects that were never created.
pub trait Sample: Sized {
    const NAME: &'static str;

    fn desired_settings(_is_initialization: bool) -> DesiredSettings {
        DesiredSettings::default()
    }

    fn init(ctx: &GpuContext, config: &AppConfig) -> Result<Self>;

    fn update(
        &mut self,
        _ctx: &GpuContext,
        _current_time: f64,
        _elapsed_time: f64,
        _do_update_ui: bool,
    ) {
    }

    fn render(&mut self, ctx: &GpuContext, target: &RenderTarget) -> Result<()>;

    fn update_ui(&mut self, _ui: &egui::Context) {}
}

/// Selectable samples. The host maps each kind to its [`Sample`] implementation at startup.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    Triangle,
    Texture,
    TextEditor,
}

impl SampleKind {
    pub const ALL: [SampleKind; 3] = [
        SampleKind::Triangle,
        SampleKind::Texture,
        SampleKind::TextEditor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SampleKind::Triangle => triangle::Triangle::NAME,
            SampleKind::Texture => texture::TextureSample::NAME,
            SampleKind::TextEditor => text_editor::TextEditorSample::NAME,
        }
    }

    pub fn cli_name(self) -> &'static str {
        match self {
            SampleKind::Triangle => "triangle",
            SampleKind::Texture => "texture",
            SampleKind::TextEditor => "text-editor",
        }
    }
}

/// Render pass that clears both attachments, which every sample starts its frame with.
pub fn begin_clear_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    target: &'e RenderTarget,
    clear_color: wgpu::Color,
    label: &str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear_color),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(
            crate::gpu_resources::depth::GpuDepthTexture::clear_attachment(target.depth),
        ),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn every_sample_requests_hd_window() {
        assert_eq!(
            triangle::Triangle::desired_settings(true),
            DesiredSettings::HD
        );
        assert_eq!(
            texture::TextureSample::desired_settings(true),
            DesiredSettings::HD
        );
        assert_eq!(
            text_editor::TextEditorSample::desired_settings(false),
            DesiredSettings::HD
        );
    }

    #[test]
    fn names_carry_the_ming_prefix() {
        assert_eq!(SampleKind::Triangle.name(), "Ming|Triangle");
        assert_eq!(SampleKind::Texture.name(), "Ming|Texture");
        assert_eq!(SampleKind::TextEditor.name(), "Ming|TextEditor");
    }

    #[test]
    fn cli_names_match_clap_values() {
        for kind in SampleKind::ALL {
            let value = kind.to_possible_value().unwrap();
            assert_eq!(value.get_name(), kind.cli_name());
        }
    }
}
