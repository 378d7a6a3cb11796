use egui::epaint::Shadow;
use egui::{Context, Visuals};
use egui_wgpu::Renderer;
use egui_wgpu::ScreenDescriptor;

use egui_wgpu::wgpu;
use egui_wgpu::wgpu::{Device, TextureFormat, TextureView};
use egui_winit::winit::event::WindowEvent;
use egui_winit::winit::window::Window;
use egui_winit::State as EguiState;

use crate::gpu_context::GpuContext;
use crate::samples::Sample;

/// egui state, input translation and the wgpu renderer that draws the sample UI over each frame
pub struct GuiContext {
    pub egui_ctx: Context,
    pub state: EguiState,
    renderer: Renderer,
}

impl GuiContext {
    pub fn new(
        device: &Device,
        output_color_format: TextureFormat,
        output_depth_format: Option<TextureFormat>,
        msaa_samples: u32,
        window: &Window,
    ) -> GuiContext {
        let egui_context = Context::default();
        let id = egui_context.viewport_id();

        const BORDER_RADIUS: f32 = 2.0;

        let visuals = Visuals {
            window_rounding: egui::Rounding::same(BORDER_RADIUS),
            window_shadow: Shadow::NONE,
            ..Default::default()
        };

        egui_context.set_visuals(visuals);

        let egui_state = EguiState::new(
            egui_context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
        );

        let egui_renderer = Renderer::new(
            device,
            output_color_format,
            output_depth_format,
            msaa_samples,
        );

        GuiContext {
            egui_ctx: egui_context,
            state: egui_state,
            renderer: egui_renderer,
        }
    }

    /// Returns `true` when egui used the event and the host should ignore it.
    pub fn process_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let r = self.state.on_window_event(window, event);
        r.consumed
    }

    /// Runs the sample's UI callback and draws the result on top of `window_surface_view`.
    pub fn draw<S: Sample>(
        &mut self,
        ctx: &GpuContext,
        sample: &mut S,
        window_surface_view: &TextureView,
        screen_descriptor: ScreenDescriptor,
    ) {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });
        let window = ctx.window();
        let queue = &ctx.queue;
        let device = &ctx.device;

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ui| {
            sample.update_ui(ui);
        });
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }
        let user_buffers =
            self.renderer
                .update_buffers(device, queue, &mut encoder, &tris, &screen_descriptor);
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: window_surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                label: Some("egui main render pass"),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(&mut rpass, &tris, &screen_descriptor);
        }
        for x in &full_output.textures_delta.free {
            self.renderer.free_texture(x)
        }
        queue.submit(user_buffers.into_iter().chain(Some(encoder.finish())));
    }
}
