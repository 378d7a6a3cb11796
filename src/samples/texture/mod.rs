use std::collections::HashMap;

use cgmath::{Matrix4, SquareMatrix};
use egui_wgpu::wgpu::{self, util::DeviceExt};
use tracing::{debug, info};

use super::pipeline::{DepthTest, SamplePipeline, SamplePipelineConfig, ShaderSource, ShaderStage};
use super::{begin_clear_pass, DesiredSettings, Sample};
use crate::color::{self, CLEAR_COLOR};
use crate::config::AppConfig;
use crate::gpu_context::{GpuContext, RenderTarget};
use crate::gpu_resources::{
    bindgroup_from_resources, layout_from_unbound_entries, texture::GpuTexture2D,
    uniform::GpuUniform, ToGpuResources,
};
use crate::Result;

pub mod cube;
pub mod transform;

use cube::{CubeVertex, CUBE_INDICES, CUBE_VERTICES};

type VsConstants = [[f32; 4]; 4];

/// Textured cube spinning about Y.
#[derive(Debug)]
pub struct TextureSample {
    pipeline: SamplePipeline,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    vs_constants: GpuUniform<VsConstants>,
    // Group 0, bound once: the constants never change binding
    static_bind_group: wgpu::BindGroup,
    // Group 1: texture and sampler
    resource_binding: wgpu::BindGroup,
    _texture: GpuTexture2D,
    world_view_proj: Matrix4<f32>,
}

impl TextureSample {
    pub const INDEX_COUNT: u32 = CUBE_INDICES.len() as u32;

    pub const GAMMA_CONSTANT: &'static str = "CONVERT_PS_OUTPUT_TO_GAMMA";

    fn primitive() -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        }
    }

    fn fragment_constants(convert_output_to_gamma: bool) -> HashMap<String, f64> {
        HashMap::from([(
            Self::GAMMA_CONSTANT.to_string(),
            if convert_output_to_gamma { 1.0 } else { 0.0 },
        )])
    }

    fn create_vertex_buffer(ctx: &GpuContext) -> wgpu::Buffer {
        ctx.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube vertex buffer"),
                contents: bytemuck::cast_slice(&CUBE_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn create_index_buffer(ctx: &GpuContext) -> wgpu::Buffer {
        ctx.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cube index buffer"),
                contents: bytemuck::cast_slice(&CUBE_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            })
    }

    /// Clear color for this frame's target
    pub fn clear_color(convert_output_to_gamma: bool) -> [f32; 4] {
        color::clear_color(CLEAR_COLOR, convert_output_to_gamma)
    }
}

impl Sample for TextureSample {
    const NAME: &'static str = "Ming|Texture";

    fn desired_settings(_is_initialization: bool) -> DesiredSettings {
        DesiredSettings::HD
    }

    #[tracing::instrument(skip_all)]
    fn init(ctx: &GpuContext, config: &AppConfig) -> Result<Self> {
        info!("Initializing Texture sample");

        // Pipeline state
        let identity: VsConstants = Matrix4::<f32>::identity().into();
        let vs_constants = GpuUniform::new(ctx, "VS constants CB", &identity);
        let static_layout = layout_from_unbound_entries(
            &ctx.device,
            "Cube Static Layout",
            &[GpuUniform::<VsConstants>::BIND_GROUP_LAYOUT_ENTRIES],
        );
        let resource_layout = layout_from_unbound_entries(
            &ctx.device,
            "Cube Resource Layout",
            &[GpuTexture2D::BIND_GROUP_LAYOUT_ENTRIES],
        );
        let pipeline = SamplePipeline::with_config(
            ctx,
            &SamplePipelineConfig {
                label: "Cube PSO",
                vertex: ShaderStage::main(ShaderSource::File(
                    config.shader_path("texture_cube.vert.wgsl"),
                )),
                fragment: ShaderStage::main(ShaderSource::File(
                    config.shader_path("texture_cube.frag.wgsl"),
                )),
                vertex_buffers: &[CubeVertex::layout()],
                bind_group_layouts: &[&static_layout, &resource_layout],
                primitive: Self::primitive(),
                depth_test: DepthTest::LessWrite,
                fragment_constants: Self::fragment_constants(ctx.convert_output_to_gamma),
            },
        )?;
        let static_bind_group = bindgroup_from_resources(
            &ctx.device,
            "Cube Static Bind Group",
            &static_layout,
            &[vs_constants.to_gpu_resources()],
        );

        // Geometry
        let cube_vertex_buffer = Self::create_vertex_buffer(ctx);
        let cube_index_buffer = Self::create_index_buffer(ctx);

        // Texture
        let texture = GpuTexture2D::from_path(ctx, &config.asset_path("logo.png"), true)?;
        let resource_binding = bindgroup_from_resources(
            &ctx.device,
            "Cube SRB",
            &resource_layout,
            &[texture.to_gpu_resources()],
        );

        Ok(Self {
            pipeline,
            cube_vertex_buffer,
            cube_index_buffer,
            vs_constants,
            static_bind_group,
            resource_binding,
            _texture: texture,
            world_view_proj: Matrix4::identity(),
        })
    }

    fn update(&mut self, ctx: &GpuContext, current_time: f64, _elapsed_time: f64, _do_update_ui: bool) {
        self.world_view_proj = transform::world_view_projection(current_time, ctx.aspect_ratio());
    }

    #[tracing::instrument(skip_all)]
    fn render(&mut self, ctx: &GpuContext, target: &RenderTarget) -> Result<()> {
        self.vs_constants.write(ctx, &self.world_view_proj.into());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cube Encoder"),
            });

        {
            let clear = Self::clear_color(ctx.convert_output_to_gamma);
            let mut render_pass =
                begin_clear_pass(&mut encoder, target, color::to_wgpu(clear), "Cube Pass");

            render_pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.set_pipeline(self.pipeline.as_ref());
            render_pass.set_bind_group(0, &self.static_bind_group, &[]);
            render_pass.set_bind_group(1, &self.resource_binding, &[]);
            debug!(target = "render_pass", "Cube bind groups set");

            render_pass.draw_indexed(0..Self::INDEX_COUNT, 0, 0..1);
            debug!(target = "render_pass", "Draw done");
        }

        ctx.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn update_ui(&mut self, ui: &egui::Context) {
        settings_window(ui);
    }
}

fn settings_window(ui: &egui::Context) {
    egui::Window::new("Settings")
        .default_pos([10.0, 10.0])
        .show(ui, |ui| {
            if ui.button("Test").clicked() {
                info!("Test");
            }
        });
}
