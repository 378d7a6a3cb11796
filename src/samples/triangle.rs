use std::collections::HashMap;

use egui_wgpu::wgpu;
use tracing::{debug, info};

use super::pipeline::{DepthTest, SamplePipeline, SamplePipelineConfig, ShaderSource, ShaderStage};
use super::{begin_clear_pass, DesiredSettings, Sample};
use crate::color::{self, CLEAR_COLOR};
use crate::config::AppConfig;
use crate::gpu_context::{GpuContext, RenderTarget};
use crate::Result;

const VS_SOURCE: &str = r#"
struct PSInput {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn main(@builtin(vertex_index) vert_id: u32) -> PSInput {
    var positions = array<vec4<f32>, 3>(
        vec4<f32>(-0.5, -0.5, 0.0, 1.0),
        vec4<f32>( 0.0,  0.5, 0.0, 1.0),
        vec4<f32>( 0.5, -0.5, 0.0, 1.0),
    );

    var colors = array<vec3<f32>, 3>(
        vec3<f32>(1.0, 0.0, 0.0), // red
        vec3<f32>(0.0, 1.0, 0.0), // green
        vec3<f32>(0.0, 0.0, 1.0), // blue
    );

    var ps_in: PSInput;
    ps_in.pos = positions[vert_id];
    ps_in.color = colors[vert_id];
    return ps_in;
}
"#;

const PS_SOURCE: &str = r#"
struct PSInput {
    @builtin(position) pos: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@fragment
fn main(ps_in: PSInput) -> @location(0) vec4<f32> {
    return vec4<f32>(ps_in.color, 1.0);
}
"#;

/// Three vertices generated in the vertex shader, no buffers at all.
#[derive(Debug)]
pub struct Triangle {
    pipeline: SamplePipeline,
}

impl Triangle {
    pub const VERTEX_COUNT: u32 = 3;

    fn primitive() -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        }
    }
}

impl Sample for Triangle {
    const NAME: &'static str = "Ming|Triangle";

    fn desired_settings(_is_initialization: bool) -> DesiredSettings {
        DesiredSettings::HD
    }

    fn init(ctx: &GpuContext, _config: &AppConfig) -> Result<Self> {
        info!("Initializing Triangle sample");
        let pipeline = SamplePipeline::with_config(
            ctx,
            &SamplePipelineConfig {
                label: "Simple triangle PSO",
                vertex: ShaderStage::main(ShaderSource::Inline {
                    label: "Triangle VS",
                    source: VS_SOURCE,
                }),
                fragment: ShaderStage::main(ShaderSource::Inline {
                    label: "Triangle PS",
                    source: PS_SOURCE,
                }),
                vertex_buffers: &[],
                bind_group_layouts: &[],
                primitive: Self::primitive(),
                depth_test: DepthTest::Disabled,
                fragment_constants: HashMap::new(),
            },
        )?;
        Ok(Self { pipeline })
    }

    #[tracing::instrument(skip_all)]
    fn render(&mut self, ctx: &GpuContext, target: &RenderTarget) -> Result<()> {
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Triangle Encoder"),
            });

        {
            let mut render_pass = begin_clear_pass(
                &mut encoder,
                target,
                color::to_wgpu(CLEAR_COLOR),
                "Triangle Pass",
            );
            render_pass.set_pipeline(self.pipeline.as_ref());
            render_pass.draw(0..Self::VERTEX_COUNT, 0..1);
            debug!(target = "render_pass", "Draw done");
        }

        ctx.queue.submit(Some(encoder.finish()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(source: &str) {
        let module = naga::front::wgsl::parse_str(source).expect("WGSL should parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .expect("WGSL should validate");
    }

    fn entry_points(source: &str) -> Vec<(naga::ShaderStage, String)> {
        let module = naga::front::wgsl::parse_str(source).unwrap();
        module
            .entry_points
            .iter()
            .map(|ep| (ep.stage, ep.name.clone()))
            .collect()
    }

    #[test]
    fn embedded_shaders_validate() {
        validate(VS_SOURCE);
        validate(PS_SOURCE);
    }

    #[test]
    fn each_stage_has_a_main_entry_point() {
        assert_eq!(
            entry_points(VS_SOURCE),
            vec![(naga::ShaderStage::Vertex, "main".to_string())]
        );
        assert_eq!(
            entry_points(PS_SOURCE),
            vec![(naga::ShaderStage::Fragment, "main".to_string())]
        );
    }

    #[test]
    fn vertex_shader_takes_no_vertex_inputs() {
        let module = naga::front::wgsl::parse_str(VS_SOURCE).unwrap();
        let main = &module.entry_points[0].function;
        assert_eq!(main.arguments.len(), 1);
        assert_eq!(
            main.arguments[0].binding,
            Some(naga::Binding::BuiltIn(naga::BuiltIn::VertexIndex))
        );
    }

    #[test]
    fn draws_three_vertices_without_culling() {
        assert_eq!(Triangle::VERTEX_COUNT, 3);
        let primitive = Triangle::primitive();
        assert_eq!(primitive.cull_mode, None);
        assert_eq!(primitive.topology, wgpu::PrimitiveTopology::TriangleList);
    }
}
