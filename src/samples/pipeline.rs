/// Render pipelines built from WGSL shader stages
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;

use color_eyre::eyre::{eyre, WrapErr};
use egui_wgpu::wgpu;
use tracing::{debug, info};

use crate::gpu_context::GpuContext;
use crate::gpu_resources::depth::GpuDepthTexture;
use crate::Result;

/// Where the WGSL text of a shader stage comes from.
#[derive(Debug, Clone)]
pub enum ShaderSource {
    /// Source embedded in the binary
    Inline {
        label: &'static str,
        source: &'static str,
    },
    /// Source read from disk when the pipeline is created
    File(PathBuf),
}

impl ShaderSource {
    pub fn label(&self) -> Cow<'_, str> {
        match self {
            ShaderSource::Inline { label, .. } => Cow::Borrowed(*label),
            ShaderSource::File(path) => path.to_string_lossy(),
        }
    }

    pub fn load(&self) -> Result<Cow<'static, str>> {
        match self {
            ShaderSource::Inline { source, .. } => Ok(Cow::Borrowed(*source)),
            ShaderSource::File(path) => std::fs::read_to_string(path)
                .map(Cow::Owned)
                .wrap_err_with(|| format!("failed to read shader {}", path.display())),
        }
    }

    pub fn create_module(&self, device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
        let source = self.load()?;
        let label = self.label();
        let module = capture_validation(device, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label.as_ref()),
                source: wgpu::ShaderSource::Wgsl(source),
            })
        })
        .wrap_err_with(|| format!("failed to compile shader {label}"))?;
        info!("Loaded shader module from {}", label);
        Ok(module)
    }
}

/// One programmable stage. Every sample shader uses `main` as its entry point.
#[derive(Debug, Clone)]
pub struct ShaderStage {
    pub source: ShaderSource,
    pub entry_point: &'static str,
}

impl ShaderStage {
    pub fn main(source: ShaderSource) -> Self {
        Self {
            source,
            entry_point: "main",
        }
    }
}

/// Depth behaviour of a pipeline. The host always attaches a depth buffer, so even pipelines that
/// ignore depth have to declare its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTest {
    Disabled,
    LessWrite,
}

impl DepthTest {
    pub fn state(self) -> wgpu::DepthStencilState {
        let (depth_write_enabled, depth_compare) = match self {
            DepthTest::Disabled => (false, wgpu::CompareFunction::Always),
            DepthTest::LessWrite => (true, wgpu::CompareFunction::Less),
        };
        wgpu::DepthStencilState {
            format: GpuDepthTexture::FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

pub(crate) struct SamplePipelineConfig<'a> {
    pub label: &'a str,
    pub vertex: ShaderStage,
    pub fragment: ShaderStage,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub primitive: wgpu::PrimitiveState,
    pub depth_test: DepthTest,
    /// Values for `override` declarations in the fragment stage
    pub fragment_constants: HashMap<String, f64>,
}

#[derive(Debug)]
pub struct SamplePipeline {
    pub pipeline: wgpu::RenderPipeline,
}

impl SamplePipeline {
    #[tracing::instrument(skip(ctx, config), fields(label = config.label))]
    pub fn with_config(ctx: &GpuContext, config: &SamplePipelineConfig) -> Result<Self> {
        let device = &ctx.device;
        let vs = config.vertex.source.create_module(device)?;
        let ps = config.fragment.source.create_module(device)?;

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(config.label),
            bind_group_layouts: config.bind_group_layouts,
            push_constant_ranges: &[],
        });

        let vertex_constants = HashMap::new();
        info!("Creating render pipeline");
        let pipeline = capture_validation(device, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(config.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vs,
                    entry_point: config.vertex.entry_point,
                    buffers: config.vertex_buffers,
                    compilation_options: wgpu::PipelineCompilationOptions {
                        constants: &vertex_constants,
                        ..Default::default()
                    },
                },
                fragment: Some(wgpu::FragmentState {
                    module: &ps,
                    entry_point: config.fragment.entry_point,
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions {
                        constants: &config.fragment_constants,
                        ..Default::default()
                    },
                }),
                primitive: config.primitive,
                depth_stencil: Some(config.depth_test.state()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        })
        .wrap_err_with(|| format!("failed to create pipeline {}", config.label))?;
        debug!(target = "pipeline", "Pipeline {} ready", config.label);

        Ok(SamplePipeline { pipeline })
    }
}

impl AsRef<wgpu::RenderPipeline> for SamplePipeline {
    fn as_ref(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

/// Runs `create` inside a validation error scope so compile and pipeline errors come back as a
/// `Result` instead of reaching the device's uncaptured error handler.
fn capture_validation<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(eyre!("{error}")),
        None => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_source_loads_verbatim() {
        let source = ShaderSource::Inline {
            label: "inline",
            source: "@vertex fn main() {}",
        };
        assert_eq!(source.label(), "inline");
        assert_eq!(source.load().unwrap(), "@vertex fn main() {}");
    }

    #[test]
    fn file_source_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("ming-shader-{}.wgsl", std::process::id()));
        std::fs::write(&path, "// from disk\n").unwrap();

        let source = ShaderSource::File(path.clone());
        assert_eq!(source.load().unwrap(), "// from disk\n");
        assert!(source.label().ends_with(".wgsl"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_shader_file_is_an_error() {
        let source = ShaderSource::File(PathBuf::from("does/not/exist.wgsl"));
        let err = source.load().unwrap_err();
        assert!(format!("{err}").contains("does/not/exist.wgsl"));
    }

    #[test]
    fn stages_use_main_entry_point() {
        let stage = ShaderStage::main(ShaderSource::File(PathBuf::from("a.wgsl")));
        assert_eq!(stage.entry_point, "main");
    }

    #[test]
    fn disabled_depth_never_rejects_or_writes() {
        let state = DepthTest::Disabled.state();
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
        assert_eq!(state.format, GpuDepthTexture::FORMAT);

        let state = DepthTest::LessWrite.state();
        assert!(state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
    }
}
