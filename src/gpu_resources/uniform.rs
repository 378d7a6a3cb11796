use std::marker::PhantomData;

use bytemuck::Pod;
use egui_wgpu::wgpu::{self, util::DeviceExt};

use super::{BindGroupLayoutEntryUnbound, ToGpuResources};
use crate::gpu_context::GpuContext;

/// Constant buffer holding one `T`, rewritten in full on every update.
#[derive(Debug)]
pub struct GpuUniform<T> {
    buffer: wgpu::Buffer,
    _marker: PhantomData<T>,
}

impl<T: Pod> GpuUniform<T> {
    pub const BIND_GROUP_LAYOUT_ENTRIES: &'static [BindGroupLayoutEntryUnbound] =
        &[BindGroupLayoutEntryUnbound {
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }];

    pub fn new(ctx: &GpuContext, label: &str, initial: &T) -> Self {
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(initial),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        Self {
            buffer,
            _marker: PhantomData,
        }
    }

    /// Overwrites the whole buffer; previous contents are never read back.
    pub fn write(&self, ctx: &GpuContext, value: &T) {
        ctx.queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

impl<T> ToGpuResources for GpuUniform<T> {
    fn to_gpu_resources(&self) -> Vec<wgpu::BindingResource> {
        vec![self.buffer.as_entire_binding()]
    }
}
