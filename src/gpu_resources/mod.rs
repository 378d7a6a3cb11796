use std::num::NonZeroU32;

use egui_wgpu::wgpu::{self, BindingType, ShaderStages};

pub mod depth;
pub mod texture;
pub mod uniform;

/// WGPU's BindGroupEntries and BindGroupLayoutEntry's force you to hardcode the binding index
/// This is a way to abstract that away.
/// - We let each resource define it's shape
/// - We merge many resources into a single bind group layout at the top level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindGroupLayoutEntryUnbound {
    /// Which shader stages can see this binding.
    pub visibility: ShaderStages,
    /// The type of the binding
    pub ty: BindingType,
    /// If this value is Some, indicates this entry is an array. Array size must be 1 or greater.
    pub count: Option<NonZeroU32>,
}

pub trait ToGpuResources {
    fn to_gpu_resources(&self) -> Vec<wgpu::BindingResource>;
}

pub trait ToBindGroupEntries: Sized {
    fn to_bind_group_entries(&self) -> Vec<wgpu::BindGroupEntry>;
}

impl ToBindGroupEntries for Vec<wgpu::BindingResource<'_>> {
    fn to_bind_group_entries(&self) -> Vec<wgpu::BindGroupEntry> {
        self.iter()
            .enumerate()
            .map(|(i, r)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: r.clone(),
            })
            .collect()
    }
}

pub trait ToBindGroupLayoutEntries: Sized {
    fn to_bind_group_layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry>;
}

impl ToBindGroupLayoutEntries for Vec<&BindGroupLayoutEntryUnbound> {
    fn to_bind_group_layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.iter()
            .enumerate()
            .map(|(i, r)| wgpu::BindGroupLayoutEntry {
                binding: i as u32,
                visibility: r.visibility,
                ty: r.ty,
                count: r.count,
            })
            .collect()
    }
}

/// Flattens the entries of several resources into one layout, numbering bindings in order.
pub fn layout_from_unbound_entries(
    device: &wgpu::Device,
    label: &str,
    entries: &[&[BindGroupLayoutEntryUnbound]],
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: flatten_unbound_entries(entries)
            .to_bind_group_layout_entries()
            .as_slice(),
    })
}

pub fn bindgroup_from_resources(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    resources: &[Vec<wgpu::BindingResource>],
) -> wgpu::BindGroup {
    let flat_resources: Vec<wgpu::BindingResource> =
        resources.iter().flat_map(|x| x.iter()).cloned().collect();

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: flat_resources.to_bind_group_entries().as_slice(),
    })
}

fn flatten_unbound_entries<'a>(
    entries: &[&'a [BindGroupLayoutEntryUnbound]],
) -> Vec<&'a BindGroupLayoutEntryUnbound> {
    entries.iter().flat_map(|x| x.iter()).collect()
}
