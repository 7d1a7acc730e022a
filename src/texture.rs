//! GPU textures for the sky tables.

use half::f16;
use wgpu::util::DeviceExt;

use crate::assets::SkyTable;

/// Pixel format used for all three tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Rgba32Float,
    /// Fallback when 32-bit float textures cannot be linearly filtered.
    Rgba16Float,
}

/// Picks the table format from the result of the capability probe.
pub fn choose_table_format(linear_float_filterable: bool) -> TableFormat {
    if linear_float_filterable {
        TableFormat::Rgba32Float
    } else {
        TableFormat::Rgba16Float
    }
}

impl TableFormat {
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            TableFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
            TableFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            TableFormat::Rgba32Float => 4,
            TableFormat::Rgba16Float => 2,
        }
    }

    /// Converts samples to texel bytes in this format.
    pub fn encode(self, samples: &[f32]) -> Vec<u8> {
        match self {
            TableFormat::Rgba32Float => bytemuck::cast_slice(samples).to_vec(),
            TableFormat::Rgba16Float => {
                let halves: Vec<f16> = samples.iter().map(|&v| f16::from_f32(v)).collect();
                bytemuck::cast_slice(&halves).to_vec()
            }
        }
    }
}

pub struct TableTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TableTexture {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        table: &SkyTable,
        format: TableFormat,
    ) -> Self {
        let dims = table.dims();
        let dimension = if dims.is_volume() {
            wgpu::TextureDimension::D3
        } else {
            wgpu::TextureDimension::D2
        };
        let label = format!("{} table", table.kind());
        let desc = wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width: dims.width,
                height: dims.height,
                depth_or_array_layers: dims.depth,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension,
            format: format.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        };
        let texture = device.create_texture_with_data(queue, &desc, &format.encode(table.samples()));
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn view_dimension(table: &SkyTable) -> wgpu::TextureViewDimension {
        if table.dims().is_volume() {
            wgpu::TextureViewDimension::D3
        } else {
            wgpu::TextureViewDimension::D2
        }
    }
}

/// Linear filtering, clamped at the table edges.
pub fn create_table_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Sky Table Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}
