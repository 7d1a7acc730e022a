use std::iter;
use std::mem;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::assets::SkyTables;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::interaction::ViewParams;
use crate::texture::{choose_table_format, create_table_sampler, TableTexture};
use crate::uniforms::GlobalsUniform;

//
// ======================== FULL-SCREEN QUAD ========================
//
// Drawn as a triangle strip in clip space; the vertex shader turns each
// corner into a world-space view ray.
//

#[rustfmt::skip]
const QUAD_VERTICES: &[f32] = &[
    -1.0, -1.0, 0.0, 1.0,
     1.0, -1.0, 0.0, 1.0,
    -1.0,  1.0, 0.0, 1.0,
     1.0,  1.0, 0.0, 1.0,
];

const QUAD_VERTEX_COUNT: u32 = 4;

const SHADER_SRC: &str = include_str!("shader.wgsl");

//
// =========== RENDER STATE ===========
//

pub struct Renderer {
    // WGPU
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,

    // Pipeline
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,

    // Sky material
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    tables: [TableTexture; 3],
    white_point: [f32; 3],
}

impl Renderer {
    pub async fn new(
        window: &winit::window::Window,
        tables: &SkyTables,
        viewer_config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        // Create instance + surface + adapter
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        // SAFETY: the window is owned by the event loop closure, which also owns
        // the renderer, so it outlives the surface.
        let surface = unsafe { instance.create_surface(window) }?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info());

        // 32-bit float tables need adapter-specific filtering support
        let linear_float = adapter
            .features()
            .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
            && adapter
                .get_texture_format_features(wgpu::TextureFormat::Rgba32Float)
                .flags
                .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE);
        let table_format = choose_table_format(linear_float);
        if linear_float {
            log::info!("sky tables use {:?}", table_format);
        } else {
            log::warn!(
                "linear filtering of 32-bit float textures unsupported, falling back to {:?}",
                table_format
            );
        }
        let features = if linear_float {
            wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES
        } else {
            wgpu::Features::empty()
        };

        // Device + queue
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    features,
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        // Surface config. The shader applies its own gamma, so prefer a linear format.
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(ViewerError::NoSurfaceFormat)?;
        let present_mode = if viewer_config.window.vsync {
            wgpu::PresentMode::Fifo
        } else {
            surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        };
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        // Quad vertex buffer
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Sky tables
        let transmittance = TableTexture::new(&device, &queue, &tables.transmittance, table_format);
        let scattering = TableTexture::new(&device, &queue, &tables.scattering, table_format);
        let irradiance = TableTexture::new(&device, &queue, &tables.irradiance, table_format);
        let sampler = create_table_sampler(&device);

        // Globals
        let white_point = viewer_config.display.white_point;
        let globals = GlobalsUniform::new(&ViewParams::default(), aspect(&config), white_point);
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let table_entry = |binding: u32, view_dimension: wgpu::TextureViewDimension| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension,
                    multisampled: false,
                },
                count: None,
            }
        };
        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                table_entry(1, TableTexture::view_dimension(&tables.transmittance)),
                table_entry(2, TableTexture::view_dimension(&tables.scattering)),
                table_entry(3, TableTexture::view_dimension(&tables.irradiance)),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals BG"),
            layout: &globals_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&transmittance.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&scattering.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&irradiance.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Atmosphere Shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(SHADER_SRC)),
        });

        // Pipeline
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&globals_bgl],
            push_constant_ranges: &[],
        });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: mem::size_of::<f32>() as wgpu::BufferAddress * 4,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x4,
                    }],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                strip_index_format: None,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            vertex_buffer,
            globals_buffer,
            globals_bind_group,
            tables: [transmittance, scattering, irradiance],
            white_point,
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resize. The new aspect ratio is picked up by the next `update`.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload uniforms for the current view.
    pub fn update(&mut self, params: &ViewParams) {
        let globals = GlobalsUniform::new(params, aspect(&self.config), self.white_point);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Render
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sky Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            rp.set_pipeline(&self.render_pipeline);
            rp.set_bind_group(0, &self.globals_bind_group, &[]);
            rp.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rp.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        self.queue.submit(iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Release GPU resources ahead of dropping the device.
    pub fn shutdown(self) {
        for table in &self.tables {
            table.texture.destroy();
        }
        self.globals_buffer.destroy();
        self.vertex_buffer.destroy();
        self.device.poll(wgpu::Maintain::Wait);
        log::info!("renderer shut down");
    }
}

fn aspect(config: &wgpu::SurfaceConfiguration) -> f32 {
    config.width as f32 / config.height.max(1) as f32
}
