//! GPU scene renderer.
//!
//! Draws one frame's triangle stream in a single render pass. Two pipelines
//! share the vertex stage: the atlas pipeline modulates vertex color by R8
//! coverage (shapes and glyphs), the image pipeline samples RGBA textures
//! tinted by vertex color. Runs in the [`DrawBuffer`] decide which pipeline
//! and which texture each span uses, preserving draw-call order.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use easel_core::{Color, DrawBuffer, TextureKey, Viewport};

use crate::gpu::{Gpu, GpuFrame};
use crate::images::ImageCache;
use crate::text;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    /// Device-pixel offset of the active area.
    offset: [f32; 2],
    /// Logical-to-device scale (uniform in both axes).
    scale: f32,
    _pad0: f32,
    /// Surface size in device pixels.
    physical: [f32; 2],
    _pad1: [f32; 2],
}

/// Vertex layout uploaded to the GPU (32 bytes):
///
///  offset  0  pos    [f32; 2]  loc 0
///  offset  8  uv     [f32; 2]  loc 1
///  offset 16  color  [f32; 4]  loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GpuVertex {
    pos: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl GpuVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

struct ImageTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

pub(crate) struct SceneRenderer {
    atlas_pipeline: wgpu::RenderPipeline,
    image_pipeline: wgpu::RenderPipeline,

    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    atlas_texture: wgpu::Texture,
    atlas_bind_group: wgpu::BindGroup,

    images: HashMap<TextureKey, ImageTexture>,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    scratch: Vec<GpuVertex>,
}

impl SceneRenderer {
    pub fn new(gpu: &Gpu) -> Self {
        let device = gpu.device();
        let format = gpu.surface_format();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("easel scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let viewport_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<ViewportUniform>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel scene pipeline layout"),
            bind_group_layouts: &[&viewport_layout, &texture_layout],
            immediate_size: 0,
        });

        let make_pipeline = |label: &str, fs_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[GpuVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs_entry),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(premul_alpha_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let atlas_pipeline = make_pipeline("easel atlas pipeline", "fs_atlas");
        let image_pipeline = make_pipeline("easel image pipeline", "fs_image");

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel viewport bind group"),
            layout: &viewport_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("easel sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let atlas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("easel glyph atlas"),
            size: wgpu::Extent3d {
                width: text::ATLAS_SIZE,
                height: text::ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel atlas bind group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            atlas_pipeline,
            image_pipeline,
            viewport_ubo,
            viewport_bind_group,
            texture_layout,
            sampler,
            atlas_texture,
            atlas_bind_group,
            images: HashMap::new(),
            vbo: None,
            vbo_capacity: 0,
            scratch: Vec::new(),
        }
    }

    /// Re-uploads the glyph atlas when the text engine marked it dirty.
    pub fn sync_atlas(&mut self, gpu: &Gpu, atlas: &mut text::GlyphAtlas) {
        if !atlas.take_dirty() {
            return;
        }
        gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.atlas_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(text::ATLAS_SIZE),
                rows_per_image: Some(text::ATLAS_SIZE),
            },
            wgpu::Extent3d {
                width: text::ATLAS_SIZE,
                height: text::ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Uploads image entries whose pixels changed since the last frame,
    /// (re)creating textures as needed.
    pub fn sync_images(&mut self, gpu: &Gpu, cache: &mut ImageCache) {
        for (key, entry) in cache.entries_mut() {
            if !entry.dirty {
                continue;
            }
            entry.dirty = false;

            let needs_texture = self
                .images
                .get(&key)
                .is_none_or(|t| t.size != (entry.width, entry.height));
            if needs_texture {
                let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
                    label: Some("easel image"),
                    size: wgpu::Extent3d {
                        width: entry.width,
                        height: entry.height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                });
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                let bind_group = gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("easel image bind group"),
                    layout: &self.texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                });
                self.images
                    .insert(key, ImageTexture { texture, bind_group, size: (entry.width, entry.height) });
            }

            let target = &self.images[&key];
            gpu.queue().write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &target.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &entry.rgba,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(entry.width * 4),
                    rows_per_image: Some(entry.height),
                },
                wgpu::Extent3d {
                    width: entry.width,
                    height: entry.height,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    /// Records the render pass for one frame into `frame`'s encoder.
    ///
    /// The surface is cleared with the inactive-border color; the scene's
    /// own background quad covers the active area.
    pub fn render(
        &mut self,
        gpu: &Gpu,
        frame: &mut GpuFrame,
        viewport: &Viewport,
        scene: &DrawBuffer,
        inactive: Color,
    ) {
        gpu.queue().write_buffer(
            &self.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform {
                offset: [viewport.offset.x, viewport.offset.y],
                scale: viewport.scale,
                _pad0: 0.0,
                physical: [viewport.physical.x.max(1.0), viewport.physical.y.max(1.0)],
                _pad1: [0.0; 2],
            }),
        );

        if !scene.is_empty() {
            self.scratch.clear();
            self.scratch.extend(scene.vertices().iter().map(|v| {
                let c = v.color.clamped();
                GpuVertex {
                    pos: [v.pos.x, v.pos.y],
                    uv: v.uv,
                    color: [c.r, c.g, c.b, c.a],
                }
            }));
            self.ensure_vbo_capacity(gpu, self.scratch.len());
            if let Some(vbo) = self.vbo.as_ref() {
                gpu.queue().write_buffer(vbo, 0, bytemuck::cast_slice(&self.scratch));
            }
        }

        let clear = inactive.clamped();
        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("easel scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.r as f64,
                        g: clear.g as f64,
                        b: clear.b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(vbo) = self.vbo.as_ref() else { return };
        if scene.is_empty() {
            return;
        }

        rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));

        for run in scene.runs() {
            match run.texture {
                None => {
                    rpass.set_pipeline(&self.atlas_pipeline);
                    rpass.set_bind_group(1, &self.atlas_bind_group, &[]);
                }
                Some(key) => {
                    let Some(image) = self.images.get(&key) else {
                        log::error!("no texture uploaded for {key:?}; skipping run");
                        continue;
                    };
                    rpass.set_pipeline(&self.image_pipeline);
                    rpass.set_bind_group(1, &image.bind_group, &[]);
                }
            }
            rpass.draw(run.start..run.start + run.count, 0..1);
        }
    }

    fn ensure_vbo_capacity(&mut self, gpu: &Gpu, required: usize) {
        if required <= self.vbo_capacity && self.vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(1024);
        self.vbo = Some(gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel scene vbo"),
            size: (new_cap * std::mem::size_of::<GpuVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vbo_capacity = new_cap;
    }
}

fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}
