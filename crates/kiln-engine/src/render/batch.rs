use std::collections::HashMap;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::assets::{ResourceCache, ShaderHandle, ShaderId, TextureData, TextureHandle, TextureId};
use crate::draw::DrawList;
use crate::object::ObjectId;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{
    premul_alpha_blend, view_ubo_min_binding_size, QuadVertex, ViewUniform, QUAD_INDICES,
    QUAD_VERTICES,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    shader: ShaderId,
    format: wgpu::TextureFormat,
    blending: bool,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Instanced sprite renderer.
///
/// Draws every `SpriteCmd` of a draw list in paint order with the bound
/// shader, one instanced call per run of sprites sharing a texture. The same
/// renderer drives the color pass (default shader, blended) and the picking
/// pass (picking shader into an integer target, unblended).
pub struct BatchRenderer {
    label: &'static str,
    shader: Option<ShaderHandle>,
    blending: bool,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    view_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,
    pipeline_layout: Option<wgpu::PipelineLayout>,

    view_ubo: Option<wgpu::Buffer>,
    view_bind_group: Option<wgpu::BindGroup>,

    sampler: Option<wgpu::Sampler>,
    textures: HashMap<TextureId, GpuTexture>,
    white: Option<GpuTexture>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    warned_unbound: bool,
}

impl BatchRenderer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            shader: None,
            blending: true,
            pipelines: HashMap::new(),
            view_bgl: None,
            texture_bgl: None,
            pipeline_layout: None,
            view_ubo: None,
            view_bind_group: None,
            sampler: None,
            textures: HashMap::new(),
            white: None,
            quad_vbo: None,
            quad_ibo: None,
            instance_vbo: None,
            instance_capacity: 0,
            warned_unbound: false,
        }
    }

    /// Selects the shader for subsequent `render` calls.
    pub fn bind_shader(&mut self, shader: ShaderHandle) {
        self.shader = Some(shader);
    }

    #[inline]
    pub fn shader(&self) -> Option<&ShaderHandle> {
        self.shader.as_ref()
    }

    /// Premultiplied-alpha blending on or off. Integer targets need it off.
    pub fn set_blending(&mut self, enabled: bool) {
        self.blending = enabled;
    }

    #[inline]
    pub fn blending(&self) -> bool {
        self.blending
    }

    /// Draws `draw_list` into `target` on top of its current contents.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        view: ViewUniform,
        cache: &ResourceCache,
    ) {
        let Some(shader) = self.shader.clone() else {
            if !self.warned_unbound {
                log::warn!("{}: render called with no shader bound", self.label);
                self.warned_unbound = true;
            }
            return;
        };

        self.ensure_layouts(ctx);
        self.ensure_pipeline(ctx, &shader);
        self.ensure_static_buffers(ctx);
        self.ensure_view_binding(ctx);
        self.ensure_white(ctx);

        let mut instances: Vec<SpriteInstance> = Vec::with_capacity(draw_list.len());
        let mut batches: Vec<(Option<TextureId>, Range<u32>)> = Vec::new();

        for item in draw_list.iter_in_paint_order() {
            let cmd = &item.cmd;
            let r = cmd.rect.normalized();
            if r.is_empty() {
                continue;
            }

            let texture = match cmd.texture.as_ref() {
                Some(handle) if self.ensure_texture(ctx, cache, handle) => Some(handle.id()),
                _ => None,
            };

            let index = instances.len() as u32;
            instances.push(SpriteInstance::new(cmd.object, r, cmd.rotation, cmd.uv, cmd.color));
            match batches.last_mut() {
                Some((t, range)) if *t == texture => range.end = index + 1,
                _ => batches.push((texture, index..index + 1)),
            }
        }

        if instances.is_empty() {
            return;
        }

        self.write_view_uniform(ctx, view);
        self.ensure_instance_capacity(ctx, instances.len());

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        ctx.queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&instances));

        let key = self.pipeline_key(ctx, &shader);
        let Some(pipeline) = self.pipelines.get(&key) else { return };
        let Some(view_bind_group) = self.view_bind_group.as_ref() else { return };
        let Some(white) = self.white.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, view_bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for (texture, range) in batches {
            let bind_group = texture
                .and_then(|id| self.textures.get(&id))
                .unwrap_or(white);
            rpass.set_bind_group(1, &bind_group.bind_group, &[]);
            rpass.draw_indexed(0..6, 0, range);
        }
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn pipeline_key(&self, ctx: &RenderCtx<'_>, shader: &ShaderHandle) -> PipelineKey {
        PipelineKey {
            shader: shader.id(),
            format: ctx.target_format,
            blending: self.blending,
        }
    }

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_layout.is_some() {
            return;
        }

        let view_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln sprite view bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: view_ubo_min_binding_size(),
                },
                count: None,
            }],
        });

        let texture_bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln sprite texture bgl"),
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

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln sprite pipeline layout"),
            bind_group_layouts: &[&view_bgl, &texture_bgl],
            immediate_size: 0,
        });

        // Pixel art: no filtering between texels.
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kiln sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        self.view_bgl = Some(view_bgl);
        self.texture_bgl = Some(texture_bgl);
        self.pipeline_layout = Some(pipeline_layout);
        self.sampler = Some(sampler);

        self.view_bind_group = None;
        self.view_ubo = None;
        self.textures.clear();
        self.white = None;
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, shader: &ShaderHandle) {
        let key = self.pipeline_key(ctx, shader);
        if self.pipelines.contains_key(&key) {
            return;
        }
        let Some(layout) = self.pipeline_layout.as_ref() else { return };

        let module = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.path()),
            source: wgpu::ShaderSource::Wgsl(shader.source().into()),
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(layout),

            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), SpriteInstance::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend: key.blending.then(premul_alpha_blend),
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
        });

        log::debug!(
            "{}: built pipeline for {} ({:?}, blending={})",
            self.label,
            shader.path(),
            key.format,
            key.blending
        );
        self.pipelines.insert(key, pipeline);
    }

    fn ensure_view_binding(&mut self, ctx: &RenderCtx<'_>) {
        if self.view_bind_group.is_some() && self.view_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.view_bgl.as_ref() else { return };

        let view_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln sprite view ubo"),
            size: std::mem::size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln sprite view bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: view_ubo.as_entire_binding(),
            }],
        });

        self.view_ubo = Some(view_ubo);
        self.view_bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kiln sprite quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kiln sprite quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn ensure_white(&mut self, ctx: &RenderCtx<'_>) {
        if self.white.is_some() {
            return;
        }
        let (Some(bgl), Some(sampler)) = (self.texture_bgl.as_ref(), self.sampler.as_ref()) else {
            return;
        };
        let white = upload_texture(ctx, bgl, sampler, &TextureData::solid(1, 1, Color::WHITE), "kiln white texture");
        self.white = Some(white);
    }

    /// Uploads `handle`'s pixels on first use. Returns `false` when the cache
    /// has no data for it; the sprite then draws untextured.
    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>, cache: &ResourceCache, handle: &TextureHandle) -> bool {
        if self.textures.contains_key(&handle.id()) {
            return true;
        }
        let (Some(bgl), Some(sampler)) = (self.texture_bgl.as_ref(), self.sampler.as_ref()) else {
            return false;
        };
        let Some(data) = cache.texture_data(handle.id()) else {
            log::warn!("{}: no pixel data for texture {}", self.label, handle.path());
            return false;
        };

        let texture = upload_texture(ctx, bgl, sampler, data, handle.path());
        log::debug!("{}: uploaded {} ({}x{})", self.label, handle.path(), data.width(), data.height());
        self.textures.insert(handle.id(), texture);
        true
    }

    fn write_view_uniform(&mut self, ctx: &RenderCtx<'_>, view: ViewUniform) {
        let Some(ubo) = self.view_ubo.as_ref() else { return };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&view));
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required_instances: usize) {
        if required_instances <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required_instances.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<SpriteInstance>()) as u64;

        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln sprite instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

fn upload_texture(
    ctx: &RenderCtx<'_>,
    bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    data: &TextureData,
    label: &str,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: data.width(),
        height: data.height(),
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data.pixels(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width()),
            rows_per_image: Some(data.height()),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    GpuTexture {
        _texture: texture,
        bind_group,
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct SpriteInstance {
    origin: [f32; 2],
    size: [f32; 2],
    rotation: f32,
    object_id: u32,
    uv_min: [f32; 2],
    uv_size: [f32; 2],
    color: [f32; 4],
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32,   // rotation
        4 => Uint32,    // object id
        5 => Float32x2, // uv min
        6 => Float32x2, // uv size
        7 => Float32x4  // color
    ];

    fn new(object: Option<ObjectId>, rect: crate::coords::Rect, rotation: f32, uv: crate::coords::Rect, color: Color) -> Self {
        Self {
            origin: [rect.origin.x, rect.origin.y],
            size: [rect.size.x, rect.size.y],
            rotation,
            object_id: object.map_or(ObjectId::PICK_NONE, ObjectId::to_pick),
            uv_min: [uv.origin.x, uv.origin.y],
            uv_size: [uv.size.x, uv.size.y],
            color: color.to_array(),
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;

    #[test]
    fn instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 56);
    }

    #[test]
    fn untagged_sprites_carry_the_pick_sentinel() {
        let inst = SpriteInstance::new(None, Rect::new(0.0, 0.0, 1.0, 1.0), 0.0, Rect::unit(), Color::WHITE);
        assert_eq!(inst.object_id, ObjectId::PICK_NONE);
    }

    #[test]
    fn tagged_sprites_carry_their_object_id() {
        let id = ObjectId::from_pick(42);
        let inst = SpriteInstance::new(id, Rect::new(0.0, 0.0, 1.0, 1.0), 0.0, Rect::unit(), Color::WHITE);
        assert_eq!(ObjectId::from_pick(inst.object_id), id);
    }

    #[test]
    fn new_renderer_blends_and_has_no_shader() {
        let r = BatchRenderer::new("test");
        assert!(r.blending());
        assert!(r.shader().is_none());
    }
}
