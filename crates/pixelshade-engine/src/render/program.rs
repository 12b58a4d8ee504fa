//! Shader programs.
//!
//! A `ShaderProgram` is a compiled WGSL module, its pipeline, the group-0
//! layout (named uniform block plus fixed texture units), and a cached group-0
//! bind group. The cache is keyed by the generations of the textures it
//! references, so a resized target invalidates it without pointer comparisons.

use std::hash::{DefaultHasher, Hash, Hasher};

use glam::{Mat4, Vec3};

use super::binding::{
    MATERIAL_SLOTS, MESH_SLOTS, OUTLINE_SLOTS, SlotKind, TextureSlot, UNIFORM_BINDING,
    UPSCALE_SLOTS,
};
use super::mesh::MeshVertex;
use super::postfx::{OUTLINE_TARGET, SCENE_TARGET};
use super::quad::QuadVertex;
use super::shadow::SHADOW_TARGET;
use super::target::GpuTexture;
use super::uniform::{
    UniformBlock, UniformLayout, UniformSink, material_uniforms, mesh_uniforms, outline_uniforms,
    shadow_uniforms,
};
use super::RenderCtx;
use crate::assets::white_texture;

/// WGSL template for the outline pass; the palette is substituted at the marker.
pub const OUTLINE_TEMPLATE: &str = include_str!("shaders/outline.wgsl");

const MESH_SHADER: &str = include_str!("shaders/mesh.wgsl");
const SHADOW_SHADER: &str = include_str!("shaders/shadow.wgsl");
const UPSCALE_SHADER: &str = include_str!("shaders/upscale.wgsl");

pub const DEFAULT_TOGGLE_PALETTE: i32 = 1;
pub const DEFAULT_DITHER: f32 = 0.003;

/// Combines texture generations into a bind-group cache key.
pub fn binding_key(generations: &[u64]) -> u64 {
    let mut h = DefaultHasher::new();
    generations.hash(&mut h);
    h.finish()
}

struct PipelineSpec<'a> {
    label: &'static str,
    source: &'a str,
    uniforms: Option<UniformLayout>,
    slots: &'static [TextureSlot],
    extra_groups: &'a [&'a wgpu::BindGroupLayout],
    vertex: wgpu::VertexBufferLayout<'static>,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    color: Option<wgpu::TextureFormat>,
    depth: Option<wgpu::TextureFormat>,
}

pub struct ShaderProgram {
    label: &'static str,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniforms: Option<UniformBlock>,
    slots: &'static [TextureSlot],
    samplers: Vec<Option<wgpu::Sampler>>,
    bindings: Option<(u64, wgpu::BindGroup)>,
}

impl ShaderProgram {
    fn build(device: &wgpu::Device, spec: PipelineSpec<'_>) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(spec.label),
            source: wgpu::ShaderSource::Wgsl(spec.source.into()),
        });

        let uniforms = spec
            .uniforms
            .map(|layout| UniformBlock::new(device, spec.label, layout));

        let stages = wgpu::ShaderStages::VERTEX_FRAGMENT;
        let mut entries = Vec::new();
        if let Some(u) = &uniforms {
            entries.push(u.layout_entry(stages));
        }
        for slot in spec.slots {
            entries.extend(slot.layout_entries(wgpu::ShaderStages::FRAGMENT));
        }

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(spec.label),
            entries: &entries,
        });

        let mut groups = vec![&layout];
        groups.extend_from_slice(spec.extra_groups);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(spec.label),
            bind_group_layouts: &groups,
            immediate_size: 0,
        });

        let targets = spec.color.map(|format| wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        });
        let targets: &[Option<wgpu::ColorTargetState>] = if targets.is_some() {
            std::slice::from_ref(&targets)
        } else {
            &[]
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[spec.vertex],
            },

            fragment: spec.color.map(|_| wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets,
            }),

            primitive: wgpu::PrimitiveState {
                topology: spec.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: spec.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: spec.depth.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let samplers = spec
            .slots
            .iter()
            .map(|slot| create_sampler(device, spec.label, slot.kind))
            .collect();

        log::debug!("built shader program `{}`", spec.label);

        Self {
            label: spec.label,
            pipeline,
            layout,
            uniforms,
            slots: spec.slots,
            samplers,
            bindings: None,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn slots(&self) -> &'static [TextureSlot] {
        self.slots
    }

    pub fn uniforms(&self) -> Option<&UniformBlock> {
        self.uniforms.as_ref()
    }

    /// Uploads pending uniform changes.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if let Some(u) = &mut self.uniforms {
            u.flush(queue);
        }
    }

    /// Rebuilds the group-0 bind group unless one already exists for `key`.
    ///
    /// `views` are given in slot order.
    pub fn prepare_bindings(
        &mut self,
        device: &wgpu::Device,
        key: u64,
        views: &[&wgpu::TextureView],
    ) {
        if matches!(&self.bindings, Some((k, _)) if *k == key) {
            return;
        }
        debug_assert_eq!(views.len(), self.slots.len(), "`{}` slot count", self.label);

        let mut entries = Vec::new();
        if let Some(u) = &self.uniforms {
            entries.push(wgpu::BindGroupEntry {
                binding: UNIFORM_BINDING,
                resource: u.buffer().as_entire_binding(),
            });
        }
        for ((slot, view), sampler) in self.slots.iter().zip(views).zip(&self.samplers) {
            entries.push(wgpu::BindGroupEntry {
                binding: slot.unit.texture_binding(),
                resource: wgpu::BindingResource::TextureView(view),
            });
            if let Some(sampler) = sampler {
                entries.push(wgpu::BindGroupEntry {
                    binding: slot.unit.sampler_binding(),
                    resource: wgpu::BindingResource::Sampler(sampler),
                });
            }
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.layout,
            entries: &entries,
        });
        log::trace!("`{}` bindings rebuilt", self.label);
        self.bindings = Some((key, bind_group));
    }

    /// Sets the pipeline and group 0 on `pass`.
    ///
    /// Returns `false` when bindings were never prepared.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) -> bool {
        let Some((_, bind_group)) = &self.bindings else {
            log::warn!("`{}` bound before its bindings were prepared", self.label);
            return false;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        true
    }

    fn sink(&mut self, name: &str) -> Option<&mut UniformBlock> {
        if self.uniforms.is_none() {
            log::warn!("`{}` has no uniforms; `{name}` ignored", self.label);
        }
        self.uniforms.as_mut()
    }
}

impl UniformSink for ShaderProgram {
    fn set_float(&mut self, name: &str, value: f32) {
        if let Some(u) = self.sink(name) {
            u.set_float(name, value);
        }
    }

    fn set_int(&mut self, name: &str, value: i32) {
        if let Some(u) = self.sink(name) {
            u.set_int(name, value);
        }
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        if let Some(u) = self.sink(name) {
            u.set_vec3(name, value);
        }
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        if let Some(u) = self.sink(name) {
            u.set_mat4(name, value);
        }
    }
}

fn create_sampler(device: &wgpu::Device, label: &str, kind: SlotKind) -> Option<wgpu::Sampler> {
    let desc = match kind {
        SlotKind::Color => wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        },
        SlotKind::DepthCompare => wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        },
        SlotKind::DepthLoad => return None,
    };
    Some(device.create_sampler(&desc))
}

/// The four programs of the frame, plus the shared material resources.
pub struct ShaderPrograms {
    pub mesh: ShaderProgram,
    pub shadow: ShaderProgram,
    pub outline: ShaderProgram,
    pub upscale: ShaderProgram,

    material_layout: wgpu::BindGroupLayout,
    material_sampler: wgpu::Sampler,
    white: GpuTexture,
    fallback_depth: GpuTexture,
}

impl ShaderPrograms {
    /// Builds all programs. `outline_source` is the outline template with the
    /// palette already substituted.
    pub fn new(ctx: &RenderCtx<'_>, outline_source: &str) -> Self {
        let device = ctx.device;

        let mut material_entries = vec![wgpu::BindGroupLayoutEntry {
            binding: UNIFORM_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(material_uniforms().size() as u64),
            },
            count: None,
        }];
        for slot in &MATERIAL_SLOTS {
            material_entries.extend(slot.layout_entries(wgpu::ShaderStages::FRAGMENT));
        }
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixelshade material bgl"),
            entries: &material_entries,
        });

        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("pixelshade material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let scene_depth = SCENE_TARGET.depth.map(|d| d.format);
        let shadow_depth = SHADOW_TARGET.depth.map(|d| d.format);

        let mesh = ShaderProgram::build(
            device,
            PipelineSpec {
                label: "pixelshade mesh program",
                source: MESH_SHADER,
                uniforms: Some(mesh_uniforms()),
                slots: &MESH_SLOTS,
                extra_groups: &[&material_layout],
                vertex: MeshVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                color: SCENE_TARGET.color,
                depth: scene_depth,
            },
        );

        let shadow = ShaderProgram::build(
            device,
            PipelineSpec {
                label: "pixelshade shadow program",
                source: SHADOW_SHADER,
                uniforms: Some(shadow_uniforms()),
                slots: &[],
                extra_groups: &[],
                vertex: MeshVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Front),
                color: None,
                depth: shadow_depth,
            },
        );

        let mut outline = ShaderProgram::build(
            device,
            PipelineSpec {
                label: "pixelshade outline program",
                source: outline_source,
                uniforms: Some(outline_uniforms()),
                slots: &OUTLINE_SLOTS,
                extra_groups: &[],
                vertex: QuadVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                color: OUTLINE_TARGET.color,
                depth: None,
            },
        );
        outline.set_int("TogglePalette", DEFAULT_TOGGLE_PALETTE);
        outline.set_float("Dither", DEFAULT_DITHER);

        let upscale = ShaderProgram::build(
            device,
            PipelineSpec {
                label: "pixelshade upscale program",
                source: UPSCALE_SHADER,
                uniforms: None,
                slots: &UPSCALE_SLOTS,
                extra_groups: &[],
                vertex: QuadVertex::layout(),
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                color: Some(ctx.surface_format),
                depth: None,
            },
        );

        Self {
            mesh,
            shadow,
            outline,
            upscale,
            material_layout,
            material_sampler,
            white: white_texture(ctx),
            fallback_depth: cleared_depth_texture(ctx),
        }
    }

    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    pub fn material_sampler(&self) -> &wgpu::Sampler {
        &self.material_sampler
    }

    /// 1x1 white texture for materials without maps.
    pub fn white_view(&self) -> &wgpu::TextureView {
        self.white.view()
    }

    /// 1x1 depth texture at the far plane, bound when a real depth map is missing.
    pub fn fallback_depth_view(&self) -> &wgpu::TextureView {
        self.fallback_depth.view()
    }

    /// Mesh group 0: uniforms plus the shadow map (or the far-plane fallback).
    pub fn prepare_mesh_bindings(
        &mut self,
        device: &wgpu::Device,
        key: u64,
        shadow_map: Option<&wgpu::TextureView>,
    ) {
        let shadow_map = shadow_map.unwrap_or(self.fallback_depth.view());
        self.mesh.prepare_bindings(device, key, &[shadow_map]);
    }

    /// Outline group 0: the downscaled scene and the edge-detection depth.
    pub fn prepare_outline_bindings(
        &mut self,
        device: &wgpu::Device,
        key: u64,
        screen: &wgpu::TextureView,
        depth: Option<&wgpu::TextureView>,
    ) {
        let depth = depth.unwrap_or(self.fallback_depth.view());
        self.outline.prepare_bindings(device, key, &[screen, depth]);
    }

    /// Uploads pending uniform changes of every program.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.mesh.flush(queue);
        self.shadow.flush(queue);
        self.outline.flush(queue);
        self.upscale.flush(queue);
    }
}

fn cleared_depth_texture(ctx: &RenderCtx<'_>) -> GpuTexture {
    let depth = GpuTexture::new(
        ctx.device,
        &wgpu::TextureDescriptor {
            label: Some("pixelshade fallback depth"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
    );

    // Depth formats cannot be written by copies; clear through a pass instead.
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pixelshade fallback depth clear"),
        });
    drop(encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("pixelshade fallback depth clear"),
        color_attachments: &[],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth.view(),
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    }));
    ctx.queue.submit([encoder.finish()]);

    depth
}
