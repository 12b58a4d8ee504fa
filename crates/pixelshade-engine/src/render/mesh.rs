//! GPU meshes.
//!
//! Geometry is flattened per face corner: corner `j` of face `i` becomes
//! vertex `i * 3 + j`, so the index buffer is simply `0..faces * 3`.

use std::path::Path;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;

use super::binding::{MATERIAL_SLOTS, UNIFORM_BINDING};
use super::program::ShaderPrograms;
use super::target::GpuTexture;
use super::uniform::{UniformBlock, UniformSink, material_uniforms};
use super::RenderCtx;
use crate::assets::{MeshSource, ObjMaterial, decode_image, load_obj, upload_rgba8};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Surface constants pushed as uniforms before each draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
    pub ambient: Vec3,
}

impl Material {
    /// Used for meshes whose source declares no material.
    pub const FALLBACK: Self = Self {
        diffuse: Vec3::new(0.15, 0.15, 0.45),
        specular: Vec3::new(0.65, 0.65, 0.65),
        shininess: 90.0,
        ambient: Vec3::new(0.21, 0.21, 0.21),
    };
}

impl From<&ObjMaterial> for Material {
    fn from(m: &ObjMaterial) -> Self {
        Self {
            diffuse: m.diffuse,
            specular: m.specular,
            shininess: m.shininess,
            ambient: m.ambient,
        }
    }
}

/// Pushes `material`, or the fallback when there is none.
pub fn push_material(material: Option<&Material>, sink: &mut dyn UniformSink) {
    let m = material.unwrap_or(&Material::FALLBACK);
    sink.set_vec3("BaseColor", m.diffuse);
    sink.set_vec3("SpecularColor", m.specular);
    sink.set_float("Shine", m.shininess);
    sink.set_vec3("Ambient", m.ambient);
}

/// CPU-side mesh ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// First material of the source, if any.
    pub material: Option<Material>,
}

impl MeshData {
    pub fn from_source(source: &MeshSource) -> Self {
        let normals = source.compute_normals();
        let mut vertices = Vec::with_capacity(source.faces.len() * 3);
        let mut indices = Vec::with_capacity(source.faces.len() * 3);

        for (i, face) in source.faces.iter().enumerate() {
            for j in 0..3 {
                let p = face.positions[j] as usize;
                let uv = face.tex_coords[j]
                    .map(|t| source.tex_coords[t as usize])
                    .unwrap_or(Vec2::ZERO);

                vertices.push(MeshVertex {
                    position: source.positions[p].to_array(),
                    normal: normals[p].to_array(),
                    uv: uv.to_array(),
                });
                indices.push((i * 3 + j) as u32);
            }
        }

        Self {
            vertices,
            indices,
            material: source.materials.first().map(Material::from),
        }
    }

    pub fn face_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }
}

/// A drawable mesh with its material bindings.
pub struct Mesh {
    label: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    face_count: u32,
    material: Option<Material>,
    material_block: UniformBlock,
    material_group: wgpu::BindGroup,
    _maps: Vec<GpuTexture>,
    casts_shadow: bool,
}

impl Mesh {
    /// Loads an OBJ file (and its materials and texture maps).
    pub fn load(
        ctx: &RenderCtx<'_>,
        programs: &ShaderPrograms,
        path: &Path,
        casts_shadow: bool,
    ) -> Result<Self> {
        let source =
            load_obj(path).with_context(|| format!("failed to load mesh {}", path.display()))?;
        Self::from_source(ctx, programs, &source, casts_shadow, &path.display().to_string())
    }

    /// Uploads parsed geometry. Texture maps of the first material are decoded here.
    pub fn from_source(
        ctx: &RenderCtx<'_>,
        programs: &ShaderPrograms,
        source: &MeshSource,
        casts_shadow: bool,
        label: &str,
    ) -> Result<Self> {
        let first = source.materials.first();
        let diffuse = first
            .and_then(|m| m.diffuse_map.as_deref())
            .map(|p| load_map(ctx, p))
            .transpose()?;
        let specular = first
            .and_then(|m| m.specular_map.as_deref())
            .map(|p| load_map(ctx, p))
            .transpose()?;

        let data = MeshData::from_source(source);
        Ok(Self::new(ctx, programs, &data, diffuse, specular, casts_shadow, label))
    }

    /// Uploads `data`. Missing maps bind the shared white texture.
    pub fn new(
        ctx: &RenderCtx<'_>,
        programs: &ShaderPrograms,
        data: &MeshData,
        diffuse_map: Option<GpuTexture>,
        specular_map: Option<GpuTexture>,
        casts_shadow: bool,
        label: &str,
    ) -> Self {
        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut material_block = UniformBlock::new(ctx.device, label, material_uniforms());
        push_material(data.material.as_ref(), &mut material_block);

        let diffuse_view = diffuse_map.as_ref().map_or(programs.white_view(), GpuTexture::view);
        let specular_view = specular_map.as_ref().map_or(programs.white_view(), GpuTexture::view);
        let sampler = programs.material_sampler();

        let [diffuse_slot, specular_slot] = MATERIAL_SLOTS;
        let material_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: programs.material_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: material_block.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: diffuse_slot.unit.texture_binding(),
                    resource: wgpu::BindingResource::TextureView(diffuse_view),
                },
                wgpu::BindGroupEntry {
                    binding: diffuse_slot.unit.sampler_binding(),
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: specular_slot.unit.texture_binding(),
                    resource: wgpu::BindingResource::TextureView(specular_view),
                },
                wgpu::BindGroupEntry {
                    binding: specular_slot.unit.sampler_binding(),
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            label: label.to_string(),
            vertex_buffer,
            index_buffer,
            face_count: data.face_count(),
            material: data.material,
            material_block,
            material_group,
            _maps: diffuse_map.into_iter().chain(specular_map).collect(),
            casts_shadow,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    pub fn set_casts_shadow(&mut self, casts_shadow: bool) {
        self.casts_shadow = casts_shadow;
    }

    /// Material uniforms as last pushed.
    pub fn material_uniforms(&self) -> &UniformBlock {
        &self.material_block
    }

    /// Pushes this mesh's material and binds it as group 1 of the shading program.
    pub fn bind_material_properties(&mut self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) {
        push_material(self.material.as_ref(), &mut self.material_block);
        self.material_block.flush(queue);
        pass.set_bind_group(1, &self.material_group, &[]);
    }

    /// Issues one indexed draw over every face.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.face_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.face_count * 3, 0, 0..1);
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

fn load_map(ctx: &RenderCtx<'_>, path: &Path) -> Result<GpuTexture> {
    let image = decode_image(path)?;
    Ok(upload_rgba8(ctx, &path.display().to_string(), &image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::parse_obj;
    use crate::render::uniform::UniformData;

    #[test]
    fn vertex_stride_is_eight_floats() {
        assert_eq!(MeshVertex::layout().array_stride, 32);
    }

    #[test]
    fn corners_are_flattened_in_face_order() {
        let src = parse_obj("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0.5 0.25\nf 1/1 2/1 3/1 4/1\n")
            .unwrap();
        let data = MeshData::from_source(&src);

        assert_eq!(data.face_count(), 2);
        assert_eq!(data.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(data.vertices.len(), 6);
        // Second triangle is (1, 3, 4) in file numbering.
        assert_eq!(data.vertices[4].position, [1.0, 1.0, 0.0]);
        assert_eq!(data.vertices[5].position, [0.0, 1.0, 0.0]);
        assert_eq!(data.vertices[3].uv, [0.5, 0.25]);
        assert_eq!(data.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_texcoords_default_to_zero() {
        let src = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let data = MeshData::from_source(&src);
        assert!(data.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
    }

    #[test]
    fn zero_materials_pushes_fallback() {
        let src = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let data = MeshData::from_source(&src);
        assert_eq!(data.material, None);

        let mut sink = UniformData::new(material_uniforms());
        push_material(data.material.as_ref(), &mut sink);

        assert_eq!(sink.get_vec3("BaseColor"), Some(Vec3::new(0.15, 0.15, 0.45)));
        assert_eq!(sink.get_vec3("SpecularColor"), Some(Vec3::splat(0.65)));
        assert_eq!(sink.get_float("Shine"), Some(90.0));
        assert_eq!(sink.get_vec3("Ambient"), Some(Vec3::splat(0.21)));
    }

    #[test]
    fn first_material_wins() {
        let mut src = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        src.materials = crate::assets::parse_mtl(
            "newmtl a\nKd 1 0 0\nKs 0 1 0\nKa 0 0 1\nNs 12\nnewmtl b\nKd 0 0 0\n",
        )
        .unwrap();
        let data = MeshData::from_source(&src);

        let mut sink = UniformData::new(material_uniforms());
        push_material(data.material.as_ref(), &mut sink);

        assert_eq!(sink.get_vec3("BaseColor"), Some(Vec3::X));
        assert_eq!(sink.get_vec3("SpecularColor"), Some(Vec3::Y));
        assert_eq!(sink.get_vec3("Ambient"), Some(Vec3::Z));
        assert_eq!(sink.get_float("Shine"), Some(12.0));
    }
}
