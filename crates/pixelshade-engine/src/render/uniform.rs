//! Named uniforms.
//!
//! A program declares its uniforms as `(name, kind)` pairs. `UniformLayout`
//! assigns offsets following WGSL's uniform address-space rules, and
//! `UniformData` keeps the CPU-side byte image that `UniformBlock` uploads.

use std::collections::HashSet;

use glam::{Mat4, Vec3};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Float,
    Int,
    Vec3,
    Mat4,
}

impl UniformKind {
    pub const fn align(self) -> u32 {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Vec3 | UniformKind::Mat4 => 16,
        }
    }

    pub const fn size(self) -> u32 {
        match self {
            UniformKind::Float | UniformKind::Int => 4,
            UniformKind::Vec3 => 12,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: UniformKind,
    pub offset: u32,
}

/// Ordered uniform declarations with WGSL offsets.
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    end: u32,
}

impl UniformLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. Names must be unique within a layout.
    pub fn with(mut self, name: &'static str, kind: UniformKind) -> Self {
        debug_assert!(self.field(name).is_none(), "duplicate uniform `{name}`");
        let offset = align_to(self.end, kind.align());
        self.fields.push(UniformField { name, kind, offset });
        self.end = offset + kind.size();
        self
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Buffer size in bytes: the struct size rounded to 16 (never zero).
    pub fn size(&self) -> u32 {
        align_to(self.end, 16).max(16)
    }
}

#[inline]
fn align_to(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// "Set uniform value by name".
///
/// Unknown names and kind mismatches are ignored; implementations report
/// each offending name once.
pub trait UniformSink {
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_vec3(&mut self, name: &str, value: Vec3);
    fn set_mat4(&mut self, name: &str, value: &Mat4);
}

/// CPU byte image of a uniform block.
#[derive(Debug, Clone)]
pub struct UniformData {
    layout: UniformLayout,
    bytes: Vec<u8>,
    dirty: bool,
    warned: HashSet<String>,
}

impl UniformData {
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size() as usize];
        Self {
            layout,
            bytes,
            dirty: true,
            warned: HashSet::new(),
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.read::<4>(name, UniformKind::Float).map(f32::from_ne_bytes)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.read::<4>(name, UniformKind::Int).map(i32::from_ne_bytes)
    }

    pub fn get_vec3(&self, name: &str) -> Option<Vec3> {
        let raw = self.read::<12>(name, UniformKind::Vec3)?;
        let v: [f32; 3] = bytemuck::cast(raw);
        Some(Vec3::from_array(v))
    }

    pub fn get_mat4(&self, name: &str) -> Option<Mat4> {
        let raw = self.read::<64>(name, UniformKind::Mat4)?;
        let m: [f32; 16] = bytemuck::cast(raw);
        Some(Mat4::from_cols_array(&m))
    }

    fn read<const N: usize>(&self, name: &str, kind: UniformKind) -> Option<[u8; N]> {
        let field = self.layout.field(name).filter(|f| f.kind == kind)?;
        let start = field.offset as usize;
        self.bytes[start..start + N].try_into().ok()
    }

    fn write(&mut self, name: &str, kind: UniformKind, data: &[u8]) {
        let Some(field) = self.layout.field(name) else {
            self.warn_once(name, "no such uniform");
            return;
        };
        if field.kind != kind {
            let expected = field.kind;
            self.warn_once(name, &format!("expected {expected:?}, got {kind:?}"));
            return;
        }

        let start = field.offset as usize;
        let slot = &mut self.bytes[start..start + data.len()];
        if slot != data {
            slot.copy_from_slice(data);
            self.dirty = true;
        }
    }

    fn warn_once(&mut self, name: &str, what: &str) {
        if self.warned.insert(name.to_string()) {
            log::warn!("uniform `{name}` ignored: {what}");
        }
    }
}

impl UniformSink for UniformData {
    fn set_float(&mut self, name: &str, value: f32) {
        self.write(name, UniformKind::Float, &value.to_ne_bytes());
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.write(name, UniformKind::Int, &value.to_ne_bytes());
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.write(name, UniformKind::Vec3, bytemuck::bytes_of(&value.to_array()));
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.write(name, UniformKind::Mat4, bytemuck::bytes_of(&value.to_cols_array()));
    }
}

/// `UniformData` plus the GPU buffer it is uploaded into.
pub struct UniformBlock {
    data: UniformData,
    buffer: wgpu::Buffer,
}

impl UniformBlock {
    pub fn new(device: &wgpu::Device, label: &str, layout: UniformLayout) -> Self {
        let data = UniformData::new(layout);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: data.layout().size() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { data, buffer }
    }

    pub fn data(&self) -> &UniformData {
        &self.data
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Uploads the byte image if anything changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if !self.data.is_dirty() {
            return;
        }
        queue.write_buffer(&self.buffer, 0, self.data.bytes());
        self.data.mark_clean();
    }

    pub fn layout_entry(&self, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: super::binding::UNIFORM_BINDING,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(self.data.layout().size() as u64),
            },
            count: None,
        }
    }
}

impl Drop for UniformBlock {
    fn drop(&mut self) {
        self.buffer.destroy();
    }
}

impl UniformSink for UniformBlock {
    fn set_float(&mut self, name: &str, value: f32) {
        self.data.set_float(name, value);
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.data.set_int(name, value);
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.data.set_vec3(name, value);
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.data.set_mat4(name, value);
    }
}

// ── program layouts ─────────────────────────────────────────────────────────

/// Uniforms of the main shading program (group 0).
pub fn mesh_uniforms() -> UniformLayout {
    UniformLayout::new()
        .with("MVP", UniformKind::Mat4)
        .with("MV", UniformKind::Mat4)
        .with("LightSpaceMatrix", UniformKind::Mat4)
        .with("LightPosition", UniformKind::Vec3)
        .with("LightDirection", UniformKind::Vec3)
        .with("LightConeAngle", UniformKind::Float)
}

/// Per-mesh material uniforms (group 1 of the main shading program).
pub fn material_uniforms() -> UniformLayout {
    UniformLayout::new()
        .with("BaseColor", UniformKind::Vec3)
        .with("SpecularColor", UniformKind::Vec3)
        .with("Shine", UniformKind::Float)
        .with("Ambient", UniformKind::Vec3)
}

pub fn shadow_uniforms() -> UniformLayout {
    UniformLayout::new().with("MVP", UniformKind::Mat4)
}

pub fn outline_uniforms() -> UniformLayout {
    UniformLayout::new()
        .with("TogglePalette", UniformKind::Int)
        .with("Dither", UniformKind::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(layout: &UniformLayout, name: &str) -> u32 {
        layout.field(name).map(|f| f.offset).unwrap()
    }

    #[test]
    fn mesh_layout_follows_wgsl_rules() {
        let l = mesh_uniforms();
        assert_eq!(offset(&l, "MVP"), 0);
        assert_eq!(offset(&l, "MV"), 64);
        assert_eq!(offset(&l, "LightSpaceMatrix"), 128);
        assert_eq!(offset(&l, "LightPosition"), 192);
        assert_eq!(offset(&l, "LightDirection"), 208);
        // A scalar packs into the tail of the preceding vec3.
        assert_eq!(offset(&l, "LightConeAngle"), 220);
        assert_eq!(l.size(), 224);
    }

    #[test]
    fn material_layout_packs_shine_after_vec3() {
        let l = material_uniforms();
        assert_eq!(offset(&l, "BaseColor"), 0);
        assert_eq!(offset(&l, "SpecularColor"), 16);
        assert_eq!(offset(&l, "Shine"), 28);
        assert_eq!(offset(&l, "Ambient"), 32);
        assert_eq!(l.size(), 48);
    }

    #[test]
    fn small_layouts_round_to_16() {
        assert_eq!(outline_uniforms().size(), 16);
        assert_eq!(UniformLayout::new().size(), 16);
        assert_eq!(shadow_uniforms().size(), 64);
    }

    #[test]
    fn set_and_read_back() {
        let mut d = UniformData::new(mesh_uniforms());
        d.mark_clean();

        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        d.set_mat4("MV", &m);
        d.set_vec3("LightPosition", Vec3::new(0.0, -50.0, 40.0));
        d.set_float("LightConeAngle", 45.0);

        assert!(d.is_dirty());
        assert_eq!(d.get_mat4("MV"), Some(m));
        assert_eq!(d.get_vec3("LightPosition"), Some(Vec3::new(0.0, -50.0, 40.0)));
        assert_eq!(d.get_float("LightConeAngle"), Some(45.0));
        assert_eq!(d.get_mat4("MVP"), Some(Mat4::ZERO));
    }

    #[test]
    fn unchanged_value_keeps_block_clean() {
        let mut d = UniformData::new(outline_uniforms());
        d.set_int("TogglePalette", 1);
        d.mark_clean();

        d.set_int("TogglePalette", 1);
        assert!(!d.is_dirty());

        d.set_int("TogglePalette", 0);
        assert!(d.is_dirty());
    }

    #[test]
    fn unknown_and_mistyped_names_are_ignored() {
        let mut d = UniformData::new(outline_uniforms());
        d.mark_clean();

        d.set_float("Missing", 1.0);
        d.set_float("Missing", 2.0);
        d.set_float("TogglePalette", 1.0);

        assert!(!d.is_dirty());
        assert_eq!(d.get_int("TogglePalette"), Some(0));
        assert_eq!(d.get_float("TogglePalette"), None);
    }
}
