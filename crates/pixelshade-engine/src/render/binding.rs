//! Fixed texture-unit table shared by every shader program.
//!
//! A unit `n` maps to `@binding(n)` for the texture and `@binding(n + 8)` for
//! its sampler. Uniform blocks sit at `@binding(16)`. Units are claimed once,
//! here, so no two passes ever collide within a frame.

/// Offset added to a unit index to find its sampler binding.
pub const SAMPLER_BINDING_OFFSET: u32 = 8;

/// Binding index of a program's named-uniform block.
pub const UNIFORM_BINDING: u32 = 16;

/// A fixed texture unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureUnit(pub u32);

impl TextureUnit {
    pub const DIFFUSE: Self = Self(0);
    pub const SPECULAR: Self = Self(1);
    pub const SHADOW_MAP: Self = Self(4);
    pub const OUTLINE_SCREEN: Self = Self(5);
    pub const OUTLINE_DEPTH: Self = Self(6);
    pub const UPSCALE_SCREEN: Self = Self(7);

    #[inline]
    pub const fn texture_binding(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn sampler_binding(self) -> u32 {
        self.0 + SAMPLER_BINDING_OFFSET
    }
}

/// How a slot's texture is read by the shader.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotKind {
    /// `texture_2d<f32>` with a nearest-filtering sampler.
    Color,
    /// `texture_depth_2d` with a comparison sampler (`textureSampleCompare`).
    DepthCompare,
    /// `texture_depth_2d` read with `textureLoad`, no sampler.
    DepthLoad,
}

impl SlotKind {
    pub fn has_sampler(self) -> bool {
        !matches!(self, SlotKind::DepthLoad)
    }
}

/// A named texture slot on a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureSlot {
    pub name: &'static str,
    pub unit: TextureUnit,
    pub kind: SlotKind,
}

impl TextureSlot {
    pub const fn new(name: &'static str, unit: TextureUnit, kind: SlotKind) -> Self {
        Self { name, unit, kind }
    }

    /// Layout entries for this slot (texture, then sampler if any).
    pub fn layout_entries(&self, visibility: wgpu::ShaderStages) -> Vec<wgpu::BindGroupLayoutEntry> {
        let sample_type = match self.kind {
            SlotKind::Color => wgpu::TextureSampleType::Float { filterable: true },
            SlotKind::DepthCompare | SlotKind::DepthLoad => wgpu::TextureSampleType::Depth,
        };

        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: self.unit.texture_binding(),
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }];

        if self.kind.has_sampler() {
            let ty = match self.kind {
                SlotKind::DepthCompare => wgpu::SamplerBindingType::Comparison,
                _ => wgpu::SamplerBindingType::Filtering,
            };
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: self.unit.sampler_binding(),
                visibility,
                ty: wgpu::BindingType::Sampler(ty),
                count: None,
            });
        }

        entries
    }
}

// ── per-program slot tables ─────────────────────────────────────────────────

pub const MATERIAL_SLOTS: [TextureSlot; 2] = [
    TextureSlot::new("DiffuseTexture", TextureUnit::DIFFUSE, SlotKind::Color),
    TextureSlot::new("SpecularTexture", TextureUnit::SPECULAR, SlotKind::Color),
];

pub const MESH_SLOTS: [TextureSlot; 1] = [TextureSlot::new(
    "ShadowMap",
    TextureUnit::SHADOW_MAP,
    SlotKind::DepthCompare,
)];

pub const OUTLINE_SLOTS: [TextureSlot; 2] = [
    TextureSlot::new("ScreenTexture", TextureUnit::OUTLINE_SCREEN, SlotKind::Color),
    TextureSlot::new("DepthTexture", TextureUnit::OUTLINE_DEPTH, SlotKind::DepthLoad),
];

pub const UPSCALE_SLOTS: [TextureSlot; 1] = [TextureSlot::new(
    "ScreenTexture",
    TextureUnit::UPSCALE_SCREEN,
    SlotKind::Color,
)];

/// Every slot claimed by the renderer, across all programs.
pub fn all_slots() -> impl Iterator<Item = &'static TextureSlot> {
    MATERIAL_SLOTS
        .iter()
        .chain(MESH_SLOTS.iter())
        .chain(OUTLINE_SLOTS.iter())
        .chain(UPSCALE_SLOTS.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn units_are_disjoint() {
        let mut seen = HashSet::new();
        for slot in all_slots() {
            assert!(seen.insert(slot.unit), "unit {} claimed twice", slot.unit.0);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn bindings_never_overlap_uniform_block() {
        let mut bindings = HashSet::new();
        for slot in all_slots() {
            assert!(bindings.insert(slot.unit.texture_binding()));
            if slot.kind.has_sampler() {
                assert!(bindings.insert(slot.unit.sampler_binding()));
            }
        }
        assert!(!bindings.contains(&UNIFORM_BINDING));
    }

    #[test]
    fn units_match_fixed_assignment() {
        assert_eq!(MATERIAL_SLOTS[0].unit.0, 0);
        assert_eq!(MATERIAL_SLOTS[1].unit.0, 1);
        assert_eq!(MESH_SLOTS[0].unit.0, 4);
        assert_eq!(OUTLINE_SLOTS[0].unit.0, 5);
        assert_eq!(OUTLINE_SLOTS[1].unit.0, 6);
        assert_eq!(UPSCALE_SLOTS[0].unit.0, 7);
    }

    #[test]
    fn depth_load_slot_has_no_sampler() {
        let entries = OUTLINE_SLOTS[1].layout_entries(wgpu::ShaderStages::FRAGMENT);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].binding, 6);

        let entries = MESH_SLOTS[0].layout_entries(wgpu::ShaderStages::FRAGMENT);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].binding, 12);
    }
}
