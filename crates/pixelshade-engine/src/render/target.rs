//! Offscreen render targets.
//!
//! A target is a color and/or depth attachment pair sized to one resolution.
//! Resizing destroys the old textures before the new ones are allocated; an
//! unchanged size is a no-op. Allocation failures leave the target degraded
//! (0x0, nothing attached): the frame keeps running and the pass that would
//! have drawn into it is skipped.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, bail};

use super::RenderCtx;

/// A GPU texture and its default view.
///
/// Dropping it destroys the device texture.
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn new(device: &wgpu::Device, desc: &wgpu::TextureDescriptor<'_>) -> Self {
        let texture = device.create_texture(desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

/// Depth attachment of a render target.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DepthAttachment {
    pub format: wgpu::TextureFormat,
    /// Whether a later pass samples this depth texture.
    pub sampled: bool,
}

impl DepthAttachment {
    /// Depth-only buffer that a later pass samples (shadow map, outline edges).
    pub const SAMPLED_DEPTH: Self = Self {
        format: wgpu::TextureFormat::Depth32Float,
        sampled: true,
    };

    fn usage(&self) -> wgpu::TextureUsages {
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if self.sampled {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC;
        }
        usage
    }
}

/// What a target is made of.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RenderTargetDesc {
    pub label: &'static str,
    pub color: Option<wgpu::TextureFormat>,
    pub depth: Option<DepthAttachment>,
}

// COPY_SRC allows reading targets back (captures, tests).
const COLOR_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING)
    .union(wgpu::TextureUsages::COPY_SRC);

/// Clear behavior when a target is bound.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetClear {
    /// `None` keeps the existing color contents.
    pub color: Option<wgpu::Color>,
    /// Clear depth to 1.0 (and stencil to 0).
    pub depth: bool,
}

impl TargetClear {
    pub const DEPTH_ONLY: Self = Self {
        color: None,
        depth: true,
    };

    pub fn color(color: wgpu::Color) -> Self {
        Self {
            color: Some(color),
            depth: false,
        }
    }

    pub fn all(color: wgpu::Color) -> Self {
        Self {
            color: Some(color),
            depth: true,
        }
    }
}

// Starts at 1 so 0 always means "never allocated".
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

pub struct RenderTarget {
    desc: RenderTargetDesc,
    color: Option<GpuTexture>,
    depth: Option<GpuTexture>,
    width: u32,
    height: u32,
    generation: u64,
}

impl RenderTarget {
    /// An unallocated (0x0) target.
    pub fn new(desc: RenderTargetDesc) -> Self {
        Self {
            desc,
            color: None,
            depth: None,
            width: 0,
            height: 0,
            generation: 0,
        }
    }

    /// A target allocated at `width`x`height`.
    pub fn with_size(ctx: &RenderCtx<'_>, desc: RenderTargetDesc, width: u32, height: u32) -> Self {
        let mut target = Self::new(desc);
        target.create(ctx, width, height);
        target
    }

    pub fn desc(&self) -> &RenderTargetDesc {
        &self.desc
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_allocated(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Unique across all targets, renewed on every successful allocation. Bind
    /// groups that reference this target's views are stale once it changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn color_view(&self) -> Option<&wgpu::TextureView> {
        self.color.as_ref().map(GpuTexture::view)
    }

    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth.as_ref().map(GpuTexture::view)
    }

    pub fn color_texture(&self) -> Option<&wgpu::Texture> {
        self.color.as_ref().map(GpuTexture::texture)
    }

    pub fn depth_texture(&self) -> Option<&wgpu::Texture> {
        self.depth.as_ref().map(GpuTexture::texture)
    }

    /// Whether `resize(width, height)` would reallocate.
    pub fn needs_realloc(&self, width: u32, height: u32) -> bool {
        (self.width, self.height) != (width, height)
    }

    /// Destroys the current attachments and allocates new ones.
    ///
    /// Returns `false` (and logs) when the device cannot provide the target; the
    /// target is then 0x0 with nothing attached.
    pub fn create(&mut self, ctx: &RenderCtx<'_>, width: u32, height: u32) -> bool {
        self.release();

        if let Err(e) = self.validate(ctx, width, height) {
            log::error!("render target `{}` unavailable: {e:#}", self.desc.label);
            return false;
        }

        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        self.color = self.desc.color.map(|format| {
            GpuTexture::new(
                ctx.device,
                &wgpu::TextureDescriptor {
                    label: Some(self.desc.label),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: COLOR_USAGE,
                    view_formats: &[],
                },
            )
        });

        self.depth = self.desc.depth.map(|depth| {
            GpuTexture::new(
                ctx.device,
                &wgpu::TextureDescriptor {
                    label: Some(self.desc.label),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: depth.format,
                    usage: depth.usage(),
                    view_formats: &[],
                },
            )
        });

        self.width = width;
        self.height = height;
        self.generation = next_generation();

        log::debug!(
            "render target `{}` allocated at {width}x{height} (generation {})",
            self.desc.label,
            self.generation
        );
        true
    }

    /// Reallocates only when the size differs from the current one.
    ///
    /// Returns `true` when a reallocation happened.
    pub fn resize(&mut self, ctx: &RenderCtx<'_>, width: u32, height: u32) -> bool {
        if !self.needs_realloc(width, height) {
            return false;
        }
        self.create(ctx, width, height);
        true
    }

    /// Destroys all attachments. Safe to call on an unallocated target.
    pub fn release(&mut self) {
        self.color = None;
        self.depth = None;
        self.width = 0;
        self.height = 0;
    }

    fn validate(&self, ctx: &RenderCtx<'_>, width: u32, height: u32) -> Result<()> {
        check_extent(width, height, ctx.device.limits().max_texture_dimension_2d)?;

        if let Some(format) = self.desc.color {
            check_format(ctx.adapter, format, COLOR_USAGE)?;
        }
        if let Some(depth) = self.desc.depth {
            check_format(ctx.adapter, depth.format, depth.usage())?;
        }
        Ok(())
    }

    /// Opens a render pass on this target with the viewport covering it.
    ///
    /// Returns `None` when the target is degraded. Dropping the pass ends it.
    pub fn bind<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: TargetClear,
    ) -> Option<wgpu::RenderPass<'e>> {
        if !self.is_allocated() {
            return None;
        }

        let color_attachment = self.color_view().map(|view| wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: match clear.color {
                    Some(c) => wgpu::LoadOp::Clear(c),
                    None => wgpu::LoadOp::Load,
                },
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        });

        let depth_attachment = match (self.depth_view(), self.desc.depth) {
            (Some(view), Some(depth)) => Some(wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: if clear.depth {
                        wgpu::LoadOp::Clear(1.0)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: depth.format.has_stencil_aspect().then_some(wgpu::Operations {
                    load: if clear.depth {
                        wgpu::LoadOp::Clear(0)
                    } else {
                        wgpu::LoadOp::Load
                    },
                    store: wgpu::StoreOp::Store,
                }),
            }),
            _ => None,
        };

        let color_attachments: &[Option<wgpu::RenderPassColorAttachment<'_>>] =
            if color_attachment.is_some() {
                std::slice::from_ref(&color_attachment)
            } else {
                &[]
            };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.desc.label),
            color_attachments,
            depth_stencil_attachment: depth_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_viewport(0.0, 0.0, self.width as f32, self.height as f32, 0.0, 1.0);
        Some(pass)
    }
}

/// Rejects zero-sized or oversized extents.
pub fn check_extent(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("zero-sized target {width}x{height}");
    }
    if width > max_dimension || height > max_dimension {
        bail!("{width}x{height} exceeds the device limit of {max_dimension}");
    }
    Ok(())
}

fn check_format(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> Result<()> {
    let usage = usage.difference(wgpu::TextureUsages::COPY_SRC);
    let features = adapter.get_texture_format_features(format);
    if !features.allowed_usages.contains(usage) {
        bail!("format {format:?} does not support {usage:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESC: RenderTargetDesc = RenderTargetDesc {
        label: "test",
        color: Some(wgpu::TextureFormat::Rgba8Unorm),
        depth: Some(DepthAttachment::SAMPLED_DEPTH),
    };

    #[test]
    fn new_target_is_unallocated() {
        let t = RenderTarget::new(DESC);
        assert_eq!(t.size(), (0, 0));
        assert!(!t.is_allocated());
        assert_eq!(t.generation(), 0);
        assert!(t.color_view().is_none());
        assert!(t.depth_view().is_none());
    }

    #[test]
    fn realloc_only_on_size_change() {
        let t = RenderTarget::new(DESC);
        assert!(!t.needs_realloc(0, 0));
        assert!(t.needs_realloc(160, 90));
    }

    #[test]
    fn release_is_idempotent() {
        let mut t = RenderTarget::new(DESC);
        t.release();
        t.release();
        assert_eq!(t.size(), (0, 0));
    }

    #[test]
    fn extent_checks() {
        assert!(check_extent(160, 90, 8192).is_ok());
        assert!(check_extent(8192, 8192, 8192).is_ok());
        assert!(check_extent(0, 90, 8192).is_err());
        assert!(check_extent(160, 0, 8192).is_err());
        assert!(check_extent(8193, 1, 8192).is_err());
    }

    #[test]
    fn sampled_depth_requests_texture_binding() {
        assert!(
            DepthAttachment::SAMPLED_DEPTH
                .usage()
                .contains(wgpu::TextureUsages::TEXTURE_BINDING)
        );
        let draw_only = DepthAttachment {
            format: wgpu::TextureFormat::Depth32Float,
            sampled: false,
        };
        assert!(
            !draw_only
                .usage()
                .contains(wgpu::TextureUsages::TEXTURE_BINDING)
        );
    }
}
