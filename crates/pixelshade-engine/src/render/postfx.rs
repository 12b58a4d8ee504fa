//! Pixel-art post effect.
//!
//! The scene is drawn into a small offscreen target (`downscale`), an outline
//! pass runs edge detection and palette quantization into a second target of the
//! same size, and the result is stretched onto the window with nearest sampling.
//!
//! Target sizes follow the framebuffer lazily: they are only reallocated when
//! `framebuffer / factor` changes.
//!
//! Edges come from camera-view depth at the art resolution. The downscale
//! target's own depth attachment is the usual source (`scene_depth`).

use super::program::{ShaderPrograms, binding_key};
use super::quad::FullScreenQuad;
use super::target::{DepthAttachment, RenderTarget, RenderTargetDesc, TargetClear};
use super::{FrameTarget, RenderCtx};

pub const SCENE_TARGET: RenderTargetDesc = RenderTargetDesc {
    label: "pixelshade downscale",
    color: Some(wgpu::TextureFormat::Rgba8Unorm),
    depth: Some(DepthAttachment::SAMPLED_DEPTH),
};

pub const OUTLINE_TARGET: RenderTargetDesc = RenderTargetDesc {
    label: "pixelshade outline",
    color: Some(wgpu::TextureFormat::Rgba8Unorm),
    depth: None,
};

/// Read-only access to the depth texture the outline pass detects edges on.
pub trait DepthTextureSource {
    fn depth_view(&self) -> Option<&wgpu::TextureView>;

    /// Changes whenever `depth_view` starts returning a different texture.
    fn depth_generation(&self) -> u64;
}

impl DepthTextureSource for RenderTarget {
    fn depth_view(&self) -> Option<&wgpu::TextureView> {
        RenderTarget::depth_view(self)
    }

    fn depth_generation(&self) -> u64 {
        self.generation()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PixelArtConfig {
    pub downscale_factor: u32,
    pub clear_color: wgpu::Color,
}

impl Default for PixelArtConfig {
    fn default() -> Self {
        Self {
            downscale_factor: 6,
            clear_color: wgpu::Color {
                r: 64.0 / 255.0,
                g: 6.0 / 255.0,
                b: 191.0 / 255.0,
                a: 1.0,
            },
        }
    }
}

/// Integer ratio between framebuffer pixels and art pixels. Never below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownscaleFactor(u32);

impl DownscaleFactor {
    pub fn new(factor: u32) -> Self {
        Self(factor.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Largest factor that still leaves a 1x1 target for `framebuffer`.
    pub fn max_for(framebuffer: (u32, u32)) -> u32 {
        framebuffer.0.min(framebuffer.1).max(1)
    }

    /// Finer pixels. Returns `false` when already at 1.
    pub fn decrease(&mut self) -> bool {
        if self.0 > 1 {
            self.0 -= 1;
            true
        } else {
            false
        }
    }

    /// Coarser pixels. Returns `false` when the target would collapse.
    pub fn increase(&mut self, framebuffer: (u32, u32)) -> bool {
        if self.0 < Self::max_for(framebuffer) {
            self.0 += 1;
            true
        } else {
            false
        }
    }

    pub fn clamped_to(self, framebuffer: (u32, u32)) -> Self {
        Self(self.0.min(Self::max_for(framebuffer)))
    }
}

impl Default for DownscaleFactor {
    fn default() -> Self {
        Self::new(PixelArtConfig::default().downscale_factor)
    }
}

pub fn downscaled_size(framebuffer: (u32, u32), factor: DownscaleFactor) -> (u32, u32) {
    (framebuffer.0 / factor.get(), framebuffer.1 / factor.get())
}

pub struct PixelArtPostEffect {
    factor: DownscaleFactor,
    framebuffer: (u32, u32),
    size: (u32, u32),
    downscale: RenderTarget,
    outline: RenderTarget,
    quad: FullScreenQuad,
    clear_color: wgpu::Color,
}

impl PixelArtPostEffect {
    /// Targets stay unallocated until the first `set_framebuffer_size`.
    pub fn new(ctx: &RenderCtx<'_>, config: &PixelArtConfig) -> Self {
        Self {
            factor: DownscaleFactor::new(config.downscale_factor),
            framebuffer: (0, 0),
            size: (0, 0),
            downscale: RenderTarget::new(SCENE_TARGET),
            outline: RenderTarget::new(OUTLINE_TARGET),
            quad: FullScreenQuad::new(ctx),
            clear_color: config.clear_color,
        }
    }

    pub fn factor(&self) -> DownscaleFactor {
        self.factor
    }

    pub fn factor_mut(&mut self) -> &mut DownscaleFactor {
        &mut self.factor
    }

    /// Last framebuffer size seen by `set_framebuffer_size`.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer
    }

    /// Size both offscreen targets were last created at.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn downscale_target(&self) -> &RenderTarget {
        &self.downscale
    }

    pub fn outline_target(&self) -> &RenderTarget {
        &self.outline
    }

    /// Camera-view depth written by the scene pass, at the art resolution.
    pub fn scene_depth(&self) -> &dyn DepthTextureSource {
        &self.downscale
    }

    /// Recreates the offscreen targets when `framebuffer / factor` changed.
    ///
    /// Returns `true` when the targets were recreated.
    pub fn set_framebuffer_size(&mut self, ctx: &RenderCtx<'_>, framebuffer: (u32, u32)) -> bool {
        // Minimized.
        if framebuffer.0 == 0 || framebuffer.1 == 0 {
            return false;
        }
        self.framebuffer = framebuffer;
        self.factor = self.factor.clamped_to(framebuffer);

        let size = downscaled_size(framebuffer, self.factor);
        if size == self.size {
            return false;
        }
        self.size = size;

        self.downscale.create(ctx, size.0, size.1);
        self.outline.create(ctx, size.0, size.1);

        log::debug!(
            "pixel art targets recreated at {}x{} (factor {}, framebuffer {}x{})",
            size.0,
            size.1,
            self.factor.get(),
            framebuffer.0,
            framebuffer.1
        );
        true
    }

    /// Opens the scene pass on the downscale target, clearing color and depth.
    pub fn begin_render<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
    ) -> Option<wgpu::RenderPass<'e>> {
        self.downscale.bind(encoder, TargetClear::all(self.clear_color))
    }

    /// Records the outline pass and the upscale pass onto the window.
    pub fn end_render(
        &self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        programs: &mut ShaderPrograms,
        depth: &dyn DepthTextureSource,
        frame: FrameTarget<'_>,
    ) {
        // ── outline ───────────────────────────────────────────────────────────
        if let Some(screen) = self.downscale.color_view() {
            let depth_view = depth.depth_view();
            let key = binding_key(&[
                self.downscale.generation(),
                depth.depth_generation(),
                depth_view.is_some() as u64,
            ]);
            programs.prepare_outline_bindings(ctx.device, key, screen, depth_view);

            if let Some(mut pass) = self.outline.bind(encoder, TargetClear::color(self.clear_color))
                && programs.outline.bind(&mut pass)
            {
                self.quad.draw(&mut pass);
            }
        }

        // ── upscale ───────────────────────────────────────────────────────────
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pixelshade upscale"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(outlined) = self.outline.color_view() else {
            return;
        };
        programs.upscale.prepare_bindings(
            ctx.device,
            binding_key(&[self.outline.generation()]),
            &[outlined],
        );

        // Exact multiples of the art pixel; the remainder stays clear.
        let (w, h) = self.outline.size();
        let vw = (w * self.factor.get()).min(frame.width);
        let vh = (h * self.factor.get()).min(frame.height);
        if vw == 0 || vh == 0 {
            return;
        }
        pass.set_viewport(0.0, 0.0, vw as f32, vh as f32, 0.0, 1.0);

        if programs.upscale.bind(&mut pass) {
            self.quad.draw(&mut pass);
        }
    }
}
