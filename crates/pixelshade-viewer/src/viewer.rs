//! The frame orchestrator: input, camera, light animation and the pass chain.

use anyhow::{Context, Result};
use pixelshade_engine::core::{App, AppControl, FrameCtx};
use pixelshade_engine::input::{InputEvent, MouseButton};
use pixelshade_engine::render::{
    CameraController, PixelArtPostEffect, RenderCtx, Scene, ShaderPrograms, UniformSink,
};

use crate::config::ViewerConfig;
use crate::controls::Controls;

/// GPU-side state. Built on the first frame, once a device exists.
struct Renderer {
    programs: ShaderPrograms,
    scene: Scene,
    post: PixelArtPostEffect,
}

impl Renderer {
    fn new(ctx: &RenderCtx<'_>, config: &ViewerConfig, outline_source: &str) -> Result<Self> {
        let programs = ShaderPrograms::new(ctx, outline_source);
        let scene = Scene::new(ctx, &programs, &config.scene).context("failed to load scene")?;
        let post = PixelArtPostEffect::new(ctx, &config.pixel_art);
        Ok(Self {
            programs,
            scene,
            post,
        })
    }
}

pub struct Viewer {
    config: ViewerConfig,
    outline_source: String,
    renderer: Option<Renderer>,
    camera: CameraController,
    controls: Controls,
    toggle_palette: bool,
    dither: f32,
}

impl Viewer {
    /// `outline_source` is the outline shader with the palette already substituted.
    pub fn new(config: ViewerConfig, outline_source: String) -> Self {
        Self {
            camera: CameraController::new(config.camera),
            controls: Controls::new(config.factor_repeat),
            toggle_palette: true,
            dither: config.dither.initial,
            renderer: None,
            outline_source,
            config,
        }
    }
}

fn push_outline_settings(outline: &mut dyn UniformSink, toggle_palette: bool, dither: f32) {
    outline.set_int("TogglePalette", toggle_palette as i32);
    outline.set_float("Dither", dither);
}

impl App for Viewer {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if self.renderer.is_none() {
            let renderer = Renderer::new(&ctx.gpu.render_ctx(), &self.config, &self.outline_source)?;
            log::info!("renderer ready ({:?})", ctx.gpu.surface_format());
            self.renderer = Some(renderer);
        }

        // ── input ─────────────────────────────────────────────────────────────
        let actions = self.controls.poll(ctx.input, ctx.time.now);
        if actions.exit {
            return Ok(AppControl::Exit);
        }

        for _ in 0..actions.zoom.unsigned_abs() {
            if actions.zoom > 0 {
                self.camera.zoom_out();
            } else {
                self.camera.zoom_in();
            }
        }

        let left = ctx.input.button_down(MouseButton::Left);
        let right = ctx.input.button_down(MouseButton::Right);
        for ev in &ctx.input_frame.events {
            match ev {
                InputEvent::PointerMoved { x, y } => self.camera.pointer_moved(*x, *y, left, right),
                InputEvent::PointerLeft => self.camera.pointer_left(),
                _ => {}
            }
        }

        if actions.toggle_palette {
            self.toggle_palette = !self.toggle_palette;
            log::info!("palette {}", if self.toggle_palette { "on" } else { "off" });
        }
        if actions.dither != 0 {
            let delta = actions.dither as f32 * self.config.dither.step;
            self.dither = self.config.dither.apply(self.dither, delta);
            log::info!("dither {:.5}", self.dither);
        }

        let framebuffer = ctx.framebuffer_size();
        let Some(r) = self.renderer.as_mut() else {
            return Ok(AppControl::Continue);
        };

        if actions.finer && r.post.factor_mut().decrease() {
            log::info!("downscale factor {}", r.post.factor().get());
        }
        if actions.coarser && r.post.factor_mut().increase(framebuffer) {
            log::info!("downscale factor {}", r.post.factor().get());
        }

        // ── uniforms ──────────────────────────────────────────────────────────
        let light = self.config.light_orbit.position(ctx.time.elapsed);
        r.scene.light_mut().set_position(light);

        let aspect = framebuffer.0.max(1) as f32 / framebuffer.1.max(1) as f32;
        self.camera.view(aspect).push_uniforms(&mut r.programs.mesh);
        push_outline_settings(&mut r.programs.outline, self.toggle_palette, self.dither);

        {
            let rctx = ctx.gpu.render_ctx();
            r.post.set_framebuffer_size(&rctx, framebuffer);
            r.scene.prepare(&rctx, &mut r.programs);
            r.programs.flush(rctx.queue);
        }

        // ── passes ────────────────────────────────────────────────────────────
        ctx.render(|rctx, encoder, frame| {
            r.scene.draw_shadow_map(encoder, &r.programs);
            if let Some(mut pass) = r.post.begin_render(encoder) {
                r.scene.draw_meshes(rctx.queue, &mut pass, &r.programs);
            }
            let post = &r.post;
            post.end_render(rctx, encoder, &mut r.programs, post.scene_depth(), frame);
            Ok(())
        })
    }
}
