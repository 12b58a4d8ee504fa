use anyhow::{Result, bail};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::{InputFrame, InputState};
use crate::render::{FrameTarget, RenderCtx};
use crate::time::FrameTime;

use super::app::AppControl;

pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

/// Handed to `App::on_frame` for one redraw.
///
/// `'w` is how long the GPU context may borrow the window.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
}

impl FrameCtx<'_, '_> {
    /// Physical pixels of the configured surface. May be 0x0 while minimized.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    /// Records one frame with `draw`, then submits and presents it.
    ///
    /// A lost or outdated surface only skips the frame; running out of memory
    /// is an error, like any error returned by `draw`.
    pub fn render<F>(&mut self, draw: F) -> Result<AppControl>
    where
        F: FnOnce(&RenderCtx<'_>, &mut wgpu::CommandEncoder, FrameTarget<'_>) -> Result<()>,
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => match self.gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => bail!("surface is out of memory"),
                _ => return Ok(AppControl::Continue),
            },
        };

        let (width, height) = frame.size();
        draw(
            &self.gpu.render_ctx(),
            &mut frame.encoder,
            FrameTarget::new(&frame.view, width, height),
        )?;

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);
        Ok(AppControl::Continue)
    }
}
