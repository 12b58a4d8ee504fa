use anyhow::Result;
use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// What the runtime drives.
pub trait App {
    /// Raw window events, after the input state has seen them.
    fn on_window_event(&mut self, _id: WindowId, _event: &WindowEvent) -> AppControl {
        AppControl::Continue
    }

    /// One redraw. Returning an error stops the runtime, which hands it back
    /// from `Runtime::run`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl>;
}
