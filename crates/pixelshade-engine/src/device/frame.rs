/// The swapchain image being drawn this frame, with its encoder.
///
/// Dropping it without `Gpu::submit` discards the frame. Only one can be
/// alive at a time.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    pub fn size(&self) -> (u32, u32) {
        let texture = &self.surface_texture.texture;
        (texture.width(), texture.height())
    }
}

/// What the frame loop should do after `get_current_texture` failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next frame should succeed.
    Reconfigured,
    SkipFrame,
    /// Out of memory. The runtime stops.
    Fatal,
}
