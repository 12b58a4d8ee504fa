/// Device handles every render component allocates and records with.
///
/// `surface_format` is the format of whatever the last pass writes to: the
/// swapchain, or an offscreen stand-in when headless.
#[derive(Clone, Copy)]
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub adapter: &'a wgpu::Adapter,
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> RenderCtx<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        adapter: &'a wgpu::Adapter,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            adapter,
            surface_format,
        }
    }
}

/// The window's image for this frame, written only by the upscale pass.
#[derive(Clone, Copy)]
pub struct FrameTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl<'a> FrameTarget<'a> {
    pub fn new(view: &'a wgpu::TextureView, width: u32, height: u32) -> Self {
        Self { view, width, height }
    }
}
