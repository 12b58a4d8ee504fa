/// How the device and the window surface are requested.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub power_preference: wgpu::PowerPreference,

    /// Pick an `*Srgb` swapchain format when the surface offers one.
    ///
    /// The outline pass already produces display values, so the viewer
    /// asks for a plain `Unorm` surface.
    pub prefer_srgb: bool,

    /// `Fifo` blocks in `present` until vblank and paces the frame loop.
    pub present_mode: wgpu::PresentMode,

    /// Ignored when the surface does not list it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Settings for offscreen rendering without a window.
    pub fn headless() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::default(),
            prefer_srgb: false,
            ..Self::default()
        }
    }
}
