use anyhow::{Context, Result, ensure};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::adapter::{create_instance, open_device};
use super::surface::{choose_alpha_mode, choose_surface_format, classify_surface_error, is_configurable};
use super::{GpuFrame, GpuInit, SurfaceErrorAction};
use crate::render::RenderCtx;

/// Device, queue and the window's swapchain.
///
/// Borrows the window for `'w`; the runtime keeps both in one
/// self-referencing entry.
pub struct Gpu<'w> {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Last size seen, possibly 0x0 while the configuration lags behind.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        ensure!(is_configurable(size), "window has zero size");

        let instance = create_instance();
        let surface = instance
            .create_surface(window)
            .context("failed to create the window surface")?;
        let (adapter, device, queue) = open_device(&instance, Some(&surface), &init).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps.formats, init.prefer_srgb)
            .context("surface reports no formats")?;
        let alpha_mode = choose_alpha_mode(&caps.alpha_modes, init.alpha_mode);
        log::info!(
            "surface {}x{} {format:?} ({:?}, {alpha_mode:?})",
            size.width,
            size.height,
            init.present_mode
        );

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            adapter,
            device,
            queue,
            config,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, &self.adapter, self.config.format)
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        if is_configurable(size) {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture.texture.create_view(&Default::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pixelshade frame"),
            });
        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the frame's commands and presents it.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;
        self.queue.submit([encoder.finish()]);
        drop(view);
        surface_texture.present();
    }

    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = classify_surface_error(&err);
        match action {
            SurfaceErrorAction::Reconfigured if is_configurable(self.size) => {
                self.surface.configure(&self.device, &self.config);
            }
            SurfaceErrorAction::Fatal => log::error!("surface error: {err}"),
            _ => log::debug!("surface error: {err}"),
        }
        action
    }
}
