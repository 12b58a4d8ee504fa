use anyhow::Result;

use super::GpuInit;
use super::adapter::{create_instance, open_device};
use crate::render::RenderCtx;

/// A device without a window, for offscreen rendering and GPU tests.
pub struct HeadlessGpu {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
}

impl HeadlessGpu {
    /// `format` stands in for the surface format of the final pass.
    pub async fn new(init: &GpuInit, format: wgpu::TextureFormat) -> Result<Self> {
        let instance = create_instance();
        let (adapter, device, queue) = open_device(&instance, None, init).await?;
        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
            format,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(&self.device, &self.queue, &self.adapter, self.format)
    }
}
