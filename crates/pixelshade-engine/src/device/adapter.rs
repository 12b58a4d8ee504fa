use anyhow::{Context, Result};

use super::GpuInit;

pub(crate) fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

/// Requests an adapter (able to present to `surface` when given) and opens
/// its device.
pub(crate) async fn open_device(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
    init: &GpuInit,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: init.power_preference,
            compatible_surface: surface,
            force_fallback_adapter: false,
        })
        .await
        .context("no GPU adapter available")?;

    let info = adapter.get_info();
    log::info!("adapter: {} ({:?}, {:?})", info.name, info.backend, info.device_type);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("pixelshade device"),
            required_features: init.required_features,
            required_limits: init.required_limits.clone(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("adapter refused to open a device")?;

    Ok((adapter, device, queue))
}
