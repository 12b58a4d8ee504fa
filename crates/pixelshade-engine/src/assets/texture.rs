use super::DecodedImage;
use crate::render::{GpuTexture, RenderCtx};

/// Uploads an RGBA8 image as a sampled texture (single mip level).
pub fn upload_rgba8(ctx: &RenderCtx<'_>, label: &str, image: &DecodedImage) -> GpuTexture {
    let size = wgpu::Extent3d {
        width: image.width,
        height: image.height,
        depth_or_array_layers: 1,
    };

    let texture = GpuTexture::new(
        ctx.device,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
    );

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: texture.texture(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * image.width),
            rows_per_image: Some(image.height),
        },
        size,
    );

    texture
}

/// 1x1 opaque white, bound where a material has no texture map.
pub fn white_texture(ctx: &RenderCtx<'_>) -> GpuTexture {
    let white = DecodedImage {
        pixels: vec![255; 4],
        width: 1,
        height: 1,
    };
    upload_rgba8(ctx, "pixelshade white texture", &white)
}
