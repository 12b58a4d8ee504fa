//! Headless GPU helpers shared by the integration tests.
//!
//! Every test starts with `let Some(gpu) = TestGpu::new() else { return };`
//! so machines without an adapter skip instead of failing.

#![allow(dead_code)]

use std::sync::mpsc;

use glam::{Mat4, Vec3};
use pixelshade_engine::assets::parse_obj;
use pixelshade_engine::device::{GpuInit, HeadlessGpu};
use pixelshade_engine::render::{Mesh, OUTLINE_TEMPLATE, RenderCtx, ShaderPrograms, UniformSink};
use pixelshade_palette::{Palette, compile_outline_shader};

/// Colors used by the palette tests, as bytes.
pub const TEST_PALETTE: [[u8; 3]; 4] = [
    [0x00, 0x00, 0x00],
    [0xff, 0xff, 0xff],
    [0x40, 0x06, 0xbf],
    [0xc0, 0x30, 0x30],
];

pub const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub struct TestGpu {
    gpu: HeadlessGpu,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl TestGpu {
    pub fn new() -> Option<Self> {
        match pollster::block_on(HeadlessGpu::new(&GpuInit::headless(), FRAME_FORMAT)) {
            Ok(gpu) => Some(Self {
                device: gpu.device().clone(),
                queue: gpu.queue().clone(),
                gpu,
            }),
            Err(e) => {
                eprintln!("skipping: {e:#}");
                None
            }
        }
    }

    pub fn ctx(&self) -> RenderCtx<'_> {
        self.gpu.render_ctx()
    }

    pub fn programs(&self) -> ShaderPrograms {
        let text: String = TEST_PALETTE
            .iter()
            .map(|[r, g, b]| format!("#{r:02x}{g:02x}{b:02x}\n"))
            .collect();
        let palette = Palette::parse(&text).unwrap();
        let source = compile_outline_shader(OUTLINE_TEMPLATE, &palette).unwrap();
        ShaderPrograms::new(&self.ctx(), &source)
    }

    pub fn mesh(&self, programs: &ShaderPrograms, obj: &str, casts_shadow: bool, label: &str) -> Mesh {
        let source = parse_obj(obj).unwrap();
        Mesh::from_source(&self.ctx(), programs, &source, casts_shadow, label).unwrap()
    }

    pub fn encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test") })
    }

    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit([encoder.finish()]);
    }

    /// Reads a whole single-sample texture back, one `[u8; 4]` per texel.
    ///
    /// Depth32Float texels come back as their f32 bytes.
    pub fn read_texels(&self, texture: &wgpu::Texture, aspect: wgpu::TextureAspect) -> Vec<[u8; 4]> {
        let (w, h) = (texture.width(), texture.height());
        let bytes_per_row = (w * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("test readback"),
            size: (bytes_per_row * h) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self.encoder();
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(h),
                },
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
        self.submit(encoder);

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device.poll(wgpu::PollType::wait_indefinitely()).unwrap();
        rx.recv().unwrap().unwrap();

        let data = slice.get_mapped_range();
        let mut texels = Vec::with_capacity((w * h) as usize);
        for row in 0..h {
            let start = (row * bytes_per_row) as usize;
            for x in 0..w as usize {
                let o = start + x * 4;
                texels.push([data[o], data[o + 1], data[o + 2], data[o + 3]]);
            }
        }
        drop(data);
        staging.unmap();
        texels
    }

    pub fn read_depth(&self, texture: &wgpu::Texture) -> Vec<f32> {
        self.read_texels(texture, wgpu::TextureAspect::DepthOnly)
            .into_iter()
            .map(f32::from_le_bytes)
            .collect()
    }

    pub fn read_rgba(&self, texture: &wgpu::Texture) -> Vec<[u8; 4]> {
        self.read_texels(texture, wgpu::TextureAspect::All)
    }

    pub fn color_texture(&self, width: u32, height: u32) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test frame"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }
}

/// Closed box from `min` to `max`, faces wound counter-clockwise from outside.
pub fn box_obj(min: Vec3, max: Vec3) -> String {
    let (a, b) = (min, max);
    let corners = [
        (a.x, a.y, a.z),
        (b.x, a.y, a.z),
        (b.x, b.y, a.z),
        (a.x, b.y, a.z),
        (a.x, a.y, b.z),
        (b.x, a.y, b.z),
        (b.x, b.y, b.z),
        (a.x, b.y, b.z),
    ];
    let mut obj = String::new();
    for (x, y, z) in corners {
        obj.push_str(&format!("v {x} {y} {z}\n"));
    }
    obj.push_str("f 1 4 3 2\nf 5 6 7 8\nf 1 2 6 5\nf 3 4 8 7\nf 2 3 7 6\nf 4 1 5 8\n");
    obj
}

/// Square on z = 0 facing +Z.
pub fn ground_obj(half: f32) -> String {
    format!(
        "v {n} {n} 0\nv {half} {n} 0\nv {half} {half} 0\nv {n} {half} 0\nf 1 2 3 4\n",
        n = -half
    )
}

/// Top-down camera over the origin, `+Y` up on screen.
pub fn overhead_camera(sink: &mut dyn UniformSink, eye: Vec3, target: Vec3, aspect: f32) -> Mat4 {
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    let mvp = Mat4::perspective_rh(45f32.to_radians(), aspect, 1.0, 500.0) * view;
    sink.set_mat4("MVP", &mvp);
    sink.set_mat4("MV", &view);
    mvp
}

/// Pixel coordinates of a world point for a `width`x`height` target.
pub fn project(mvp: Mat4, world: Vec3, width: u32, height: u32) -> (u32, u32) {
    let clip = mvp * world.extend(1.0);
    let ndc = clip.truncate() / clip.w;
    let x = (ndc.x + 1.0) * 0.5 * width as f32;
    let y = (1.0 - ndc.y) * 0.5 * height as f32;
    (x as u32, y as u32)
}

/// Mean luma over a `(2r+1)^2` window.
pub fn mean_luma(pixels: &[[u8; 4]], width: u32, center: (u32, u32), r: u32) -> f32 {
    let mut sum = 0.0;
    let mut n = 0.0;
    for y in center.1 - r..=center.1 + r {
        for x in center.0 - r..=center.0 + r {
            let [pr, pg, pb, _] = pixels[(y * width + x) as usize];
            sum += 0.2126 * pr as f32 + 0.7152 * pg as f32 + 0.0722 * pb as f32;
            n += 1.0;
        }
    }
    sum / n
}
