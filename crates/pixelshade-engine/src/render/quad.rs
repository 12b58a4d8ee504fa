use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::RenderCtx;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Triangle strip covering clip space. Texture v grows downward.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [-1.0, 1.0, 0.0], uv: [0.0, 0.0] },
    QuadVertex { position: [-1.0, -1.0, 0.0], uv: [0.0, 1.0] },
    QuadVertex { position: [1.0, 1.0, 0.0], uv: [1.0, 0.0] },
    QuadVertex { position: [1.0, -1.0, 0.0], uv: [1.0, 1.0] },
];

/// Full-screen quad used by the post-processing passes.
pub struct FullScreenQuad {
    vertex_buffer: wgpu::Buffer,
}

impl FullScreenQuad {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pixelshade quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { vertex_buffer }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}

impl Drop for FullScreenQuad {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        let xs: Vec<f32> = QUAD_VERTICES.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = QUAD_VERTICES.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -1.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 1.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), -1.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 1.0);
    }

    #[test]
    fn top_left_corner_samples_first_texel() {
        let top_left = QUAD_VERTICES
            .iter()
            .find(|v| v.position[0] < 0.0 && v.position[1] > 0.0)
            .unwrap();
        assert_eq!(top_left.uv, [0.0, 0.0]);
    }

    #[test]
    fn stride_is_five_floats() {
        assert_eq!(QuadVertex::layout().array_stride, 20);
    }
}
