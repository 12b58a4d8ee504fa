//! GPU rendering subsystem.
//!
//! A frame is a fixed chain of passes recorded on one encoder:
//! shadow map, scene into the downscale target, outline, upscale onto the window.
//! Each component owns its GPU resources and releases them on drop.
//!
//! Convention:
//! - Texture units are fixed WGSL bindings (see `binding`).
//! - Clip space is wgpu's: depth in [0, 1], texture v grows downward.

pub mod binding;
pub mod camera;
mod ctx;
pub mod mesh;
pub mod postfx;
pub mod program;
pub mod quad;
pub mod scene;
pub mod shadow;
pub mod target;
pub mod uniform;

pub use camera::{CameraConfig, CameraController, CameraView};
pub use ctx::{FrameTarget, RenderCtx};
pub use mesh::{Material, Mesh, MeshData, MeshVertex};
pub use postfx::{DepthTextureSource, DownscaleFactor, PixelArtConfig, PixelArtPostEffect};
pub use program::{OUTLINE_TEMPLATE, ShaderProgram, ShaderPrograms};
pub use scene::{MeshEntry, Scene, SceneConfig};
pub use shadow::{ShadowCaster, SpotlightConfig, SpotlightTransform};
pub use target::{GpuTexture, RenderTarget, RenderTargetDesc, TargetClear};
pub use uniform::{UniformBlock, UniformSink};
