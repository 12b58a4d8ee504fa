//! Spotlight shadow caster.
//!
//! `SpotlightTransform` is the math: a perspective projection looking from the
//! light toward its target, and the biased matrix used to sample the resulting
//! depth map. `ShadowCaster` adds the depth-only render target.

use glam::{Mat4, Vec3, Vec4Swizzles};

use super::target::{DepthAttachment, RenderTarget, RenderTargetDesc, TargetClear};
use super::uniform::UniformSink;
use super::RenderCtx;

pub const SHADOW_NEAR: f32 = 0.1;
pub const SHADOW_FAR: f32 = 200.0;

pub const SHADOW_TARGET: RenderTargetDesc = RenderTargetDesc {
    label: "pixelshade shadow map",
    color: None,
    depth: Some(DepthAttachment::SAMPLED_DEPTH),
};

/// Placement and resolution of the spotlight.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightConfig {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Full vertical field of view, degrees. Doubles as the cone angle.
    pub fov_deg: f32,
    pub width: u32,
    pub height: u32,
    /// Subtracted from the sampled depth to avoid self-shadowing acne.
    ///
    /// Scene-scale dependent; 2e-5 suits the default scene.
    pub depth_bias: f32,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, -50.0, 40.0),
            look_at: Vec3::ZERO,
            fov_deg: 45.0,
            width: 1024,
            height: 1024,
            depth_bias: 2e-5,
        }
    }
}

/// Cached light projection.
#[derive(Debug, Clone)]
pub struct SpotlightTransform {
    position: Vec3,
    look_at: Vec3,
    fov_deg: f32,
    width: u32,
    height: u32,
    depth_bias: f32,
    view_projection: Mat4,
}

impl SpotlightTransform {
    pub fn new(config: &SpotlightConfig) -> Self {
        let mut t = Self {
            position: config.position,
            look_at: config.look_at,
            fov_deg: config.fov_deg,
            width: config.width.max(1),
            height: config.height.max(1),
            depth_bias: config.depth_bias,
            view_projection: Mat4::IDENTITY,
        };
        t.update_transform();
        t
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn depth_bias(&self) -> f32 {
        self.depth_bias
    }

    /// Moves the light. Call `update_transform` afterwards.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
    }

    pub fn set_fov(&mut self, fov_deg: f32) {
        self.fov_deg = fov_deg;
    }

    pub fn set_depth_bias(&mut self, depth_bias: f32) {
        self.depth_bias = depth_bias;
    }

    /// Recomputes `projection * view` from the current placement.
    pub fn update_transform(&mut self) {
        let aspect = self.width as f32 / self.height as f32;
        let projection =
            Mat4::perspective_rh(self.fov_deg.to_radians(), aspect, SHADOW_NEAR, SHADOW_FAR);
        let view = Mat4::look_at_rh(self.position, self.look_at, Vec3::Z);
        self.view_projection = projection * view;
    }

    /// World space to light clip space. This is the shadow pass's `MVP`.
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// World space to shadow-map texture space (`uv` in xy, biased depth in z).
    pub fn light_space_matrix(&self) -> Mat4 {
        let bias = Mat4::from_translation(Vec3::new(0.5, 0.5, -self.depth_bias))
            * Mat4::from_scale(Vec3::new(0.5, -0.5, 1.0));
        bias * self.view_projection
    }

    /// Unit vector from the light toward its target.
    pub fn direction(&self) -> Vec3 {
        (self.look_at - self.position).normalize_or_zero()
    }

    /// Projects a world point into shadow-map texture space.
    pub fn to_shadow_space(&self, world: Vec3) -> Vec3 {
        let p = self.light_space_matrix() * world.extend(1.0);
        p.xyz() / p.w
    }
}

/// A spotlight that renders a depth map of the shadow casters.
pub struct ShadowCaster {
    transform: SpotlightTransform,
    target: RenderTarget,
}

impl ShadowCaster {
    pub fn new(ctx: &RenderCtx<'_>, config: &SpotlightConfig) -> Self {
        let transform = SpotlightTransform::new(config);
        let (w, h) = transform.resolution();
        let target = RenderTarget::with_size(ctx, SHADOW_TARGET, w, h);
        Self { transform, target }
    }

    pub fn transform(&self) -> &SpotlightTransform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut SpotlightTransform {
        &mut self.transform
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    /// Moves the light and recomputes its projection.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.set_position(position);
        self.transform.update_transform();
    }

    /// Binds the depth map and clears it.
    ///
    /// Front-face culling and depth testing are part of the shadow pipeline.
    pub fn begin_capture<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
    ) -> Option<wgpu::RenderPass<'e>> {
        self.target.bind(encoder, TargetClear::DEPTH_ONLY)
    }

    /// Ends the capture pass. The caller binds whatever comes next.
    pub fn end_capture(&self, pass: wgpu::RenderPass<'_>) {
        drop(pass);
    }

    /// Writes the shadow pass `MVP` and the light uniforms of the shading pass.
    pub fn push_uniforms(&self, shadow: &mut dyn UniformSink, mesh: &mut dyn UniformSink) {
        let t = &self.transform;
        shadow.set_mat4("MVP", &t.view_projection());

        mesh.set_mat4("LightSpaceMatrix", &t.light_space_matrix());
        mesh.set_vec3("LightPosition", t.position());
        mesh.set_vec3("LightDirection", t.direction());
        mesh.set_float("LightConeAngle", t.fov_deg());
    }

    /// Depth map for sampling by the shading pass.
    pub fn texture_view(&self) -> Option<&wgpu::TextureView> {
        self.target.depth_view()
    }
}
