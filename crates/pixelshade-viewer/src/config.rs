//! Viewer configuration. Everything has a default; nothing is read from disk.

use std::time::Duration;

use glam::Vec3;
use pixelshade_engine::device::GpuInit;
use pixelshade_engine::render::{CameraConfig, PixelArtConfig, SceneConfig};
use pixelshade_engine::window::RuntimeConfig;

#[derive(Debug, Clone)]
pub struct DitherConfig {
    pub initial: f32,
    /// Change per frame while `,` or `.` is held.
    pub step: f32,
    pub max: f32,
}

impl Default for DitherConfig {
    fn default() -> Self {
        Self {
            initial: 0.003,
            step: 5e-5,
            max: 0.025,
        }
    }
}

impl DitherConfig {
    pub fn apply(&self, dither: f32, delta: f32) -> f32 {
        (dither + delta).clamp(0.0, self.max)
    }
}

/// Circular path of the spotlight around the scene's vertical axis.
#[derive(Debug, Clone, Copy)]
pub struct LightOrbit {
    pub radius: f32,
    pub height: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self {
            radius: 40.0,
            height: 40.0,
        }
    }
}

impl LightOrbit {
    /// Light position `seconds` after start.
    pub fn position(&self, seconds: f32) -> Vec3 {
        Vec3::new(
            self.radius * seconds.sin(),
            self.radius * seconds.cos(),
            self.height,
        )
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub scene: SceneConfig,
    pub pixel_art: PixelArtConfig,
    pub camera: CameraConfig,
    pub dither: DitherConfig,
    pub light_orbit: LightOrbit,
    /// Repeat interval of the downscale keys while held.
    pub factor_repeat: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            gpu: GpuInit {
                prefer_srgb: false,
                ..GpuInit::default()
            },
            scene: SceneConfig::default(),
            pixel_art: PixelArtConfig::default(),
            camera: CameraConfig::default(),
            dither: DitherConfig::default(),
            light_orbit: LightOrbit::default(),
            factor_repeat: Duration::from_millis(250),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dither_stays_in_range() {
        let d = DitherConfig::default();
        assert_eq!(d.apply(0.0, -d.step), 0.0);
        assert_eq!(d.apply(0.025, d.step), 0.025);
        assert!((d.apply(0.003, d.step) - 0.00305).abs() < 1e-7);
    }

    #[test]
    fn light_starts_behind_the_scene() {
        let orbit = LightOrbit::default();
        assert!((orbit.position(0.0) - Vec3::new(0.0, 40.0, 40.0)).length() < 1e-5);
        let quarter = orbit.position(std::f32::consts::FRAC_PI_2);
        assert!((quarter - Vec3::new(40.0, 0.0, 40.0)).length() < 1e-4);
    }

    #[test]
    fn surface_is_not_srgb() {
        assert!(!ViewerConfig::default().gpu.prefer_srgb);
    }
}
