//! Orbit camera driven by mouse drags and zoom keys.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use super::uniform::UniformSink;

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub rot_x: f32,
    pub rot_y: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Distance change per frame while a zoom key is held.
    pub zoom_step: f32,
    /// Radians per pixel of left drag.
    pub rotate_speed: f32,
    /// Distance per pixel of vertical right drag.
    pub drag_zoom_speed: f32,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub model_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            rot_x: 1.57,
            rot_y: 1.97,
            distance: 400.0,
            min_distance: 200.0,
            max_distance: 1200.0,
            zoom_step: 0.5,
            rotate_speed: 0.01,
            drag_zoom_speed: 0.5,
            fov_deg: 5.0,
            near: 1.0,
            far: 5000.0,
            model_scale: 5.0,
        }
    }
}

/// Matrices for one frame of the shading pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub mv: Mat4,
    pub mvp: Mat4,
}

impl CameraView {
    pub fn push_uniforms(&self, sink: &mut dyn UniformSink) {
        sink.set_mat4("MVP", &self.mvp);
        sink.set_mat4("MV", &self.mv);
    }
}

#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    rot_x: f32,
    rot_y: f32,
    distance: f32,
    last_pointer: Option<(f32, f32)>,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        let distance = config.distance.clamp(config.min_distance, config.max_distance);
        Self {
            config,
            rot_x: config.rot_x,
            rot_y: config.rot_y,
            distance,
            last_pointer: None,
        }
    }

    pub fn rotation(&self) -> (f32, f32) {
        (self.rot_x, self.rot_y)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Moves the camera by `delta` (positive is away), clamped to the limits.
    pub fn zoom(&mut self, delta: f32) {
        self.distance =
            (self.distance + delta).clamp(self.config.min_distance, self.config.max_distance);
    }

    /// One frame of the zoom-in key.
    pub fn zoom_in(&mut self) {
        self.zoom(-self.config.zoom_step);
    }

    /// One frame of the zoom-out key.
    pub fn zoom_out(&mut self) {
        self.zoom(self.config.zoom_step);
    }

    pub fn drag_rotate(&mut self, dx: f32, dy: f32) {
        self.rot_x += dx * self.config.rotate_speed;
        self.rot_y += dy * self.config.rotate_speed;
    }

    pub fn drag_zoom(&mut self, dy: f32) {
        self.zoom(dy * self.config.drag_zoom_speed);
    }

    /// Feeds a pointer position. Left drag rotates, right drag zooms.
    ///
    /// The first position only primes the tracker.
    pub fn pointer_moved(&mut self, x: f32, y: f32, left: bool, right: bool) {
        if let Some((lx, ly)) = self.last_pointer {
            let (dx, dy) = (x - lx, y - ly);
            if left {
                self.drag_rotate(dx, dy);
            }
            if right {
                self.drag_zoom(dy);
            }
        }
        self.last_pointer = Some((x, y));
    }

    /// Forget the last pointer position (pointer left the window).
    pub fn pointer_left(&mut self) {
        self.last_pointer = None;
    }

    pub fn model_view(&self) -> Mat4 {
        // Yaw about world Z first, then the half turn, then pitch.
        let rotation = Mat4::from_rotation_x(self.rot_x)
            * Mat4::from_rotation_y(PI)
            * Mat4::from_rotation_z(self.rot_y);
        Mat4::from_translation(Vec3::new(0.0, -5.0, -self.distance)) * rotation
    }

    pub fn view(&self, aspect: f32) -> CameraView {
        let c = &self.config;
        let projection = Mat4::perspective_rh(c.fov_deg.to_radians(), aspect, c.near, c.far);
        let mv = self.model_view();
        let mvp = projection * Mat4::from_scale(Vec3::splat(c.model_scale)) * mv;
        CameraView { mv, mvp }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_keys_stay_within_limits() {
        let mut cam = CameraController::default();
        for _ in 0..10_000 {
            cam.zoom_out();
        }
        assert_eq!(cam.distance(), 1200.0);
        for _ in 0..10_000 {
            cam.zoom_in();
        }
        assert_eq!(cam.distance(), 200.0);
    }

    #[test]
    fn right_drag_zoom_is_clamped() {
        let mut cam = CameraController::default();
        cam.pointer_moved(0.0, 0.0, false, true);
        cam.pointer_moved(0.0, 100_000.0, false, true);
        assert_eq!(cam.distance(), 1200.0);
        cam.pointer_moved(0.0, -100_000.0, false, true);
        assert_eq!(cam.distance(), 200.0);
    }

    #[test]
    fn left_drag_rotates_by_pixel_delta() {
        let mut cam = CameraController::default();
        cam.pointer_moved(10.0, 10.0, true, false);
        cam.pointer_moved(30.0, 0.0, true, false);
        let (rx, ry) = cam.rotation();
        assert!((rx - (1.57 + 0.2)).abs() < 1e-5);
        assert!((ry - (1.97 - 0.1)).abs() < 1e-5);
    }

    #[test]
    fn first_pointer_sample_does_not_move_camera() {
        let mut cam = CameraController::default();
        cam.pointer_moved(500.0, 500.0, true, true);
        assert_eq!(cam.rotation(), (1.57, 1.97));
        assert_eq!(cam.distance(), 400.0);
    }

    #[test]
    fn model_view_places_origin_in_front_of_camera() {
        let cam = CameraController::default();
        let origin = cam.model_view().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, -5.0, -400.0)).length() < 1e-4);
    }

    #[test]
    fn rotation_order_is_z_then_y_then_x() {
        let cam = CameraController::default();
        let expected = Mat4::from_translation(Vec3::new(0.0, -5.0, -400.0))
            * Mat4::from_euler(glam::EulerRot::XYZ, 1.57, PI, 1.97);
        assert!(cam.model_view().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn mvp_is_projection_scale_model_view() {
        let cam = CameraController::default();
        let view = cam.view(4.0 / 3.0);
        let expected = Mat4::perspective_rh(5f32.to_radians(), 4.0 / 3.0, 1.0, 5000.0)
            * Mat4::from_scale(Vec3::splat(5.0))
            * view.mv;
        assert!(view.mvp.abs_diff_eq(expected, 1e-6));

        // The origin lands near the center of the screen, inside the depth range.
        let clip = view.mvp * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 0.5 && ndc.y.abs() < 0.5);
        assert!((0.0..1.0).contains(&ndc.z));
    }
}
