use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye: config.eye,
            target: config.target,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: 1.0,
            z_near: config.z_near,
            z_far: config.z_far,
        };
        camera.set_aspect(width, height);
        camera
    }

    /// Ignores zero sizes (minimized window, collapsed canvas)
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn camera() -> Camera {
        Camera::new(&SceneConfig::default().camera, 800, 600)
    }

    #[test]
    fn test_defaults() {
        let cam = camera();
        assert_eq!(cam.eye, Vec3::new(0.0, 100.0, 200.0));
        assert!((cam.fov_y - 60f32.to_radians()).abs() < 1e-6);
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_size_keeps_aspect() {
        let mut cam = camera();
        cam.set_aspect(0, 600);
        cam.set_aspect(800, 0);
        assert!((cam.aspect - 800.0 / 600.0).abs() < 1e-6);
        cam.set_aspect(1000, 500);
        assert!((cam.aspect - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let cam = camera();
        let clip = cam.view_proj() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_airplane_start_is_visible() {
        let cam = camera();
        let clip = cam.view_proj() * Vec3::new(0.0, 100.0, 0.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
