//! Orbit camera controls with inertial damping
//!
//! Dragging accumulates rotation into a pending delta. Every `update` applies
//! a fraction of that delta and decays the rest, so the camera keeps drifting
//! briefly after the pointer stops.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::camera::Camera;

const MIN_POLAR: f32 = 1e-4;

/// Spherical coordinates around the orbit target
#[derive(Clone, Copy, Debug, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y
    phi: f32,
    /// Azimuth around +Y, measured from +Z
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit controller
#[derive(Clone, Debug)]
pub struct OrbitController {
    /// Point the camera orbits around
    pub target: Vec3,
    /// Fraction of the pending motion applied per update
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Allowed camera distance
    pub distance_range: (f32, f32),
    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            damping_factor: 0.05,
            enable_damping: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            distance_range: (0.0, f32::INFINITY),
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }
}

impl OrbitController {
    /// Create a controller orbiting `target`
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    /// Set the damping factor
    pub fn with_damping(mut self, factor: f32) -> Self {
        self.damping_factor = factor.clamp(0.0, 1.0);
        self.enable_damping = factor > 0.0;
        self
    }

    /// Rotate by a pointer drag of `(dx, dy)` pixels over a viewport `viewport_height` tall
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.pending_theta -= TAU * dx / viewport_height * self.rotate_speed;
        self.pending_phi -= TAU * dy / viewport_height * self.rotate_speed;
    }

    /// Zoom by wheel notches; positive moves closer
    pub fn zoom(&mut self, notches: f32) {
        let step = 0.95_f32.powf(self.zoom_speed);
        self.pending_scale *= step.powf(notches);
    }

    /// Whether any motion is still pending
    pub fn is_moving(&self) -> bool {
        self.pending_theta.abs() > 1e-6 || self.pending_phi.abs() > 1e-6 || (self.pending_scale - 1.0).abs() > 1e-6
    }

    /// Drop every pending motion
    pub fn stop(&mut self) {
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_scale = 1.0;
    }

    /// Apply pending motion to the camera and aim it at the target
    pub fn update(&mut self, camera: &mut Camera) {
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.pending_theta * factor;
        spherical.phi += self.pending_phi * factor;
        spherical.phi = spherical.phi.clamp(MIN_POLAR, PI - MIN_POLAR);
        spherical.radius = (spherical.radius * self.pending_scale)
            .clamp(self.distance_range.0, self.distance_range.1);

        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target, Vec3::Y);

        if self.enable_damping {
            self.pending_theta *= 1.0 - self.damping_factor;
            self.pending_phi *= 1.0 - self.damping_factor;
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
        self.pending_scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn start_camera() -> Camera {
        let mut camera = Camera::new().with_position(Vec3::new(0.0, 70.0, 60.0));
        camera.look_at(Vec3::ZERO, Vec3::Y);
        camera
    }

    #[test]
    fn test_update_without_input_keeps_position() {
        let mut camera = start_camera();
        let mut orbit = OrbitController::new(Vec3::ZERO);

        orbit.update(&mut camera);

        assert_relative_eq!(camera.position.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(camera.position.y, 70.0, epsilon = 1e-3);
        assert_relative_eq!(camera.position.z, 60.0, epsilon = 1e-3);
    }

    #[test]
    fn test_rotation_keeps_distance() {
        let mut camera = start_camera();
        let distance = camera.position.length();
        let mut orbit = OrbitController::new(Vec3::ZERO);

        orbit.rotate(120.0, 0.0, 600.0);
        for _ in 0..30 {
            orbit.update(&mut camera);
        }

        assert!(camera.position.x.abs() > 1.0, "camera should have swung sideways");
        assert_relative_eq!(camera.position.length(), distance, epsilon = 1e-2);
    }

    #[test]
    fn test_damping_decays_motion() {
        let mut camera = start_camera();
        let mut orbit = OrbitController::new(Vec3::ZERO);

        orbit.rotate(50.0, 0.0, 500.0);
        assert!(orbit.is_moving());
        for _ in 0..500 {
            orbit.update(&mut camera);
        }
        assert!(!orbit.is_moving());
    }

    #[test]
    fn test_without_damping_applies_all_at_once() {
        let mut camera = start_camera();
        let mut orbit = OrbitController::new(Vec3::ZERO).with_damping(0.0);

        orbit.rotate(0.0, 10.0, 500.0);
        orbit.update(&mut camera);

        assert!(!orbit.is_moving());
    }

    #[test]
    fn test_zoom_in_shortens_distance() {
        let mut camera = start_camera();
        let before = camera.position.length();
        let mut orbit = OrbitController::new(Vec3::ZERO);

        orbit.zoom(3.0);
        orbit.update(&mut camera);

        assert!(camera.position.length() < before);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = start_camera();
        let mut orbit = OrbitController::new(Vec3::ZERO).with_damping(0.0);

        orbit.rotate(0.0, 10_000.0, 100.0);
        orbit.update(&mut camera);

        assert!(camera.position.y > 0.0, "camera may not flip over the pole");
    }
}
