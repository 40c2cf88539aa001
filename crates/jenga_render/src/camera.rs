//! Perspective camera

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective projection parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov: f32,
    /// Width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Camera for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
    /// Projection
    pub projection: Projection,
}

impl Camera {
    /// Create a new camera at the origin looking down -Z
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Projection::default(),
        }
    }

    /// Create a perspective camera (`fov` in radians)
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Projection { fov, aspect, near, far },
        }
    }

    /// Move the camera
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Look at a target
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let to_target = target - self.position;
        if to_target.length_squared() < f32::EPSILON {
            return;
        }
        let forward = to_target.normalize();
        let mut right = forward.cross(up);
        if right.length_squared() < f32::EPSILON {
            // Looking straight along `up`; any perpendicular works
            right = forward.any_orthonormal_vector();
        }
        let right = right.normalize();
        let actual_up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, actual_up, -forward));
    }

    /// Update the aspect ratio after a resize
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.projection.aspect = width / height;
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Get the projection matrix (depth range 0..1)
    pub fn projection_matrix(&self) -> Mat4 {
        let Projection { fov, aspect, near, far } = self.projection;
        Mat4::perspective_rh(fov, aspect, near, far)
    }

    /// Get the combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get the forward direction
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_look_at_faces_target() {
        let mut camera = Camera::new().with_position(Vec3::new(0.0, 70.0, 60.0));
        camera.look_at(Vec3::ZERO, Vec3::Y);

        let expected = (Vec3::ZERO - camera.position).normalize();
        let forward = camera.forward();
        assert_relative_eq!(forward.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(forward.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(forward.z, expected.z, epsilon = 1e-5);
        assert!(camera.right().y.abs() < 1e-5, "right vector stays horizontal");
    }

    #[test]
    fn test_view_matrix_moves_target_in_front() {
        let mut camera = Camera::new().with_position(Vec3::new(0.0, 0.0, 10.0));
        camera.look_at(Vec3::ZERO, Vec3::Y);

        let in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert_relative_eq!(in_view.z, -10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_set_aspect_ignores_zero_size() {
        let mut camera = Camera::new();
        camera.set_aspect(800.0, 400.0);
        assert_relative_eq!(camera.projection.aspect, 2.0);
        camera.set_aspect(0.0, 400.0);
        assert_relative_eq!(camera.projection.aspect, 2.0);
    }

    #[test]
    fn test_look_straight_down() {
        let mut camera = Camera::new().with_position(Vec3::new(0.0, 10.0, 0.0));
        camera.look_at(Vec3::ZERO, Vec3::Y);
        assert_relative_eq!(camera.forward().y, -1.0, epsilon = 1e-5);
    }
}
