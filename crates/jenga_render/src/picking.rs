//! Object Picking & Raycasting
//!
//! Converts a pointer position into a world-space ray and finds the nearest
//! mesh it crosses.
//!
//! # Example
//!
//! ```ignore
//! use jenga_render::picking::*;
//!
//! let ray = screen_to_ray(cursor, viewport, &camera);
//! if let Some(hit) = raycast_nearest(&scene, &ray) {
//!     log::info!("Picked {:?} at distance {}", hit.mesh, hit.distance);
//! }
//! ```

use glam::{Quat, Vec2, Vec3};

use crate::camera::Camera;
use crate::scene::{Geometry, MeshId, SceneGraph};

/// Ray with a normalized direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with normalized direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Create a ray from two points
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Get a point at distance t along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Express the ray in the local frame of an object at `center` rotated by `rotation`
    fn to_local(&self, center: Vec3, rotation: Quat) -> Self {
        let inverse = rotation.inverse();
        Self {
            origin: inverse * (self.origin - center),
            direction: inverse * self.direction,
        }
    }
}

/// Result of a raycast hit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// Mesh that was hit
    pub mesh: MeshId,
    /// Distance from ray origin to hit point
    pub distance: f32,
    /// World-space hit position
    pub position: Vec3,
}

/// Convert a pointer position in client pixels to normalized device coordinates
pub fn screen_to_ndc(screen_pos: Vec2, screen_size: Vec2) -> Vec2 {
    Vec2::new(
        (screen_pos.x / screen_size.x) * 2.0 - 1.0,
        -(screen_pos.y / screen_size.y) * 2.0 + 1.0,
    )
}

/// Convert a pointer position into a world ray leaving the camera
pub fn screen_to_ray(screen_pos: Vec2, screen_size: Vec2, camera: &Camera) -> Ray {
    let ndc = screen_to_ndc(screen_pos, screen_size);
    ndc_to_ray(ndc, camera)
}

/// Ray from the camera through a point given in normalized device coordinates
pub fn ndc_to_ray(ndc: Vec2, camera: &Camera) -> Ray {
    let inverse = camera.view_projection_matrix().inverse();
    let through = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
    Ray::from_points(camera.position, through)
}

/// Project a world point to client pixels, or `None` when it is behind the camera
pub fn world_to_screen(world_pos: Vec3, screen_size: Vec2, camera: &Camera) -> Option<Vec2> {
    let clip = camera.view_projection_matrix() * world_pos.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x + 1.0) * 0.5 * screen_size.x,
        (1.0 - ndc.y) * 0.5 * screen_size.y,
    ))
}

/// Ray against an oriented box using the slab method in the box frame
///
/// Returns the distance to the first intersection in front of the origin.
pub fn ray_box(ray: &Ray, center: Vec3, rotation: Quat, half_extents: Vec3) -> Option<f32> {
    let local = ray.to_local(center, rotation);
    let inv_dir = local.direction.recip();

    let t1 = (-half_extents.x - local.origin.x) * inv_dir.x;
    let t2 = (half_extents.x - local.origin.x) * inv_dir.x;
    let t3 = (-half_extents.y - local.origin.y) * inv_dir.y;
    let t4 = (half_extents.y - local.origin.y) * inv_dir.y;
    let t5 = (-half_extents.z - local.origin.z) * inv_dir.z;
    let t6 = (half_extents.z - local.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some(if tmin < 0.0 { tmax } else { tmin })
    }
}

/// Ray against a finite rectangle lying in the local XY plane, hit from either side
pub fn ray_rectangle(ray: &Ray, center: Vec3, rotation: Quat, half_size: Vec2) -> Option<f32> {
    let local = ray.to_local(center, rotation);
    if local.direction.z.abs() < 1e-8 {
        return None;
    }

    let t = -local.origin.z / local.direction.z;
    if t < 0.0 {
        return None;
    }

    let point = local.at(t);
    if point.x.abs() <= half_size.x && point.y.abs() <= half_size.y {
        Some(t)
    } else {
        None
    }
}

/// Cast a ray through every mesh and return the nearest hit
///
/// Ties keep the mesh that was added to the scene first.
pub fn raycast_nearest(scene: &SceneGraph, ray: &Ray) -> Option<RaycastHit> {
    let offset = scene.root_offset();
    let mut nearest: Option<RaycastHit> = None;

    for (id, mesh) in scene.iter() {
        let center = mesh.position + offset;
        let distance = match mesh.geometry {
            Geometry::Box { size } => ray_box(ray, center, mesh.rotation, size * 0.5),
            Geometry::Plane { width, height } => {
                ray_rectangle(ray, center, mesh.rotation, Vec2::new(width, height) * 0.5)
            }
        };

        if let Some(distance) = distance {
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(RaycastHit {
                    mesh: id,
                    distance,
                    position: ray.at(distance),
                });
            }
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::scene::Mesh;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn camera_at(position: Vec3, target: Vec3) -> Camera {
        let mut camera = Camera::perspective(75.0_f32.to_radians(), 1.0, 0.1, 1000.0).with_position(position);
        camera.look_at(target, Vec3::Y);
        camera
    }

    #[test]
    fn test_screen_to_ndc_corners() {
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(screen_to_ndc(Vec2::ZERO, size), Vec2::new(-1.0, 1.0));
        assert_eq!(screen_to_ndc(size, size), Vec2::new(1.0, -1.0));
        assert_eq!(screen_to_ndc(size * 0.5, size), Vec2::ZERO);
    }

    #[test]
    fn test_center_ray_follows_camera_forward() {
        let camera = camera_at(Vec3::new(0.0, 70.0, 60.0), Vec3::ZERO);
        let ray = screen_to_ray(Vec2::new(400.0, 400.0), Vec2::new(800.0, 800.0), &camera);

        let forward = camera.forward();
        assert_relative_eq!(ray.origin.y, 70.0, epsilon = 1e-4);
        assert_relative_eq!(ray.direction.dot(forward), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_world_to_screen_inverts_screen_to_ray() {
        let camera = camera_at(Vec3::new(10.0, 20.0, 30.0), Vec3::ZERO);
        let size = Vec2::new(640.0, 480.0);
        let point = Vec3::new(2.0, 1.0, -3.0);

        let screen = world_to_screen(point, size, &camera).unwrap();
        let ray = screen_to_ray(screen, size, &camera);
        let to_point = (point - ray.origin).normalize();

        assert_relative_eq!(ray.direction.dot(to_point), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_world_to_screen_behind_camera() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        assert!(world_to_screen(Vec3::new(0.0, 0.0, 20.0), Vec2::splat(100.0), &camera).is_none());
    }

    #[test]
    fn test_ray_box_hit_and_miss() {
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        let hit = ray_box(&ray, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE);
        assert_relative_eq!(hit.unwrap(), 9.0, epsilon = 1e-5);

        let miss = Ray::new(Vec3::new(-10.0, 5.0, 0.0), Vec3::X);
        assert!(ray_box(&miss, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE).is_none());

        let behind = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::X);
        assert!(ray_box(&behind, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE).is_none());
    }

    #[test]
    fn test_ray_box_respects_rotation() {
        // A long thin box along X, turned a quarter around Y, now lies along Z
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let half = Vec3::new(5.0, 0.5, 0.5);

        let along_z = Ray::new(Vec3::new(0.0, 0.0, -20.0), Vec3::Z);
        assert_relative_eq!(ray_box(&along_z, Vec3::ZERO, rotation, half).unwrap(), 15.0, epsilon = 1e-4);

        let off_axis = Ray::new(Vec3::new(3.0, 10.0, 0.0), Vec3::NEG_Y);
        assert!(ray_box(&off_axis, Vec3::ZERO, rotation, half).is_none());
    }

    #[test]
    fn test_ray_rectangle_double_sided() {
        let flat = Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let half = Vec2::splat(100.0);

        let from_above = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        assert_relative_eq!(ray_rectangle(&from_above, Vec3::ZERO, flat, half).unwrap(), 10.0, epsilon = 1e-4);

        let from_below = Ray::new(Vec3::new(0.0, -10.0, 0.0), Vec3::Y);
        assert!(ray_rectangle(&from_below, Vec3::ZERO, flat, half).is_some());

        let outside = Ray::new(Vec3::new(150.0, 10.0, 0.0), Vec3::NEG_Y);
        assert!(ray_rectangle(&outside, Vec3::ZERO, flat, half).is_none());
    }

    #[test]
    fn test_raycast_nearest_picks_closest() {
        let material = Arc::new(Material::oak_veneer());
        let mut scene = SceneGraph::new();
        let far = scene.add(
            Mesh::new(Geometry::cuboid(Vec3::ONE), Arc::clone(&material)).with_position(Vec3::new(10.0, 0.0, 0.0)),
        );
        let near = scene.add(
            Mesh::new(Geometry::cuboid(Vec3::ONE), Arc::clone(&material)).with_position(Vec3::new(5.0, 0.0, 0.0)),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = raycast_nearest(&scene, &ray).unwrap();
        assert_eq!(hit.mesh, near);
        assert_ne!(hit.mesh, far);
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-5);
        assert_relative_eq!(hit.position.x, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_raycast_uses_root_offset() {
        let material = Arc::new(Material::oak_veneer());
        let mut scene = SceneGraph::new().with_root_offset(Vec3::new(0.0, -10.0, 0.0));
        let id = scene.add(Mesh::new(Geometry::cuboid(Vec3::ONE), material));

        let at_local_height = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(raycast_nearest(&scene, &at_local_height).is_none());

        let at_world_height = Ray::new(Vec3::new(-5.0, -10.0, 0.0), Vec3::X);
        assert_eq!(raycast_nearest(&scene, &at_world_height).map(|hit| hit.mesh), Some(id));
    }

    #[test]
    fn test_raycast_empty_scene() {
        let scene = SceneGraph::new();
        assert!(raycast_nearest(&scene, &Ray::new(Vec3::ZERO, Vec3::X)).is_none());
    }
}
