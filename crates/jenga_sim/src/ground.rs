//! Ground plane
//!
//! The collider is an infinite half-space; only the visual floor is finite.

use std::f32::consts::FRAC_PI_2;

use glam::Quat;
use jenga_physics::{ColliderDesc, ColliderShape, PhysicsMaterial, RigidBodyDesc};
use jenga_render::{Geometry, MaterialLibrary, Mesh};

/// Ground description
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundPlane {
    /// Edge length of the visual floor
    pub size: f32,
    pub friction: f32,
}

/// Unattached ground body, collider and floor mesh
#[derive(Clone, Debug)]
pub struct GroundBlueprint {
    pub body: RigidBodyDesc,
    pub collider: ColliderDesc,
    pub mesh: Mesh,
}

impl GroundPlane {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            friction: PhysicsMaterial::default().friction,
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Turns the local +Z normal into world +Y
    pub fn rotation() -> Quat {
        Quat::from_rotation_x(-FRAC_PI_2)
    }

    pub fn blueprint(&self, materials: &mut MaterialLibrary) -> GroundBlueprint {
        let rotation = Self::rotation();

        let body = RigidBodyDesc::fixed().with_rotation(rotation.to_array());
        let collider = ColliderDesc::new(ColliderShape::Plane)
            .with_material(PhysicsMaterial::default().with_friction(self.friction));
        let mesh = Mesh::new(
            Geometry::Plane {
                width: self.size,
                height: self.size,
            },
            materials.floor(),
        )
        .with_rotation(rotation);

        GroundBlueprint { body, collider, mesh }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use jenga_physics::body::euler_to_quat;
    use jenga_physics::RigidBodyType;

    #[test]
    fn test_rotation_points_normal_up() {
        let normal = GroundPlane::rotation() * Vec3::Z;
        assert_relative_eq!(normal.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_matches_euler_rotation() {
        let from_euler = euler_to_quat(-FRAC_PI_2, 0.0, 0.0);
        let rotation = GroundPlane::rotation().to_array();
        for (a, b) in rotation.iter().zip(from_euler.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_blueprint_is_static_and_double_sided() {
        let mut materials = MaterialLibrary::new();
        let ground = GroundPlane::new(200.0).with_friction(0.5).blueprint(&mut materials);

        assert_eq!(ground.body.body_type, RigidBodyType::Static);
        assert_eq!(ground.collider.shape, ColliderShape::Plane);
        assert_eq!(ground.collider.material.friction, 0.5);
        assert_eq!(ground.mesh.geometry.plane_half_size(), Some(glam::Vec2::splat(100.0)));
        assert!(ground.mesh.material.double_sided);
    }
}
