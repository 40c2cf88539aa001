//! Collider types

use crate::material::PhysicsMaterial;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

impl ColliderHandle {
    /// Create from raw Rapier handle
    pub fn from_raw(handle: rapier::ColliderHandle) -> Self {
        Self(handle)
    }

    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::ColliderHandle {
        self.0
    }
}

/// Collision shape type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Box with half-extents
    Box {
        half_extents: [f32; 3],
    },
    /// Infinite plane; solid below, local normal +Z
    Plane,
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl ColliderShape {
    /// Create a box shape from half-extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: [hx, hy, hz],
        }
    }

    /// Create a box shape from full size
    pub fn from_size(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            half_extents: [width * 0.5, height * 0.5, depth * 0.5],
        }
    }

    /// Build a Rapier shared shape
    pub(crate) fn to_rapier(&self) -> rapier::SharedShape {
        match self {
            Self::Box { half_extents } => {
                rapier::SharedShape::cuboid(half_extents[0], half_extents[1], half_extents[2])
            }
            Self::Plane => rapier::SharedShape::halfspace(rapier::Vector::z_axis()),
        }
    }
}

/// Description for creating a collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderDesc {
    /// Collision shape
    pub shape: ColliderShape,
    /// Physics material
    pub material: PhysicsMaterial,
    /// Explicit mass; when `None` the mass comes from a unit density
    pub mass: Option<f32>,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            material: PhysicsMaterial::default(),
            mass: None,
        }
    }
}

impl ColliderDesc {
    /// Create a new collider description with a shape
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// Set material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set an explicit mass
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Build a Rapier collider builder
    pub(crate) fn to_rapier_builder(&self) -> rapier::ColliderBuilder {
        let builder = rapier::ColliderBuilder::new(self.shape.to_rapier())
            .friction(self.material.friction)
            .restitution(self.material.restitution);

        match self.mass {
            Some(mass) => builder.mass(mass),
            None => builder.density(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_size_halves() {
        assert_eq!(
            ColliderShape::from_size(15.0, 3.0, 5.0),
            ColliderShape::cuboid(7.5, 1.5, 2.5)
        );
    }

    #[test]
    fn test_desc_builder() {
        let desc = ColliderDesc::new(ColliderShape::Plane)
            .with_mass(2.0);
        assert_eq!(desc.shape, ColliderShape::Plane);
        assert_eq!(desc.mass, Some(2.0));
    }
}
