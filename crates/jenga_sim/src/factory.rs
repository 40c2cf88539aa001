//! Block factory
//!
//! Turns placements into unattached blueprints. Nothing touches the world or
//! the scene until assembly inserts them.

use std::sync::Arc;

use jenga_physics::{ColliderDesc, ColliderShape, PhysicsMaterial, RigidBodyDesc};
use jenga_render::{Geometry, Material, MaterialLibrary, Mesh};

use crate::config::TowerConfig;
use crate::layout::BlockPlacement;

/// Everything needed to insert one block
#[derive(Clone, Debug)]
pub struct BlockBlueprint {
    pub placement: BlockPlacement,
    pub body: RigidBodyDesc,
    pub collider: ColliderDesc,
    pub mesh: Mesh,
}

/// Builds blueprints sharing one block material
#[derive(Clone, Debug)]
pub struct BlockFactory {
    material: Arc<Material>,
    surface: PhysicsMaterial,
    mass: f32,
}

impl BlockFactory {
    /// Factory for the blocks of `tower`, taking the shared material from `materials`
    pub fn new(tower: &TowerConfig, materials: &mut MaterialLibrary) -> Self {
        Self {
            material: materials.blocks(),
            surface: PhysicsMaterial::default().with_friction(tower.friction),
            mass: tower.block_mass,
        }
    }

    /// Shared render material
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Blueprint for one placement
    pub fn blueprint(&self, placement: &BlockPlacement) -> BlockBlueprint {
        let position = placement.position;
        let half = placement.half_extents;

        let body = RigidBodyDesc::dynamic()
            .with_position(position.x, position.y, position.z)
            .with_rotation(placement.rotation.to_array())
            .with_linear_velocity(0.0, 0.0, 0.0);

        let collider = ColliderDesc::new(ColliderShape::cuboid(half.x, half.y, half.z))
            .with_material(self.surface)
            .with_mass(self.mass);

        let mesh = Mesh::new(Geometry::cuboid(half), Arc::clone(&self.material))
            .with_position(position)
            .with_rotation(placement.rotation);

        BlockBlueprint {
            placement: *placement,
            body,
            collider,
            mesh,
        }
    }

    /// Blueprints for many placements
    pub fn blueprints<'a>(
        &'a self,
        placements: impl IntoIterator<Item = BlockPlacement> + 'a,
    ) -> impl Iterator<Item = BlockBlueprint> + 'a {
        placements.into_iter().map(move |placement| self.blueprint(&placement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{place, placements};
    use glam::Vec3;
    use jenga_physics::RigidBodyType;

    #[test]
    fn test_blueprint_matches_placement() {
        let tower = TowerConfig::default();
        let mut materials = MaterialLibrary::new();
        let factory = BlockFactory::new(&tower, &mut materials);
        let placement = place(&tower, 1, 0).unwrap();

        let blueprint = factory.blueprint(&placement);

        assert_eq!(blueprint.body.body_type, RigidBodyType::Dynamic);
        assert_eq!(blueprint.body.position, placement.position.to_array());
        assert_eq!(blueprint.body.linear_velocity, [0.0; 3]);
        assert_eq!(blueprint.body.angular_velocity, [0.0; 3]);
        assert_eq!(blueprint.collider.mass, Some(1.0));
        assert_eq!(blueprint.collider.material.friction, 0.3);
        assert_eq!(
            blueprint.collider.shape,
            ColliderShape::Box {
                half_extents: [2.5, 1.5, 7.5]
            }
        );
        assert_eq!(blueprint.mesh.geometry, Geometry::cuboid(Vec3::new(2.5, 1.5, 7.5)));
        assert_eq!(blueprint.mesh.position, placement.position);
    }

    #[test]
    fn test_blocks_share_one_material() {
        let tower = TowerConfig::grid(2, 2);
        let mut materials = MaterialLibrary::new();
        let factory = BlockFactory::new(&tower, &mut materials);

        let meshes: Vec<Mesh> = factory.blueprints(placements(&tower)).map(|b| b.mesh).collect();

        assert_eq!(meshes.len(), 4);
        assert!(meshes.iter().all(|m| Arc::ptr_eq(&m.material, factory.material())));
        assert_eq!(materials.len(), 1);
    }
}
