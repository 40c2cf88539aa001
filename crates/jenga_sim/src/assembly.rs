//! Scene assembly
//!
//! Inserts blueprints into the physics world and the scene graph, pairing
//! every mesh with the body that drives it.

use std::collections::HashMap;

use jenga_physics::{PhysicsWorld, RigidBodyHandle};
use jenga_render::{AmbientLight, Color, DirectionalLight, MaterialLibrary, MeshId, SceneGraph};

use crate::config::{SimConfig, ViewConfig};
use crate::factory::{BlockBlueprint, BlockFactory};
use crate::ground::{GroundBlueprint, GroundPlane};
use crate::layout::placements;

/// A block's mesh and the body driving it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockPair {
    pub mesh: MeshId,
    pub body: RigidBodyHandle,
    pub row: u32,
    pub column: u32,
}

/// The ground's floor mesh and static body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundPair {
    pub mesh: MeshId,
    pub body: RigidBodyHandle,
}

/// Result of assembling a tower
#[derive(Debug)]
pub struct Assembly {
    /// Block pairs in row-major creation order
    pub blocks: Vec<BlockPair>,
    /// Pickable meshes and their bodies; the ground is not listed
    pub bodies_by_mesh: HashMap<MeshId, RigidBodyHandle>,
    pub ground: GroundPair,
}

impl Assembly {
    /// Block pairs plus the ground pair
    pub fn pair_count(&self) -> usize {
        self.blocks.len() + 1
    }
}

/// Empty scene with the configured root offset, lights and clear color
pub fn build_scene(view: &ViewConfig) -> SceneGraph {
    let mut scene = SceneGraph::new().with_root_offset(view.scene_offset());
    scene.ambient = AmbientLight {
        color: Color::from_hex(view.ambient_color),
        intensity: view.ambient_intensity,
    };
    scene.directional = DirectionalLight {
        color: Color::from_hex(view.light_color),
        intensity: view.light_intensity,
        position: glam::Vec3::from_array(view.light_position),
    };
    scene.clear_color = Color::from_hex(view.clear_color);
    scene
}

/// Insert one block
pub fn insert_block(world: &mut PhysicsWorld, scene: &mut SceneGraph, blueprint: BlockBlueprint) -> BlockPair {
    let body = world.create_rigid_body(blueprint.body);
    world.create_collider(blueprint.collider, Some(body));
    let mesh = scene.add(blueprint.mesh);

    BlockPair {
        mesh,
        body,
        row: blueprint.placement.row,
        column: blueprint.placement.column,
    }
}

/// Insert the ground
pub fn insert_ground(world: &mut PhysicsWorld, scene: &mut SceneGraph, blueprint: GroundBlueprint) -> GroundPair {
    let body = world.create_rigid_body(blueprint.body);
    world.create_collider(blueprint.collider, Some(body));
    let mesh = scene.add(blueprint.mesh);
    GroundPair { mesh, body }
}

/// Build the ground and the whole tower into `world` and `scene`
pub fn assemble(
    config: &SimConfig,
    world: &mut PhysicsWorld,
    scene: &mut SceneGraph,
    materials: &mut MaterialLibrary,
) -> Assembly {
    let ground_blueprint = GroundPlane::new(config.view.ground_size)
        .with_friction(config.tower.friction)
        .blueprint(materials);
    let ground = insert_ground(world, scene, ground_blueprint);

    let factory = BlockFactory::new(&config.tower, materials);
    let mut blocks = Vec::with_capacity(config.tower.block_count());
    let mut bodies_by_mesh = HashMap::with_capacity(config.tower.block_count());

    for blueprint in factory.blueprints(placements(&config.tower)) {
        let pair = insert_block(world, scene, blueprint);
        bodies_by_mesh.insert(pair.mesh, pair.body);
        blocks.push(pair);
    }

    log::debug!(
        "Assembled {}x{} tower: {} bodies, {} meshes",
        config.tower.rows,
        config.tower.columns,
        world.body_count(),
        scene.len()
    );

    Assembly {
        blocks,
        bodies_by_mesh,
        ground,
    }
}
