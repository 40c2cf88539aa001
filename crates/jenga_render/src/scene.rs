//! Scene graph holding every renderable mesh
//!
//! Meshes live in a flat map under a single root. The root carries a
//! translation applied to everything it holds, which is how the whole tower
//! is lowered below the camera's orbit target.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::material::{Color, Material};

/// Identifier of a mesh inside one scene graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeshId(u64);

impl MeshId {
    /// Raw id value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Mesh geometry, centered on the mesh origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Box with full edge lengths
    Box { size: Vec3 },
    /// Rectangle in the local XY plane, facing +Z
    Plane { width: f32, height: f32 },
}

impl Geometry {
    /// Box from half-extents
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box {
            size: half_extents * 2.0,
        }
    }

    /// Scale applied to the unit primitive this geometry is drawn from
    pub fn scale(&self) -> Vec3 {
        match *self {
            Self::Box { size } => size,
            Self::Plane { width, height } => Vec3::new(width, height, 1.0),
        }
    }

    /// Half-size of a plane, or `None` for a box
    pub fn plane_half_size(&self) -> Option<Vec2> {
        match *self {
            Self::Plane { width, height } => Some(Vec2::new(width * 0.5, height * 0.5)),
            Self::Box { .. } => None,
        }
    }
}

/// A renderable object
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Geometry,
    /// Position relative to the scene root
    pub position: Vec3,
    pub rotation: Quat,
    /// Shared material
    pub material: Arc<Material>,
    /// Per-mesh color replacing the material color
    pub color_override: Option<Color>,
}

impl Mesh {
    /// Create a mesh at the origin
    pub fn new(geometry: Geometry, material: Arc<Material>) -> Self {
        Self {
            geometry,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            material,
            color_override: None,
        }
    }

    /// Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Overwrite position and rotation
    pub fn set_transform(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }

    /// Override the displayed color of this mesh only
    pub fn set_color(&mut self, color: Color) {
        self.color_override = Some(color);
    }

    /// Color actually displayed
    pub fn color(&self) -> Color {
        self.color_override.unwrap_or(self.material.color)
    }

    /// Model matrix given the root translation
    pub fn model_matrix(&self, root_offset: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.geometry.scale(),
            self.rotation,
            self.position + root_offset,
        )
    }
}

/// Ambient light
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Directional light shining from `position` toward the origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the scene toward the light
    pub fn direction_to_light(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(-2.0, 0.3, 0.0),
        }
    }
}

/// Flat scene graph with one translated root
#[derive(Debug)]
pub struct SceneGraph {
    meshes: BTreeMap<MeshId, Mesh>,
    next_id: u64,
    root_offset: Vec3,
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub clear_color: Color,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self {
            meshes: BTreeMap::new(),
            next_id: 1,
            root_offset: Vec3::ZERO,
            ambient: AmbientLight::default(),
            directional: DirectionalLight::default(),
            clear_color: Color::from_hex(0x808080),
        }
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root translation
    pub fn with_root_offset(mut self, offset: Vec3) -> Self {
        self.root_offset = offset;
        self
    }

    /// Root translation
    pub fn root_offset(&self) -> Vec3 {
        self.root_offset
    }

    /// Insert a mesh, returning its id
    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.meshes.insert(id, mesh);
        id
    }

    /// Detach a mesh. Returns `None` when it was already gone.
    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        self.meshes.remove(&id)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.meshes.contains_key(&id)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    /// Meshes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().map(|(id, mesh)| (*id, mesh))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// World-space position and rotation of a mesh
    pub fn world_transform(&self, id: MeshId) -> Option<(Vec3, Quat)> {
        self.meshes
            .get(&id)
            .map(|mesh| (mesh.position + self.root_offset, mesh.rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> Arc<Material> {
        Arc::new(Material::oak_veneer())
    }

    #[test]
    fn test_add_remove_is_idempotent() {
        let mut scene = SceneGraph::new();
        let id = scene.add(Mesh::new(Geometry::cuboid(Vec3::ONE), material()));

        assert!(scene.contains(id));
        assert!(scene.remove(id).is_some());
        assert!(scene.remove(id).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add(Mesh::new(Geometry::cuboid(Vec3::ONE), material()));
        let b = scene.add(Mesh::new(Geometry::cuboid(Vec3::ONE), material()));
        let order: Vec<MeshId> = scene.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, b]);
        assert!(a < b);
    }

    #[test]
    fn test_color_override_is_per_mesh() {
        let shared = material();
        let mut first = Mesh::new(Geometry::cuboid(Vec3::ONE), Arc::clone(&shared));
        let second = Mesh::new(Geometry::cuboid(Vec3::ONE), Arc::clone(&shared));

        first.set_color(Color::from_hex(0xff0000));

        assert_eq!(first.color().to_hex(), 0xff0000);
        assert_eq!(second.color(), shared.color);
    }

    #[test]
    fn test_world_transform_applies_root_offset() {
        let mut scene = SceneGraph::new().with_root_offset(Vec3::new(0.0, -10.0, 0.0));
        let id = scene.add(
            Mesh::new(Geometry::cuboid(Vec3::ONE), material()).with_position(Vec3::new(1.0, 3.0, 0.0)),
        );
        let (position, rotation) = scene.world_transform(id).unwrap();
        assert_eq!(position, Vec3::new(1.0, -7.0, 0.0));
        assert_eq!(rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_plane_scale() {
        let plane = Geometry::Plane {
            width: 200.0,
            height: 100.0,
        };
        assert_eq!(plane.scale(), Vec3::new(200.0, 100.0, 1.0));
        assert_eq!(plane.plane_half_size(), Some(Vec2::new(100.0, 50.0)));
        assert_eq!(Geometry::cuboid(Vec3::ONE).plane_half_size(), None);
    }
}
