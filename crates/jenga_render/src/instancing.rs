//! GPU instancing data
//!
//! Flattens the scene graph into per-instance records the renderer uploads
//! into instance-rate vertex buffers, one batch per primitive.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};

use crate::camera::Camera;
use crate::scene::{Geometry, SceneGraph};

/// Per-instance data uploaded to GPU
///
/// Each field maps to vertex attributes at consecutive shader locations.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix (4x4 column-major)
    /// Shader locations: 2, 3, 4, 5
    pub model_matrix: [[f32; 4]; 4],

    /// Inverse transpose of upper-left 3x3 for normal transformation
    /// Stored as 3 vec4s for GPU alignment
    /// Shader locations: 6, 7, 8
    pub normal_matrix: [[f32; 4]; 3],

    /// Linear RGBA color
    /// Shader location: 9
    pub color: [f32; 4],
}

impl InstanceData {
    /// Size of InstanceData in bytes
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Create instance data from a model matrix and color
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            model_matrix: model.to_cols_array_2d(),
            normal_matrix: compute_normal_matrix(&model),
            color,
        }
    }
}

/// Compute the normal matrix (inverse transpose of upper-left 3x3)
pub fn compute_normal_matrix(model: &Mat4) -> [[f32; 4]; 3] {
    let upper = Mat3::from_mat4(*model);
    if upper.determinant().abs() < 1e-10 {
        return [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]];
    }
    let normal = upper.inverse().transpose();
    [
        normal.x_axis.extend(0.0).to_array(),
        normal.y_axis.extend(0.0).to_array(),
        normal.z_axis.extend(0.0).to_array(),
    ]
}

/// Per-frame uniforms shared by every draw
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz: direction toward the light, w: unused
    pub light_direction: [f32; 4],
    /// rgb: directional color times intensity
    pub light_color: [f32; 4],
    /// rgb: ambient color times intensity
    pub ambient: [f32; 4],
}

impl SceneUniforms {
    /// Gather camera and lights
    pub fn new(scene: &SceneGraph, camera: &Camera) -> Self {
        let directional = scene.directional;
        let ambient = scene.ambient;
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            light_direction: directional.direction_to_light().extend(0.0).to_array(),
            light_color: directional.color.scaled(directional.intensity).to_array(1.0),
            ambient: ambient.color.scaled(ambient.intensity).to_array(1.0),
        }
    }
}

/// Instances grouped by the primitive they are drawn with
#[derive(Clone, Debug, Default)]
pub struct InstanceBatches {
    /// Unit cubes
    pub boxes: Vec<InstanceData>,
    /// Unit quads
    pub planes: Vec<InstanceData>,
}

impl InstanceBatches {
    /// Collect every mesh of the scene
    pub fn collect(scene: &SceneGraph) -> Self {
        let mut batches = Self::default();
        batches.refill(scene);
        batches
    }

    /// Rebuild in place, keeping allocations
    pub fn refill(&mut self, scene: &SceneGraph) {
        self.boxes.clear();
        self.planes.clear();

        let offset = scene.root_offset();
        for (_, mesh) in scene.iter() {
            let instance = InstanceData::new(mesh.model_matrix(offset), mesh.color().to_array(1.0));
            match mesh.geometry {
                Geometry::Box { .. } => self.boxes.push(instance),
                Geometry::Plane { .. } => self.planes.push(instance),
            }
        }
    }

    /// Total number of instances
    pub fn len(&self) -> usize {
        self.boxes.len() + self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
