//! Jenga Render - scene-side rendering state
//!
//! Everything the renderer needs that does not touch the GPU: the scene
//! graph of meshes, shared materials, the perspective camera with orbit
//! controls, pointer picking, and the instance records uploaded each frame.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐     ┌────────────────┐
//! │          SceneGraph          │◄────│ raycast_nearest│◄── pointer
//! │  root offset, lights, meshes │     └────────────────┘
//! └──────────────┬───────────────┘
//!                ▼
//!         InstanceBatches ──► GPU      Camera ◄── OrbitController
//! ```

pub mod camera;
pub mod instancing;
pub mod material;
pub mod orbit;
pub mod picking;
pub mod scene;

pub mod prelude {
    //! Common imports for scene rendering
    pub use crate::camera::{Camera, Projection};
    pub use crate::instancing::{InstanceBatches, InstanceData, SceneUniforms};
    pub use crate::material::{Color, Material, MaterialLibrary};
    pub use crate::orbit::OrbitController;
    pub use crate::picking::{raycast_nearest, screen_to_ndc, screen_to_ray, world_to_screen, Ray, RaycastHit};
    pub use crate::scene::{AmbientLight, DirectionalLight, Geometry, Mesh, MeshId, SceneGraph};
}

pub use prelude::*;

pub use glam;
