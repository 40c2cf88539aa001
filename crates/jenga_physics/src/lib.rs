//! Jenga Physics - Rapier 3D Integration
//!
//! Rigid-body simulation for the block tower. The crate wraps Rapier behind a
//! small world type so callers deal in plain arrays and copyable handles.
//!
//! # Features
//!
//! - Static and dynamic rigid bodies
//! - Box and infinite-plane colliders with explicit mass
//! - Fixed-timestep stepping with configurable tolerance and solver iterations
//! - Idempotent body removal
//!
//! # Example
//!
//! ```ignore
//! use jenga_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//!
//! let body = physics.create_rigid_body(RigidBodyDesc::dynamic().with_position(0.0, 10.0, 0.0));
//! physics.create_collider(
//!     ColliderDesc::new(ColliderShape::cuboid(7.5, 1.5, 2.5)).with_mass(1.0),
//!     Some(body),
//! );
//!
//! physics.step();
//! let [x, y, z] = physics.body_position(body)?;
//! ```

pub mod body;
pub mod collider;
pub mod config;
pub mod error;
pub mod material;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{RigidBodyDesc, RigidBodyHandle, RigidBodyType};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::material::PhysicsMaterial;
    pub use crate::world::PhysicsWorld;
}

pub use prelude::*;
