//! Jenga Sim - the block tower
//!
//! Generates the tower layout, pairs one render mesh with one rigid body per
//! block, keeps the meshes in step with physics and handles pick-to-remove.
//!
//! # Architecture
//!
//! ```text
//! layout ──► factory ──► assembly ──► SimulationContext
//!                           ▲              │ frame / click / reset
//!                 ground ───┘              ▼
//!                               PhysicsWorld + SceneGraph
//! ```
//!
//! # Example
//!
//! ```ignore
//! use jenga_sim::prelude::*;
//!
//! let mut sim = SimulationContext::new(SimConfig::for_variant(Variant::Standard))?;
//! sim.resize(1280.0, 720.0);
//!
//! sim.click(Vec2::new(640.0, 360.0), clock.elapsed());
//! let report = sim.frame(clock.elapsed())?;
//! ```

pub mod assembly;
pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod ground;
pub mod layout;
pub mod removal;

pub mod prelude {
    //! Common imports for driving the simulation
    pub use crate::assembly::{BlockPair, GroundPair};
    pub use crate::config::{InteractionConfig, SimConfig, TowerConfig, Variant, ViewConfig};
    pub use crate::context::{ClickOutcome, FrameReport, SimulationContext};
    pub use crate::error::{Result, SimError};
    pub use crate::layout::BlockPlacement;
    pub use glam::Vec2;
}

pub use prelude::*;

pub use jenga_physics;
pub use jenga_render;
