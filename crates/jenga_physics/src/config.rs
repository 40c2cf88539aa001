//! Physics configuration

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Physics world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.8 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep advanced by every call to `step`
    pub timestep: f32,

    /// Allowed solver penetration error, relative to the length unit
    pub tolerance: f32,

    /// Solver iterations per step
    pub solver_iterations: usize,

    /// Enable sleeping for inactive bodies
    pub sleeping_enabled: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.8, 0.0],
            timestep: 1.0 / 60.0,
            tolerance: 0.01,
            solver_iterations: 10,
            sleeping_enabled: true,
        }
    }
}

impl PhysicsConfig {
    /// Softer gravity with a more thorough solver
    pub fn gentle() -> Self {
        Self {
            gravity: [0.0, -4.9, 0.0],
            solver_iterations: 20,
            ..Default::default()
        }
    }

    /// Configuration without gravity, mostly useful for tests
    pub fn weightless() -> Self {
        Self::default().with_gravity(0.0, 0.0, 0.0)
    }

    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set solver tolerance and iteration count
    pub fn with_solver(mut self, tolerance: f32, iterations: usize) -> Self {
        self.tolerance = tolerance;
        self.solver_iterations = iterations;
        self
    }

    /// Check that the values can drive a simulation
    pub fn validate(&self) -> Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver_iterations must be at least 1".to_string(),
            ));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        Ok(())
    }
}
