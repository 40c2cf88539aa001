//! Physics world - main simulation container

use crate::body::{RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    config: PhysicsConfig,

    /// Rapier physics pipeline
    pipeline: rapier::PhysicsPipeline,

    /// Gravity
    gravity: rapier::Vector<f32>,

    /// Integration parameters
    integration_params: rapier::IntegrationParameters,

    /// Island manager
    islands: rapier::IslandManager,

    /// Broad phase
    broad_phase: rapier::DefaultBroadPhase,

    /// Narrow phase
    narrow_phase: rapier::NarrowPhase,

    /// Impulse joint set
    impulse_joints: rapier::ImpulseJointSet,

    /// Multibody joint set
    multibody_joints: rapier::MultibodyJointSet,

    /// CCD solver
    ccd_solver: rapier::CCDSolver,

    /// Rigid body set
    bodies: rapier::RigidBodySet,

    /// Collider set
    colliders: rapier::ColliderSet,

    /// Number of fixed steps taken so far
    steps: u64,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.normalized_allowed_linear_error = config.tolerance;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations).unwrap_or(NonZeroUsize::MIN);

        log::debug!(
            "Physics world created: gravity={:?}, dt={:.4}, tolerance={}, iterations={}",
            config.gravity,
            config.timestep,
            config.tolerance,
            config.solver_iterations
        );

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            steps: 0,
        }
    }

    /// Create a world after validating its configuration
    pub fn try_new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Set gravity
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.gravity = rapier::Vector::new(x, y, z);
    }

    /// Get gravity
    pub fn gravity(&self) -> [f32; 3] {
        [self.gravity.x, self.gravity.y, self.gravity.z]
    }

    // ==================== Rigid Bodies ====================

    /// Create a rigid body
    pub fn create_rigid_body(&mut self, desc: RigidBodyDesc) -> RigidBodyHandle {
        let mut builder = desc.to_rapier_builder();
        if !self.config.sleeping_enabled {
            builder = builder.can_sleep(false);
        }
        let handle = self.bodies.insert(builder);
        RigidBodyHandle(handle)
    }

    /// Whether the body is still part of the world
    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Remove a rigid body together with its colliders.
    ///
    /// Returns `false` when the body was already gone, so calling this twice
    /// for the same handle is harmless.
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) -> bool {
        if !self.bodies.contains(handle.0) {
            return false;
        }

        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true, // Remove attached colliders
            )
            .is_some()
    }

    /// Get rigid body position
    pub fn body_position(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let pos = b.translation();
                [pos.x, pos.y, pos.z]
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get rigid body rotation (quaternion: x, y, z, w)
    pub fn body_rotation(&self, handle: RigidBodyHandle) -> Result<[f32; 4]> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let rot = b.rotation();
                [rot.i, rot.j, rot.k, rot.w]
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get rigid body linear velocity
    pub fn body_linear_velocity(&self, handle: RigidBodyHandle) -> Result<[f32; 3]> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let vel = b.linvel();
                [vel.x, vel.y, vel.z]
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Set rigid body linear velocity
    pub fn set_body_linear_velocity(&mut self, handle: RigidBodyHandle, x: f32, y: f32, z: f32) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.set_linvel(rapier::Vector::new(x, y, z), true);
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get the mass of a rigid body
    pub fn body_mass(&self, handle: RigidBodyHandle) -> Result<f32> {
        self.bodies
            .get(handle.0)
            .map(|b| b.mass())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Whether the body is fixed in place
    pub fn is_body_static(&self, handle: RigidBodyHandle) -> Result<bool> {
        self.bodies
            .get(handle.0)
            .map(|b| b.is_fixed())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Colliders ====================

    /// Create a collider, optionally attached to a rigid body
    pub fn create_collider(&mut self, desc: ColliderDesc, parent: Option<RigidBodyHandle>) -> ColliderHandle {
        let builder = desc.to_rapier_builder();
        let handle = match parent {
            Some(body) => self.colliders.insert_with_parent(builder, body.0, &mut self.bodies),
            None => self.colliders.insert(builder),
        };
        ColliderHandle(handle)
    }

    // ==================== Simulation ====================

    /// Advance the simulation by one fixed timestep
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.steps += 1;
    }

    /// Number of steps taken since creation
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Simulated time since creation, in seconds
    pub fn elapsed(&self) -> f32 {
        self.steps as f32 * self.config.timestep
    }

    // ==================== Debug ====================

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Get number of active (awake) bodies
    pub fn active_body_count(&self) -> usize {
        self.islands.active_dynamic_bodies().len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::ColliderShape;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn boxed_body(world: &mut PhysicsWorld, y: f32) -> RigidBodyHandle {
        let body = world.create_rigid_body(RigidBodyDesc::dynamic().with_position(0.0, y, 0.0));
        world.create_collider(
            ColliderDesc::new(ColliderShape::cuboid(0.5, 0.5, 0.5)).with_mass(1.0),
            Some(body),
        );
        body
    }

    #[test]
    fn test_create_world() {
        let world = PhysicsWorld::new(PhysicsConfig::default());
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert_eq!(world.step_count(), 0);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let config = PhysicsConfig::default().with_timestep(0.0);
        assert!(PhysicsWorld::try_new(config).is_err());
    }

    #[test]
    fn test_create_body_and_collider() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        boxed_body(&mut world, 10.0);

        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 1);
    }

    #[test]
    fn test_explicit_mass() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = boxed_body(&mut world, 10.0);
        assert_relative_eq!(world.body_mass(body).unwrap(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_gravity_fall() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = boxed_body(&mut world, 10.0);

        let initial_y = world.body_position(body).unwrap()[1];

        for _ in 0..60 {
            world.step();
        }

        let final_y = world.body_position(body).unwrap()[1];
        assert!(final_y < initial_y, "Body should fall due to gravity");
        assert_eq!(world.step_count(), 60);
        assert_relative_eq!(world.elapsed(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_weightless_body_stays_put() {
        let mut world = PhysicsWorld::new(PhysicsConfig::weightless());
        let body = boxed_body(&mut world, 4.0);

        world.step();

        let position = world.body_position(body).unwrap();
        let rotation = world.body_rotation(body).unwrap();
        assert_abs_diff_eq!(position[1], 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(position[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(rotation[3], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_plane_stops_falling_box() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let ground = world.create_rigid_body(
            RigidBodyDesc::fixed().with_rotation_euler(-std::f32::consts::FRAC_PI_2, 0.0, 0.0),
        );
        world.create_collider(ColliderDesc::new(ColliderShape::Plane), Some(ground));
        let body = boxed_body(&mut world, 2.0);

        for _ in 0..240 {
            world.step();
        }

        let y = world.body_position(body).unwrap()[1];
        assert!(y > 0.3 && y < 0.7, "box should rest on the plane, got y = {}", y);
        assert!(world.is_body_static(ground).unwrap());
    }

    #[test]
    fn test_remove_body_is_idempotent() {
        let mut world = PhysicsWorld::new(PhysicsConfig::default());
        let body = boxed_body(&mut world, 1.0);

        assert!(world.remove_rigid_body(body));
        assert!(!world.remove_rigid_body(body));
        assert!(!world.contains_body(body));
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert!(matches!(
            world.body_position(body),
            Err(PhysicsError::BodyNotFound(_))
        ));
    }
}
