//! Simulation context
//!
//! Owns the physics world, the scene graph and everything tying them
//! together. The host drives it with three calls: `frame` once per display
//! refresh, `click` for pointer clicks and `reset` to rebuild the tower.
//!
//! Time is passed in explicitly as a [`Duration`] since the host started, so
//! deferred removals fire deterministically.

use std::collections::HashMap;
use std::time::Duration;

use glam::{Quat, Vec2, Vec3};
use jenga_physics::{PhysicsWorld, RigidBodyHandle};
use jenga_render::{raycast_nearest, screen_to_ray, Camera, Color, MaterialLibrary, MeshId, OrbitController, RaycastHit, SceneGraph};

use crate::assembly::{assemble, build_scene, BlockPair, GroundPair};
use crate::config::SimConfig;
use crate::error::Result;
use crate::removal::RemovalQueue;

/// Viewport assumed until the host reports its size
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

const STATS_INTERVAL: u64 = 600;

/// What a click did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The ray crossed no mesh
    Missed,
    /// The nearest mesh has no removable body (the ground)
    NoBody(MeshId),
    /// The block turned red and will be removed at `due`
    Scheduled { mesh: MeshId, due: Duration },
    /// The block was already waiting for removal
    AlreadyPending(MeshId),
}

impl ClickOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled { .. })
    }
}

/// Summary of one frame
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Frames run since the last build or reset
    pub frame: u64,
    /// Blocks removed by timers at the start of this frame
    pub removed: Vec<MeshId>,
    pub live_blocks: usize,
    pub awake_bodies: usize,
}

/// Everything one running tower needs
pub struct SimulationContext {
    config: SimConfig,
    world: PhysicsWorld,
    scene: SceneGraph,
    materials: MaterialLibrary,
    blocks: Vec<BlockPair>,
    bodies_by_mesh: HashMap<MeshId, RigidBodyHandle>,
    ground: GroundPair,
    removals: RemovalQueue,
    camera: Camera,
    orbit: OrbitController,
    viewport: Vec2,
    highlight: Color,
    frames: u64,
}

impl SimulationContext {
    /// Validate `config` and assemble a fresh tower
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;

        let mut world = PhysicsWorld::try_new(config.physics.clone())?;
        let mut scene = build_scene(&config.view);
        let mut materials = MaterialLibrary::new();
        let assembly = assemble(&config, &mut world, &mut scene, &mut materials);

        let viewport = DEFAULT_VIEWPORT;
        let (camera, orbit) = initial_view(&config, viewport);
        let highlight = Color::from_hex(config.interaction.highlight_color);

        log::info!(
            "Tower built: {} blocks ({}x{}), gravity {:?}",
            assembly.blocks.len(),
            config.tower.rows,
            config.tower.columns,
            config.physics.gravity
        );

        Ok(Self {
            config,
            world,
            scene,
            materials,
            blocks: assembly.blocks,
            bodies_by_mesh: assembly.bodies_by_mesh,
            ground: assembly.ground,
            removals: RemovalQueue::new(),
            camera,
            orbit,
            viewport,
            highlight,
            frames: 0,
        })
    }

    /// Run one iteration of the loop
    ///
    /// Fires due removals, advances physics by one fixed step, copies every
    /// body transform onto its mesh and applies orbit damping. The host
    /// renders afterwards.
    pub fn frame(&mut self, now: Duration) -> Result<FrameReport> {
        let removed = self.fire_due_removals(now);

        self.world.step();
        self.sync_meshes()?;
        self.orbit.update(&mut self.camera);

        self.frames += 1;
        let report = FrameReport {
            frame: self.frames,
            removed,
            live_blocks: self.blocks.len(),
            awake_bodies: self.world.active_body_count(),
        };

        if self.frames % STATS_INTERVAL == 0 {
            log::debug!(
                "Frame {}: {} blocks, {} awake, {:.1}s simulated",
                report.frame,
                report.live_blocks,
                report.awake_bodies,
                self.world.elapsed()
            );
        }

        Ok(report)
    }

    /// Copy every block body's position and orientation onto its mesh
    pub fn sync_meshes(&mut self) -> Result<()> {
        for pair in &self.blocks {
            let position = Vec3::from_array(self.world.body_position(pair.body)?);
            let rotation = Quat::from_array(self.world.body_rotation(pair.body)?);
            if let Some(mesh) = self.scene.get_mut(pair.mesh) {
                mesh.set_transform(position, rotation);
            }
        }
        Ok(())
    }

    /// Nearest mesh under a pointer position given in client pixels
    pub fn pick(&self, screen_pos: Vec2) -> Option<RaycastHit> {
        let ray = screen_to_ray(screen_pos, self.viewport, &self.camera);
        raycast_nearest(&self.scene, &ray)
    }

    /// Handle a click at `screen_pos`
    ///
    /// A block under the pointer turns to the highlight color now and is
    /// removed once the clock passes `now` plus the removal delay.
    pub fn click(&mut self, screen_pos: Vec2, now: Duration) -> ClickOutcome {
        let Some(hit) = self.pick(screen_pos) else {
            log::debug!("Click at {:?} hit nothing", screen_pos);
            return ClickOutcome::Missed;
        };

        if !self.bodies_by_mesh.contains_key(&hit.mesh) {
            log::debug!("Click hit mesh {} without a removable body", hit.mesh.raw());
            return ClickOutcome::NoBody(hit.mesh);
        }

        if self.removals.is_pending(hit.mesh) {
            return ClickOutcome::AlreadyPending(hit.mesh);
        }

        if let Some(mesh) = self.scene.get_mut(hit.mesh) {
            mesh.set_color(self.highlight);
        }
        let due = now + self.config.interaction.removal_delay();
        self.removals.schedule(hit.mesh, due);
        log::debug!("Block {} picked at {:.1} units, removal at {:?}", hit.mesh.raw(), hit.distance, due);

        ClickOutcome::Scheduled { mesh: hit.mesh, due }
    }

    /// Remove a block's body and mesh together
    ///
    /// Cancels any pending timer for it. Returns `false` when the block was
    /// already gone or `mesh` is not a block.
    pub fn remove_block(&mut self, mesh: MeshId) -> bool {
        self.removals.cancel(mesh);

        let Some(body) = self.bodies_by_mesh.remove(&mesh) else {
            return false;
        };
        self.world.remove_rigid_body(body);
        self.scene.remove(mesh);
        self.blocks.retain(|pair| pair.mesh != mesh);
        true
    }

    /// Remove every block whose timer is due at `now`
    pub fn fire_due_removals(&mut self, now: Duration) -> Vec<MeshId> {
        let due = self.removals.take_due(now);
        let mut removed = Vec::with_capacity(due.len());
        for mesh in due {
            if self.remove_block(mesh) {
                log::info!("Block {} removed, {} left", mesh.raw(), self.blocks.len());
                removed.push(mesh);
            }
        }
        removed
    }

    /// Tear everything down and assemble a fresh tower from the same configuration
    ///
    /// Pending removals are dropped and the camera returns to its starting
    /// framing. The viewport size is kept.
    pub fn reset(&mut self) {
        let live = self.blocks.len();

        self.removals.clear();
        self.blocks.clear();
        self.bodies_by_mesh.clear();

        self.world = PhysicsWorld::new(self.config.physics.clone());
        self.scene = build_scene(&self.config.view);
        let assembly = assemble(&self.config, &mut self.world, &mut self.scene, &mut self.materials);
        self.blocks = assembly.blocks;
        self.bodies_by_mesh = assembly.bodies_by_mesh;
        self.ground = assembly.ground;

        let (camera, orbit) = initial_view(&self.config, self.viewport);
        self.camera = camera;
        self.orbit = orbit;
        self.frames = 0;

        log::info!("Tower reset: {} -> {} blocks", live, self.blocks.len());
    }

    /// Track a new viewport size in client pixels
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = Vec2::new(width, height);
        self.camera.set_aspect(width, height);
        log::debug!("Viewport resized to {}x{}", width, height);
    }

    /// Move the camera to `eye` and orbit around `target` from now on
    pub fn look_from(&mut self, eye: Vec3, target: Vec3) {
        self.camera.position = eye;
        self.camera.look_at(target, Vec3::Y);
        self.orbit.target = target;
        self.orbit.stop();
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Orbit controls, for feeding pointer drags and wheel input
    pub fn orbit_mut(&mut self) -> &mut OrbitController {
        &mut self.orbit
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Live block pairs in creation order
    pub fn blocks(&self) -> &[BlockPair] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Live block pairs plus the ground pair
    pub fn pair_count(&self) -> usize {
        self.blocks.len() + 1
    }

    pub fn ground(&self) -> GroundPair {
        self.ground
    }

    /// Body driving a block mesh
    pub fn body_for(&self, mesh: MeshId) -> Option<RigidBodyHandle> {
        self.bodies_by_mesh.get(&mesh).copied()
    }

    /// Block at `(row, column)` if it is still standing
    pub fn block_at(&self, row: u32, column: u32) -> Option<BlockPair> {
        self.blocks
            .iter()
            .find(|pair| pair.row == row && pair.column == column)
            .copied()
    }

    pub fn removals(&self) -> &RemovalQueue {
        &self.removals
    }

    pub fn is_removal_pending(&self, mesh: MeshId) -> bool {
        self.removals.is_pending(mesh)
    }

    /// Frames run since the last build or reset
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

fn initial_view(config: &SimConfig, viewport: Vec2) -> (Camera, OrbitController) {
    let view = &config.view;
    let mut camera = Camera::perspective(
        view.fov_degrees.to_radians(),
        viewport.x / viewport.y,
        view.near,
        view.far,
    )
    .with_position(view.camera_position());
    camera.look_at(view.camera_target(), Vec3::Y);

    let orbit = OrbitController::new(view.camera_target()).with_damping(view.damping_factor);
    (camera, orbit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TowerConfig;
    use jenga_physics::PhysicsConfig;

    fn small_tower() -> SimulationContext {
        let config = SimConfig::default().with_tower(TowerConfig::grid(2, 2));
        SimulationContext::new(config).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimConfig::default().with_tower(TowerConfig::grid(3, 0));
        assert!(SimulationContext::new(config).is_err());
    }

    #[test]
    fn test_remove_block_is_idempotent() {
        let mut ctx = small_tower();
        let mesh = ctx.blocks()[0].mesh;
        let body = ctx.blocks()[0].body;

        assert!(ctx.remove_block(mesh));
        assert!(!ctx.remove_block(mesh));

        assert_eq!(ctx.block_count(), 3);
        assert!(!ctx.world().contains_body(body));
        assert!(!ctx.scene().contains(mesh));
        assert_eq!(ctx.body_for(mesh), None);
    }

    #[test]
    fn test_ground_cannot_be_removed() {
        let mut ctx = small_tower();
        let ground = ctx.ground();
        assert!(!ctx.remove_block(ground.mesh));
        assert!(ctx.world().contains_body(ground.body));
    }

    #[test]
    fn test_remove_cancels_pending_timer() {
        let mut ctx = small_tower();
        let mesh = ctx.blocks()[0].mesh;
        ctx.removals.schedule(mesh, Duration::from_millis(150));

        assert!(ctx.remove_block(mesh));
        assert!(!ctx.is_removal_pending(mesh));
    }

    #[test]
    fn test_frame_counts_and_reports() {
        let mut ctx = SimulationContext::new(
            SimConfig::default()
                .with_tower(TowerConfig::grid(2, 2))
                .with_physics(PhysicsConfig::weightless()),
        )
        .unwrap();

        let report = ctx.frame(Duration::ZERO).unwrap();
        assert_eq!(report.frame, 1);
        assert!(report.removed.is_empty());
        assert_eq!(report.live_blocks, 4);
        assert_eq!(ctx.world().step_count(), 1);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut ctx = small_tower();
        ctx.resize(1000.0, 500.0);
        assert_eq!(ctx.viewport(), Vec2::new(1000.0, 500.0));
        assert_eq!(ctx.camera().projection.aspect, 2.0);

        ctx.resize(0.0, 500.0);
        assert_eq!(ctx.viewport(), Vec2::new(1000.0, 500.0));
    }

    #[test]
    fn test_block_at() {
        let ctx = small_tower();
        let pair = ctx.block_at(1, 0).unwrap();
        assert_eq!((pair.row, pair.column), (1, 0));
        assert!(ctx.block_at(2, 0).is_none());
    }
}
