//! Simulation configuration
//!
//! Every section falls back to its defaults, so a TOML file only needs the
//! values it changes:
//!
//! ```toml
//! variant = "gentle"     # standard, gentle
//!
//! [tower]
//! rows = 12
//!
//! [interaction]
//! removal_delay_ms = 300
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use glam::Vec3;
use jenga_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Shortest allowed delay between a pick and the removal
pub const MIN_REMOVAL_DELAY_MS: u64 = 150;
/// Longest allowed delay between a pick and the removal
pub const MAX_REMOVAL_DELAY_MS: u64 = 500;

/// Tower layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    /// Number of stacked rows
    pub rows: u32,
    /// Blocks per row
    pub columns: u32,
    /// Short horizontal edge of a block
    pub block_width: f32,
    /// Vertical edge of a block
    pub block_height: f32,
    /// Spacing between neighbouring blocks and rows
    pub gap: f32,
    /// Mass of every block
    pub block_mass: f32,
    /// Surface friction of blocks and ground
    pub friction: f32,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            rows: 18,
            columns: 3,
            block_width: 5.0,
            block_height: 3.0,
            gap: 0.07,
            block_mass: 1.0,
            friction: 0.3,
        }
    }
}

impl TowerConfig {
    /// Tower with the given grid and default block dimensions
    pub fn grid(rows: u32, columns: u32) -> Self {
        Self {
            rows,
            columns,
            ..Default::default()
        }
    }

    /// Long horizontal edge of a block, spanning the whole row
    pub fn block_breadth(&self) -> f32 {
        self.block_width * self.columns as f32
    }

    /// Number of blocks in the full tower
    pub fn block_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }
}

/// Pointer interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Delay between a pick and the removal
    pub removal_delay_ms: u64,
    /// Color shown on a picked block (0xRRGGBB)
    pub highlight_color: u32,
    /// Pointer travel below which a press/release counts as a click
    pub click_slop_px: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            removal_delay_ms: MIN_REMOVAL_DELAY_MS,
            highlight_color: 0xff0000,
            click_slop_px: 4.0,
        }
    }
}

impl InteractionConfig {
    pub fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }
}

/// Camera, lighting and ground presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    /// Translation applied to the whole scene
    pub scene_offset: [f32; 3],
    /// Edge length of the visual floor
    pub ground_size: f32,
    pub clear_color: u32,
    /// Orbit damping; 0 disables inertia
    pub damping_factor: f32,
    /// Cap on the device pixel ratio used for the render target
    pub max_pixel_ratio: f32,
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub light_color: u32,
    pub light_intensity: f32,
    pub light_position: [f32; 3],
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_position: [0.0, 70.0, 60.0],
            camera_target: [0.0, 0.0, 0.0],
            scene_offset: [0.0, -10.0, 0.0],
            ground_size: 200.0,
            clear_color: 0x808080,
            damping_factor: 0.05,
            max_pixel_ratio: 2.0,
            ambient_color: 0xffffff,
            ambient_intensity: 1.0,
            light_color: 0xffffff,
            light_intensity: 1.0,
            light_position: [-2.0, 0.3, 0.0],
        }
    }
}

impl ViewConfig {
    pub fn camera_position(&self) -> Vec3 {
        Vec3::from_array(self.camera_position)
    }

    pub fn camera_target(&self) -> Vec3 {
        Vec3::from_array(self.camera_target)
    }

    pub fn scene_offset(&self) -> Vec3 {
        Vec3::from_array(self.scene_offset)
    }
}

/// Named sets of tuning constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Earth gravity, quick removal
    #[default]
    Standard,
    /// Half gravity, thorough solver, slow removal, wider framing
    Gentle,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Gentle => write!(f, "gentle"),
        }
    }
}

impl FromStr for Variant {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "default" | "" => Ok(Self::Standard),
            "gentle" | "slow" => Ok(Self::Gentle),
            other => Err(SimError::UnknownVariant(other.to_string())),
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tower: TowerConfig,
    pub physics: PhysicsConfig,
    pub interaction: InteractionConfig,
    pub view: ViewConfig,
}

impl SimConfig {
    /// Configuration for a named variant
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Standard => Self::default(),
            Variant::Gentle => Self {
                physics: PhysicsConfig::gentle(),
                interaction: InteractionConfig {
                    removal_delay_ms: MAX_REMOVAL_DELAY_MS,
                    ..Default::default()
                },
                view: ViewConfig {
                    camera_position: [0.0, 80.0, 80.0],
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    /// Set the tower layout
    pub fn with_tower(mut self, tower: TowerConfig) -> Self {
        self.tower = tower;
        self
    }

    /// Set the physics configuration
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Parse TOML overrides on top of the variant named in the file (standard when absent)
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Self::from_toml_str_with_variant(source, Variant::Standard).map(|(config, _)| config)
    }

    /// Parse TOML overrides on top of the variant named in the file, or `fallback`
    ///
    /// Returns the configuration and the variant it was built on.
    pub fn from_toml_str_with_variant(source: &str, fallback: Variant) -> Result<(Self, Variant)> {
        let mut overrides: toml::Table = source.parse()?;
        let variant = match overrides.remove("variant") {
            Some(toml::Value::String(name)) => name.parse()?,
            Some(other) => {
                return Err(SimError::InvalidConfig(format!(
                    "variant must be a string, got {}",
                    other
                )))
            }
            None => fallback,
        };
        let config = Self::overlay(Self::for_variant(variant), overrides)?;
        Ok((config, variant))
    }

    /// Apply TOML overrides on top of `base`
    pub fn overlay(base: Self, overrides: toml::Table) -> Result<Self> {
        let mut merged = match toml::Value::try_from(base)? {
            toml::Value::Table(table) => table,
            _ => return Err(SimError::InvalidConfig("configuration is not a table".to_string())),
        };
        merge_tables(&mut merged, overrides);

        let config: Self = toml::Value::Table(merged).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> Result<()> {
        let tower = &self.tower;
        if tower.rows == 0 || tower.columns == 0 {
            return Err(SimError::InvalidConfig(format!(
                "tower needs at least one row and one column, got {}x{}",
                tower.rows, tower.columns
            )));
        }
        for (name, value) in [
            ("block_width", tower.block_width),
            ("block_height", tower.block_height),
            ("block_mass", tower.block_mass),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!("{} must be positive, got {}", name, value)));
            }
        }
        if !(tower.gap.is_finite() && tower.gap >= 0.0) {
            return Err(SimError::InvalidConfig(format!("gap must not be negative, got {}", tower.gap)));
        }
        if !(tower.friction.is_finite() && tower.friction >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "friction must not be negative, got {}",
                tower.friction
            )));
        }

        let delay = self.interaction.removal_delay_ms;
        if !(MIN_REMOVAL_DELAY_MS..=MAX_REMOVAL_DELAY_MS).contains(&delay) {
            return Err(SimError::InvalidConfig(format!(
                "removal_delay_ms must be within {}..={}, got {}",
                MIN_REMOVAL_DELAY_MS, MAX_REMOVAL_DELAY_MS, delay
            )));
        }
        if self.interaction.highlight_color > 0xffffff {
            return Err(SimError::InvalidConfig(format!(
                "highlight_color must be 0xRRGGBB, got {:#x}",
                self.interaction.highlight_color
            )));
        }

        let view = &self.view;
        if !(view.fov_degrees > 0.0 && view.fov_degrees < 180.0) {
            return Err(SimError::InvalidConfig(format!(
                "fov_degrees must be within (0, 180), got {}",
                view.fov_degrees
            )));
        }
        if !(view.near > 0.0 && view.far > view.near) {
            return Err(SimError::InvalidConfig(format!(
                "clip planes must satisfy 0 < near < far, got {} and {}",
                view.near, view.far
            )));
        }
        if !(view.ground_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "ground_size must be positive, got {}",
                view.ground_size
            )));
        }
        if view.camera_position == view.camera_target {
            return Err(SimError::InvalidConfig("camera_position equals camera_target".to_string()));
        }

        self.physics.validate()?;
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => merge_tables(existing, nested),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
