//! Error types for the tower simulation

use jenga_physics::PhysicsError;
use thiserror::Error;

/// Simulation errors
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unknown variant name
    #[error("Unknown variant '{0}' (expected 'standard' or 'gentle')")]
    UnknownVariant(String),

    /// Layout index outside the tower
    #[error("Block ({row}, {column}) is outside a {rows}x{columns} tower")]
    OutOfBounds {
        row: u32,
        column: u32,
        rows: u32,
        columns: u32,
    },

    /// TOML could not be parsed into a configuration
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be turned into TOML
    #[error("Failed to encode configuration: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    /// Physics world failure
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Result type for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;
