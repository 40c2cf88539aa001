//! Host error types

use jenga_sim::SimError;
use thiserror::Error;

/// Errors that stop the host
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("No compatible GPU adapter found")]
    AdapterNotFound,

    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("Web platform error: {0}")]
    Web(String),
}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, AppError>;
