//! Jenga host
//!
//! Windowed front end for the tower simulation: a winit event loop drives
//! [`jenga_sim::SimulationContext`] once per redraw and a wgpu renderer
//! draws the scene graph it maintains. Runs natively and in the browser.

pub mod app;
pub mod boot_config;
pub mod error;
pub mod input;
pub mod presenter;
pub mod renderer;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{AppEvent, JengaApp};
pub use boot_config::HostConfig;
pub use error::{AppError, Result};

use winit::event_loop::{ControlFlow, EventLoop};

/// Open the window and run until it closes
pub fn run(config: HostConfig) -> Result<()> {
    let event_loop = EventLoop::<AppEvent>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = JengaApp::new(config.sim, event_loop.create_proxy())?;
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
