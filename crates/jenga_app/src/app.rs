//! Windowed host
//!
//! Owns the window, the GPU state and the simulation, and routes winit
//! events into them. Every redraw runs one simulation frame and renders it;
//! the next redraw is requested as soon as the loop goes idle.

use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use jenga_sim::{SimConfig, SimulationContext};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::{AppError, Result};
use crate::input::{pixel_ratio, render_size, wheel_notches, PointerAction, PointerTracker};
use crate::presenter::Presenter;
use crate::renderer::TowerRenderer;

/// Events sent into the loop from outside winit
pub enum AppEvent {
    /// GPU initialization finished (web only; native initializes inline)
    GpuReady(Result<Gpu>),
    /// Rebuild the tower
    Reset,
}

/// Presenter and renderer, created once a window exists
pub struct Gpu {
    presenter: Presenter,
    renderer: TowerRenderer,
}

impl Gpu {
    pub async fn new(window: Arc<Window>, size: (u32, u32)) -> Result<Self> {
        let presenter = Presenter::new(window, size).await?;
        let renderer = TowerRenderer::new(presenter.device(), presenter.format(), presenter.size());
        Ok(Self { presenter, renderer })
    }

    fn resize(&mut self, size: (u32, u32)) {
        self.presenter.resize(size);
        if self.renderer.depth_size() != self.presenter.size() {
            self.renderer.resize(self.presenter.device(), self.presenter.size());
        }
    }

    fn render(&mut self, sim: &SimulationContext) -> Result<()> {
        let frame = match self.presenter.acquire_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.presenter.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.render(
            self.presenter.device(),
            self.presenter.queue(),
            &view,
            sim.scene(),
            sim.camera(),
        );
        frame.present();
        Ok(())
    }
}

/// Application state for the windowed host
pub struct JengaApp {
    sim: SimulationContext,
    max_pixel_ratio: f32,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    pointer: PointerTracker,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: EventLoopProxy<AppEvent>,
    clock: Instant,
    fatal: Option<AppError>,
}

impl JengaApp {
    pub fn new(config: SimConfig, proxy: EventLoopProxy<AppEvent>) -> Result<Self> {
        let max_pixel_ratio = config.view.max_pixel_ratio;
        let pointer = PointerTracker::new(config.interaction.click_slop_px);
        let sim = SimulationContext::new(config)?;

        Ok(Self {
            sim,
            max_pixel_ratio,
            window: None,
            gpu: None,
            pointer,
            proxy,
            clock: Instant::now(),
            fatal: None,
        })
    }

    /// Error that stopped the loop, if any
    pub fn take_error(&mut self) -> Option<AppError> {
        self.fatal.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }

    /// Window size in logical pixels and the render target size it maps to
    fn sizes(&self, window: &Window, physical: PhysicalSize<u32>) -> (Vec2, (u32, u32)) {
        let scale = window.scale_factor();
        let logical: LogicalSize<f32> = physical.to_logical(scale);
        let logical = Vec2::new(logical.width, logical.height);
        let ratio = pixel_ratio(scale, self.max_pixel_ratio);
        (logical, render_size(logical, ratio))
    }

    fn apply_size(&mut self, physical: PhysicalSize<u32>) {
        let Some(window) = self.window.clone() else { return };
        let (logical, target) = self.sizes(&window, physical);
        self.sim.resize(logical.x, logical.y);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(target);
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        let attrs = WindowAttributes::default()
            .with_title("Jenga")
            .with_inner_size(LogicalSize::new(1280, 720));

        #[cfg(target_arch = "wasm32")]
        let attrs = crate::web::attach_canvas(attrs)?;

        Ok(Arc::new(event_loop.create_window(attrs)?))
    }

    fn install_gpu(&mut self, gpu: Gpu) {
        self.gpu = Some(gpu);
        if let Some(window) = self.window.clone() {
            self.apply_size(window.inner_size());
            window.request_redraw();
        }
    }

    fn handle_pointer(&mut self, action: PointerAction) {
        match action {
            PointerAction::Drag(delta) => {
                let height = self.sim.viewport().y;
                self.sim.orbit_mut().rotate(delta.x, delta.y, height);
            }
            PointerAction::Click(position) => {
                let now = self.clock.elapsed();
                self.sim.click(position, now);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = self.clock.elapsed();
        if let Err(e) = self.sim.frame(now) {
            self.fail(event_loop, e.into());
            return;
        }

        let result = match &mut self.gpu {
            Some(gpu) => gpu.render(&self.sim),
            None => Ok(()),
        };
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn logical_position(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        let logical = position.to_logical::<f32>(scale);
        Vec2::new(logical.x, logical.y)
    }
}

impl ApplicationHandler<AppEvent> for JengaApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(e) => return self.fail(event_loop, e),
        };
        self.window = Some(window.clone());
        let (logical, target) = self.sizes(&window, window.inner_size());
        self.sim.resize(logical.x, logical.y);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match pollster::block_on(Gpu::new(window, target)) {
                Ok(gpu) => self.install_gpu(gpu),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            if let Err(e) = crate::web::install_reset_button(self.proxy.clone()) {
                log::warn!("Reset button unavailable: {}", e);
            }
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let gpu = Gpu::new(window, target).await;
                if proxy.send_event(AppEvent::GpuReady(gpu)).is_err() {
                    log::error!("Event loop closed before the GPU was ready");
                }
            });
        }

        log::info!("Click a block to remove it. Drag to orbit, scroll to zoom, R to reset.");
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            AppEvent::GpuReady(Ok(gpu)) => self.install_gpu(gpu),
            AppEvent::GpuReady(Err(e)) => self.fail(event_loop, e),
            AppEvent::Reset => self.sim.reset(),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested...");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => self.apply_size(size),

            WindowEvent::CursorMoved { position, .. } => {
                let position = self.logical_position(position);
                if let Some(action) = self.pointer.moved(position) {
                    self.handle_pointer(action);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(action) = self.pointer.button(button, state) {
                    self.handle_pointer(action);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.sim.orbit_mut().zoom(wheel_notches(delta));
            }

            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed && !event.repeat => {
                match &event.logical_key {
                    Key::Character(c) if c.eq_ignore_ascii_case("r") => self.sim.reset(),
                    Key::Named(NamedKey::Escape) => {
                        log::info!("Escape pressed, shutting down...");
                        event_loop.exit();
                    }
                    _ => {}
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
