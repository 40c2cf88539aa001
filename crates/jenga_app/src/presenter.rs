//! Presenter - connects the window to the GPU via wgpu

use std::sync::Arc;
use winit::window::Window;
use wgpu::*;

use crate::error::{AppError, Result};

/// Surface, device and queue for one window
pub struct Presenter {
    surface: Surface<'static>,
    device: Arc<Device>,
    queue: Arc<Queue>,
    config: SurfaceConfiguration,
    format: TextureFormat,
    size: (u32, u32),
}

impl Presenter {
    /// Create a presenter rendering `size` pixels into `window`
    pub async fn new(window: Arc<Window>, size: (u32, u32)) -> Result<Self> {
        log::info!("Creating presenter...");

        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(AppError::AdapterNotFound)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        // WebGL2 cannot meet the desktop default limits
        let required_limits = if cfg!(target_arch = "wasm32") {
            Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
        } else {
            Limits::default()
        };

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("jenga_device"),
                    required_features: Features::empty(),
                    required_limits,
                    memory_hints: MemoryHints::default(),
                },
                None,
            )
            .await?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(AppError::AdapterNotFound)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.0.max(1),
            height: size.1.max(1),
            present_mode: PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!("Presenter initialized: {}x{}, format: {:?}", config.width, config.height, format);

        Ok(Self {
            surface,
            device,
            queue,
            size: (config.width, config.height),
            config,
            format,
        })
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<Queue> {
        &self.queue
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Current surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Reconfigure the surface; zero sizes (minimized windows) are ignored
    pub fn resize(&mut self, new_size: (u32, u32)) {
        if new_size.0 > 0 && new_size.1 > 0 && new_size != self.size {
            self.size = new_size;
            self.config.width = new_size.0;
            self.config.height = new_size.1;
            self.surface.configure(&self.device, &self.config);
            log::debug!("Presenter resized to {}x{}", new_size.0, new_size.1);
        }
    }

    /// Reconfigure at the current size after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquire a frame for rendering
    pub fn acquire_frame(&mut self) -> std::result::Result<SurfaceTexture, SurfaceError> {
        self.surface.get_current_texture()
    }
}
