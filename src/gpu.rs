//! # GPU Management Module
//!
//! The `gpu` module sets up the host's graphics context: the surface bound to the window or HTML
//! canvas, the device and queue, and the surface configuration. It also offers the small helpers
//! the renderer needs when the surface changes size.
//!
//! ## Overview
//!
//! - **Initialization**: [`Gpu::new_async`] requests an adapter compatible with the surface and a
//!   device from it. Any failure is returned as [`SceneError::GraphicsUnavailable`]; the caller
//!   treats it as fatal and reports it to the user.
//! - **Resizing**: [`Gpu::resize`] reconfigures the surface.
//! - **Aspect ratio**: [`Gpu::aspect_ratio`] feeds the perspective projection.
//! - **Depth texture**: [`Gpu::create_depth_texture`] allocates the depth attachment.
//!
//! ## Example Usage
//!
//! ```ignore
//! let gpu = Gpu::new_async(window, width, height).await?;
//! let depth = gpu.create_depth_texture(width, height);
//! ```

use std::sync::Arc;

use wgpu::InstanceDescriptor;

use crate::error::SceneError;

/// Surface, device and queue of the graphics context.
pub struct Gpu {
    /// The rendering target tied to the window or canvas.
    pub surface: wgpu::Surface<'static>,

    /// Creates buffers, textures and pipelines.
    pub device: Arc<wgpu::Device>,

    /// Receives buffer writes and command buffers.
    pub queue: Arc<wgpu::Queue>,

    /// Current size, format and present mode of `surface`.
    pub surface_config: wgpu::SurfaceConfiguration,

    /// The non-sRGB color format chosen for `surface`.
    pub surface_format: wgpu::TextureFormat,
}

impl Gpu {
    /// Width over height of the surface. A zero height is treated as one pixel.
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Reconfigures the surface for a new size.
    ///
    /// Zero-sized surfaces (a minimized window) cannot be configured and are skipped.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Skipping surface reconfiguration for empty size ({width}, {height})");
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Creates a `Depth32Float` depth attachment of the given size.
    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        let texture = self.device.create_texture(
            &(wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Depth32Float,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            }),
        );
        texture.create_view(&wgpu::TextureViewDescriptor {
            label: None,
            format: Some(wgpu::TextureFormat::Depth32Float),
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: 0,
            base_array_layer: 0,
            array_layer_count: None,
            mip_level_count: None,
            usage: None,
        })
    }

    /// Creates the surface for `window` and acquires an adapter, device and queue for it.
    ///
    /// On the web this resolves after the browser has granted the WebGPU/WebGL2 context. There
    /// is no retry: if the host has no usable graphics context the error is returned as is.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, SceneError> {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .map_err(|error| SceneError::GraphicsUnavailable(format!("surface: {error}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                SceneError::GraphicsUnavailable(
                    "no adapter compatible with the surface".to_string(),
                )
            })?;

        log::info!("WGPU Adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    memory_hints: wgpu::MemoryHints::default(),
                    required_features: wgpu::Features::default(),
                    #[cfg(not(target_arch = "wasm32"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", feature = "webgpu"))]
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    #[cfg(all(target_arch = "wasm32", not(feature = "webgpu")))]
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(|error| SceneError::GraphicsUnavailable(format!("device: {error}")))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let surface_format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb()) // egui wants a non-srgb surface texture
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| {
                SceneError::GraphicsUnavailable("surface reports no texture formats".to_string())
            })?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_capabilities.present_modes[0],
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        Ok(Self {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            surface_config,
            surface_format,
        })
    }
}
