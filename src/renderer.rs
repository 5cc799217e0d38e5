//! # `renderer.rs` - Renderer Module
//!
//! The `Renderer` owns the graphics context and everything drawn into it each frame: the
//! [`GpuScene`] holding the mesh and pipelines, the depth attachment, and the `egui` renderer
//! for the control overlay.
//!
//! The renderer does not decide *what* to draw. The frame driver in [`crate::app`] asks the
//! [`crate::frame::SceneState`] for a [`RenderCommand`] and passes it to
//! [`Renderer::render_frame`], which:
//!
//! 1. writes the command's per-draw uniforms,
//! 2. uploads the egui textures and buffers,
//! 3. clears color and depth and records the scene draws followed by the GUI,
//! 4. submits and presents.
//!
//! ## Example
//!
//! ```ignore
//! let mut renderer = Renderer::new(window, width, height, &mesh, state.draws_per_frame()).await?;
//! let command = state.tick(delta_time)?;
//! renderer.render_frame(&command, screen_descriptor, paint_jobs, textures_delta)?;
//! ```

use crate::error::SceneError;
use crate::frame::RenderCommand;
use crate::gpu::Gpu;
use crate::mesh::Mesh;
use crate::renderable::Renderable;
use crate::scene::GpuScene;

/// Draws the scene and the GUI overlay into the window surface.
pub struct Renderer {
    gpu: Gpu,

    /// Recreated whenever the surface is resized.
    depth_texture_view: wgpu::TextureView,

    egui_renderer: egui_wgpu::Renderer,

    scene: GpuScene,
}

impl Renderer {
    /// Format of the depth attachment shared by every pipeline.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Initializes the graphics context and uploads `mesh`.
    ///
    /// `draw_capacity` is the largest number of draw calls a frame will issue.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        mesh: &Mesh,
        draw_capacity: usize,
    ) -> Result<Self, SceneError> {
        let gpu = Gpu::new_async(window, width, height).await?;

        let depth_texture_view = gpu.create_depth_texture(width, height);

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            Some(Self::DEPTH_FORMAT),
            1,
            false,
        );

        let mut scene = GpuScene::new(&gpu.device, &gpu.queue, gpu.surface_format, draw_capacity);
        scene.upload_mesh(mesh)?;

        Ok(Self {
            gpu,
            depth_texture_view,
            egui_renderer,
            scene,
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.gpu.aspect_ratio()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.depth_texture_view = self.gpu.create_depth_texture(width, height);
    }

    /// Renders one frame from `command` plus the tessellated GUI.
    ///
    /// A lost or outdated surface is reconfigured and the frame is dropped; the next frame
    /// renders normally.
    pub fn render_frame(
        &mut self,
        command: &RenderCommand,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
    ) -> Result<(), SceneError> {
        self.scene.set_uniforms(command)?;

        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }

        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(error @ (wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost)) => {
                log::warn!("Surface unavailable ({error}), reconfiguring");
                let (width, height) = (
                    self.gpu.surface_config.width,
                    self.gpu.surface_config.height,
                );
                self.resize(width, height);
                return Ok(());
            }
            Err(error) => {
                log::warn!("Dropping frame: {error}");
                return Ok(());
            }
        };

        let surface_texture_view =
            surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor {
                    label: wgpu::Label::default(),
                    aspect: wgpu::TextureAspect::default(),
                    format: Some(self.gpu.surface_format),
                    dimension: None,
                    base_mip_level: 0,
                    mip_level_count: None,
                    base_array_layer: 0,
                    array_layer_count: None,
                    usage: None,
                });

        let [r, g, b, a] = command.clear_color.map(f64::from);

        encoder.insert_debug_marker("Render scene");

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.scene.draw(&mut render_pass);

            self.egui_renderer.render(
                &mut render_pass.forget_lifetime(),
                &paint_jobs,
                &screen_descriptor,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        surface_texture.present();
        Ok(())
    }
}
