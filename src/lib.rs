//! # Orrery
//!
//! Procedural 3D scenes rendered with wgpu, on the desktop or in a browser canvas: wireframe
//! planets that spin and bob in front of a perspective camera, and the radial hat function
//! `sin(r)/r` drawn as a filled, outlined surface under an orbiting orthographic camera.
//!
//! The crate is split into a pure core and a thin host layer.
//!
//! ## Core
//!
//! - [`mesh`]: UV-sphere and height-field generators and the hat function.
//! - [`camera`]: look-at and orbit cameras.
//! - [`projection`]: perspective and orthographic projections and their scaling hooks.
//! - [`frame`]: per-object animation, [`compute_frame`], and the [`SceneState`] that turns
//!   elapsed time into a [`RenderCommand`].
//! - [`config`]: TOML scene descriptions and the built-in presets.
//! - [`error`]: the [`SceneError`] type.
//!
//! None of these modules touch the GPU.
//!
//! ## Host layer
//!
//! - [`Renderable`]: the capability a backend provides (`upload_mesh`, `set_uniforms`, `draw`).
//! - `scene`: the wgpu implementation of [`Renderable`].
//! - `gpu`, `renderer`: graphics context setup and per-frame submission with an egui overlay.
//! - `app`: the winit frame driver, keyboard handling and control buttons.
//!
//! ## Example
//!
//! ```rust
//! use orrery_core::{flatten, SceneConfig};
//!
//! let (mut state, mesh) = SceneConfig::planets().build().unwrap();
//! assert_eq!(mesh.vertices.len(), 21 * 21);
//!
//! let command = state.tick(1.0 / 60.0).unwrap();
//! let projection: [f32; 16] = flatten(&command.projection);
//! assert!(projection[5] > 0.0);
//! ```
//!
//! ## Dependencies
//!
//! - `wgpu`, `winit`, `egui`: GPU access, windowing and the control overlay.
//! - `nalgebra-glm`: vectors and matrices.
//! - `bytemuck`: casting vertices and uniforms to bytes.
//! - `serde`, `toml`: scene configuration.
//! - `thiserror`: the error type.
//! - `log` with `env_logger` (desktop) or `console_log` (web): logging.

pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod mesh;
pub mod projection;

mod app;
mod gpu;
mod renderable;
mod renderer;
mod scene;
mod uniform_binding;
mod uniform_buffer;
mod vertex;

pub use crate::app::{key_action, App};
pub use crate::camera::{Camera, CameraRig, OrbitCamera};
pub use crate::config::SceneConfig;
pub use crate::error::SceneError;
pub use crate::frame::{
    compute_frame, Bob, DrawCall, DrawStyle, Frame, InputAction, InputSteps, Primitive,
    RenderCommand, SceneObject, SceneState,
};
pub use crate::gpu::Gpu;
pub use crate::mesh::{generate_height_field, generate_sphere, hat, Mesh};
pub use crate::projection::{flatten, Projection};
pub use crate::renderable::Renderable;
pub use crate::renderer::Renderer;
pub use crate::scene::GpuScene;
pub use crate::uniform_binding::UniformBinding;
pub use crate::uniform_buffer::UniformBuffer;
pub use crate::vertex::Vertex;

/// WGSL for both pipelines.
///
/// The vertex stage (`vertex_main`) multiplies the `@location(0)` homogeneous position by the
/// draw's `mvp`; the fragment stage (`fragment_main`) outputs the draw's flat `color`. Both read
/// the same uniform block at `@group(0) @binding(0)`, laid out like [`UniformBuffer`].
pub const SHADER_SOURCE: &str = include_str!("shader_source.wgsl");

/// Starts a built-in scene (`"planets"` or `"hat"`) in the page's `<canvas id="canvas">`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn start_scene(name: &str) -> Result<(), wasm_bindgen::JsValue> {
    use winit::platform::web::EventLoopExtWebSys;

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Console logger already installed");
    }

    let to_js = |error: String| wasm_bindgen::JsValue::from_str(&error);
    let config = SceneConfig::preset(name).map_err(|error| to_js(error.to_string()))?;
    let app = App::new(config).map_err(|error| to_js(error.to_string()))?;
    let event_loop =
        winit::event_loop::EventLoop::new().map_err(|error| to_js(error.to_string()))?;
    event_loop.spawn_app(app);
    Ok(())
}
