//! # Application Core (`app.rs`)
//!
//! The `App` struct is the host-side frame driver. It owns the [`SceneState`] and the
//! [`Renderer`], implements winit's `ApplicationHandler`, and on every redraw:
//!
//! 1. measures the time since the previous frame with `web_time::Instant`,
//! 2. calls [`SceneState::tick`] to get the frame's [`RenderCommand`],
//! 3. builds the egui control window and applies any [`InputAction`] it produced,
//! 4. hands the command and the GUI output to [`Renderer::render_frame`],
//! 5. requests the next redraw.
//!
//! Keyboard and button handlers only ever mutate the scene through [`SceneState::apply`].
//!
//! ## Platform-Specific Notes
//!
//! - **Desktop**: the renderer is created synchronously with `pollster` when the window is
//!   first resumed. A missing graphics context is logged and the event loop exits.
//! - **WebAssembly**: the window wraps the `<canvas id="canvas">` element and the renderer is
//!   created on a `wasm_bindgen_futures` task; it arrives through a oneshot channel and is
//!   picked up by the next window event. A renderer that fails to start is reported with a
//!   browser alert.
//!
//! ## Controls
//!
//! - `W`/`S` move the eye along Z, `A`/`D` along X (look-at scenes).
//! - Arrow keys move the look-at target.
//! - `Escape` exits.
//! - The control window offers the clipping-plane, orbit, and orthographic-bounds buttons.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use std::sync::Arc;

use nalgebra_glm as glm;
use web_time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::{Theme, Window},
};

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::frame::{InputAction, InputSteps, RenderCommand, SceneState};
use crate::mesh::Mesh;
use crate::renderer::Renderer;

/// Window, renderer and scene state of the running application.
pub struct App {
    title: String,

    state: SceneState,

    /// Kept until the renderer has uploaded it.
    mesh: Option<Mesh>,

    window: Option<Arc<Window>>,

    renderer: Option<Renderer>,

    gui_state: Option<egui_winit::State>,

    last_render_time: Option<Instant>,

    /// The last command that computed successfully, redrawn while the camera is degenerate.
    last_command: Option<RenderCommand>,

    #[cfg(target_arch = "wasm32")]
    renderer_receiver: Option<futures::channel::oneshot::Receiver<Result<Renderer, SceneError>>>,

    last_size: (u32, u32),

    controls_visible: bool,
}

impl App {
    /// Builds the scene described by `config`. Mesh or camera errors surface here, before any
    /// window exists.
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        let (state, mesh) = config.build()?;
        Ok(Self {
            title: config.title,
            state,
            mesh: Some(mesh),
            window: None,
            renderer: None,
            gui_state: None,
            last_render_time: None,
            last_command: None,
            #[cfg(target_arch = "wasm32")]
            renderer_receiver: None,
            last_size: (0, 0),
            controls_visible: true,
        })
    }

    fn apply(&mut self, action: InputAction) {
        if let Err(error) = self.state.apply(action) {
            log::warn!("Rejected {action:?}: {error}");
        }
    }
}

/// Maps a key press to a camera action for the given step sizes.
pub fn key_action(key_code: KeyCode, steps: &InputSteps) -> Option<InputAction> {
    let speed = steps.move_speed;
    let action = match key_code {
        KeyCode::KeyW => InputAction::MoveEye(glm::vec3(0.0, 0.0, -speed)),
        KeyCode::KeyS => InputAction::MoveEye(glm::vec3(0.0, 0.0, speed)),
        KeyCode::KeyA => InputAction::MoveEye(glm::vec3(speed, 0.0, 0.0)),
        KeyCode::KeyD => InputAction::MoveEye(glm::vec3(-speed, 0.0, 0.0)),
        KeyCode::ArrowUp => InputAction::MoveTarget(glm::vec3(0.0, speed, 0.0)),
        KeyCode::ArrowDown => InputAction::MoveTarget(glm::vec3(0.0, -speed, 0.0)),
        KeyCode::ArrowLeft => InputAction::MoveTarget(glm::vec3(-speed, 0.0, 0.0)),
        KeyCode::ArrowRight => InputAction::MoveTarget(glm::vec3(speed, 0.0, 0.0)),
        _ => return None,
    };
    Some(action)
}

/// Lays out the control buttons and returns the actions clicked this frame.
fn control_buttons(ui: &mut egui::Ui) -> Vec<InputAction> {
    let mut actions = Vec::new();
    let rows = [
        (
            "Near/far",
            ("× 1.1", InputAction::ScaleNearFar(1.1)),
            ("× 0.9", InputAction::ScaleNearFar(0.9)),
        ),
        (
            "Orbit radius",
            ("× 2", InputAction::ScaleOrbitRadius(2.0)),
            ("× 0.5", InputAction::ScaleOrbitRadius(0.5)),
        ),
        (
            "Theta",
            ("+", InputAction::RotateTheta(1.0)),
            ("−", InputAction::RotateTheta(-1.0)),
        ),
        (
            "Phi",
            ("+", InputAction::RotatePhi(1.0)),
            ("−", InputAction::RotatePhi(-1.0)),
        ),
        (
            "Width",
            ("narrower", InputAction::ScaleHorizontalBounds(0.9)),
            ("wider", InputAction::ScaleHorizontalBounds(1.1)),
        ),
        (
            "Height",
            ("shorter", InputAction::ScaleVerticalBounds(0.9)),
            ("taller", InputAction::ScaleVerticalBounds(1.1)),
        ),
    ];
    for (label, first, second) in rows {
        button_pair(ui, &mut actions, label, first, second);
    }
    actions
}

/// One labelled row with two buttons.
fn button_pair(
    ui: &mut egui::Ui,
    actions: &mut Vec<InputAction>,
    label: &str,
    (first_text, first_action): (&str, InputAction),
    (second_text, second_action): (&str, InputAction),
) {
    ui.horizontal(|ui| {
        ui.label(label);
        if ui.button(first_text).clicked() {
            actions.push(first_action);
        }
        if ui.button(second_text).clicked() {
            actions.push(second_action);
        }
    });
}

/// Message shown when the graphics context cannot be created.
fn startup_failure_message(error: &SceneError) -> String {
    format!("Cannot start renderer: {error}")
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let mut attributes = Window::default_attributes();

        #[cfg(not(target_arch = "wasm32"))]
        {
            attributes = attributes.with_title(self.title.as_str());
        }

        #[allow(unused_assignments)]
        #[cfg(target_arch = "wasm32")]
        let mut canvas_width = 0;

        #[allow(unused_assignments)]
        #[cfg(target_arch = "wasm32")]
        let mut canvas_height = 0;

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            let Some(canvas) = wgpu::web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id("canvas"))
                .and_then(|element| element.dyn_into::<wgpu::web_sys::HtmlCanvasElement>().ok())
            else {
                log::error!("No <canvas id=\"canvas\"> element found");
                return;
            };
            canvas_width = canvas.width();
            canvas_height = canvas.height();
            self.last_size = (canvas_width, canvas_height);
            attributes = attributes.with_canvas(Some(canvas));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(error) => {
                log::error!("Failed to create window: {error}");
                return;
            }
        };

        let first_window_handle = self.window.is_none();
        let window_handle = Arc::new(window);
        self.window = Some(window_handle.clone());

        if !first_window_handle {
            return;
        }

        let gui_context = egui::Context::default();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let inner_size = window_handle.inner_size();
            self.last_size = (inner_size.width, inner_size.height);
        }

        #[cfg(target_arch = "wasm32")]
        {
            gui_context.set_pixels_per_point(window_handle.scale_factor() as f32);
        }

        let viewport_id = gui_context.viewport_id();
        let gui_state = egui_winit::State::new(
            gui_context,
            viewport_id,
            &window_handle,
            Some(window_handle.scale_factor() as _),
            Some(Theme::Dark),
            None,
        );

        let Some(mesh) = self.mesh.take() else {
            return;
        };
        let draw_capacity = self.state.draws_per_frame();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let (width, height) = self.last_size;
            let created = pollster::block_on(Renderer::new(
                window_handle.clone(),
                width,
                height,
                &mesh,
                draw_capacity,
            ));
            match created {
                Ok(renderer) => self.renderer = Some(renderer),
                Err(error) => {
                    log::error!("{}", startup_failure_message(&error));
                    event_loop.exit();
                    return;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let (sender, receiver) = futures::channel::oneshot::channel();
            self.renderer_receiver = Some(receiver);
            log::info!("Canvas dimensions: ({canvas_width} x {canvas_height})");
            wasm_bindgen_futures::spawn_local(async move {
                let created = Renderer::new(
                    window_handle.clone(),
                    canvas_width,
                    canvas_height,
                    &mesh,
                    draw_capacity,
                )
                .await;
                if sender.send(created).is_err() {
                    log::error!("Failed to send renderer to the application!");
                }
            });
        }

        self.gui_state = Some(gui_state);
        self.last_render_time = Some(Instant::now());
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(receiver) = self.renderer_receiver.as_mut() {
                if let Ok(Some(created)) = receiver.try_recv() {
                    self.renderer_receiver = None;
                    match created {
                        Ok(renderer) => self.renderer = Some(renderer),
                        Err(error) => {
                            let message = startup_failure_message(&error);
                            log::error!("{message}");
                            alert_page(&message);
                        }
                    }
                }
            }
        }

        let (Some(gui_state), Some(window)) = (self.gui_state.as_mut(), self.window.clone()) else {
            return;
        };

        if gui_state.on_window_event(&window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if matches!(key_code, KeyCode::Escape) {
                    event_loop.exit();
                } else if let Some(action) = key_action(key_code, &self.state.steps) {
                    self.apply(action);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                log::info!("Resizing renderer surface to: ({width}, {height})");
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(width, height);
                }
                self.last_size = (width, height);
            }
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(&window),
            _ => (),
        }

        window.request_redraw();
    }
}

/// Reports a fatal error to the page with a browser alert.
#[cfg(target_arch = "wasm32")]
fn alert_page(message: &str) {
    let shown = wgpu::web_sys::window().map(|window| window.alert_with_message(message));
    if !matches!(shown, Some(Ok(()))) {
        log::warn!("Could not show alert: {message}");
    }
}

impl App {
    /// Advances the scene one frame and renders it with the control overlay.
    fn redraw(&mut self, window: &Window) {
        let (Some(gui_state), Some(renderer), Some(last_render_time)) = (
            self.gui_state.as_mut(),
            self.renderer.as_mut(),
            self.last_render_time.as_mut(),
        ) else {
            return;
        };

        let now = Instant::now();
        let delta_time = now - *last_render_time;
        *last_render_time = now;

        if let Err(error) = self.state.projection.set_aspect(renderer.aspect_ratio()) {
            log::warn!("Keeping previous aspect ratio: {error}");
        }

        match self.state.tick(delta_time.as_secs_f64()) {
            Ok(command) => self.last_command = Some(command),
            Err(error) => log::warn!("Reusing previous frame: {error}"),
        }

        let gui_input = gui_state.take_egui_input(window);
        gui_state.egui_ctx().begin_pass(gui_input);

        let mut actions = Vec::new();
        let frame_count = self.state.frame_count();
        let elapsed = self.state.elapsed();
        let controls_visible = &mut self.controls_visible;

        egui::Window::new(self.title.as_str()).show(gui_state.egui_ctx(), |ui| {
            ui.label(format!("frame {frame_count}, {elapsed:.1} s"));
            ui.checkbox(controls_visible, "Show controls");
            if *controls_visible {
                ui.separator();
                actions = control_buttons(ui);
                ui.separator();
                ui.label("W/S/A/D move the eye, arrow keys move the target");
            }
        });

        let egui_winit::egui::FullOutput {
            textures_delta,
            shapes,
            pixels_per_point,
            platform_output,
            ..
        } = gui_state.egui_ctx().end_pass();

        gui_state.handle_platform_output(window, platform_output);

        let paint_jobs = gui_state.egui_ctx().tessellate(shapes, pixels_per_point);

        let screen_descriptor = {
            let (width, height) = self.last_size;
            egui_wgpu::ScreenDescriptor {
                size_in_pixels: [width, height],
                pixels_per_point: window.scale_factor() as f32,
            }
        };

        if let Some(command) = self.last_command.as_ref() {
            if let Err(error) =
                renderer.render_frame(command, screen_descriptor, paint_jobs, textures_delta)
            {
                log::error!("Frame failed: {error}");
            }
        }

        for action in actions {
            self.apply(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_follow_step_size() {
        let steps = InputSteps {
            move_speed: 0.5,
            angle_step_degrees: 5.0,
        };
        assert_eq!(
            key_action(KeyCode::KeyW, &steps),
            Some(InputAction::MoveEye(glm::vec3(0.0, 0.0, -0.5)))
        );
        assert_eq!(
            key_action(KeyCode::KeyA, &steps),
            Some(InputAction::MoveEye(glm::vec3(0.5, 0.0, 0.0)))
        );
        assert_eq!(
            key_action(KeyCode::ArrowLeft, &steps),
            Some(InputAction::MoveTarget(glm::vec3(-0.5, 0.0, 0.0)))
        );
        assert_eq!(key_action(KeyCode::KeyQ, &steps), None);
    }

    #[test]
    fn control_buttons_idle_without_clicks() {
        let context = egui::Context::default();
        let mut actions = vec![InputAction::ScaleNearFar(1.0)];
        let _ = context.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                actions = control_buttons(ui);
            });
        });
        assert!(actions.is_empty());
    }

    #[test]
    fn startup_failure_names_the_cause() {
        let error =
            SceneError::GraphicsUnavailable("no adapter compatible with the surface".to_string());
        let message = startup_failure_message(&error);
        assert!(message.starts_with("Cannot start renderer"));
        assert!(message.contains("no adapter compatible with the surface"));
    }

    #[test]
    fn new_app_builds_scene() {
        let app = App::new(SceneConfig::hat_surface()).unwrap();
        assert_eq!(app.state.draws_per_frame(), 2);
        assert!(app.mesh.is_some());
        assert!(app.renderer.is_none());
    }
}
