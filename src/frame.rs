//! # Frame
//!
//! The per-frame scene updater. [`compute_frame`] is a pure function from camera, projection,
//! objects and time to the view, projection and model matrices of one frame. [`SceneState`]
//! owns everything that changes between frames (camera rig, projection, elapsed time) and
//! turns it into a [`RenderCommand`] each time the host's frame driver calls
//! [`SceneState::tick`].
//!
//! ## Example
//!
//! ```rust
//! use orrery_core::SceneConfig;
//!
//! let (mut state, _mesh) = SceneConfig::planets().build().unwrap();
//! let command = state.tick(1.0 / 60.0).unwrap();
//! assert_eq!(command.draws.len(), 3);
//! ```

use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraRig};
use crate::error::SceneError;
use crate::projection::Projection;

/// Vertical oscillation `amplitude * sin(speed * t + phase)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bob {
    pub amplitude: f32,
    /// Radians per second.
    pub speed: f32,
    pub phase: f32,
}

impl Bob {
    pub fn offset(&self, t: f64) -> f32 {
        let phase = f64::from(self.speed) * t + f64::from(self.phase);
        self.amplitude * phase.sin() as f32
    }
}

/// One drawable instance of the scene mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub position: glm::Vec3,
    pub color: glm::Vec4,
    pub spin_degrees_per_second: f32,
    pub spin_axis: glm::Vec3,
    pub bob: Bob,
}

impl SceneObject {
    /// Rotation angle in degrees at time `t` (seconds). Grows without wrapping.
    pub fn angle(&self, t: f64) -> f64 {
        f64::from(self.spin_degrees_per_second) * t
    }

    /// `translate(position + (0, bob(t), 0)) * rotate(angle(t), axis)`.
    ///
    /// The angle is reduced to one turn in `f64` before it is narrowed, so long sessions keep
    /// full rotation precision.
    pub fn model_matrix(&self, t: f64) -> glm::Mat4 {
        let offset = glm::vec3(0.0, self.bob.offset(t), 0.0);
        let translated = glm::translate(&glm::Mat4::identity(), &(self.position + offset));
        let radians = self.angle(t).to_radians().rem_euclid(std::f64::consts::TAU) as f32;
        glm::rotate(&translated, radians, &self.spin_axis)
    }
}

/// Matrices for one animation frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub view: glm::Mat4,
    pub projection: glm::Mat4,
    /// One model matrix per object, in object order.
    pub models: Vec<glm::Mat4>,
}

/// Computes the view, projection and per-object model matrices at time `t`.
///
/// Pure: identical inputs always produce bit-identical matrices.
pub fn compute_frame(
    camera: &Camera,
    projection: &Projection,
    objects: &[SceneObject],
    t: f64,
) -> Result<Frame, SceneError> {
    Ok(Frame {
        view: camera.view_matrix()?,
        projection: projection.matrix()?,
        models: objects.iter().map(|object| object.model_matrix(t)).collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Lines,
    Triangles,
}

/// How each object's mesh is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawStyle {
    /// Line list in the object's color.
    Wireframe,
    /// Filled triangles in the object's color, then the outline in `outline`.
    FilledWithOutline { outline: [f32; 4] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub model: glm::Mat4,
    pub color: glm::Vec4,
}

/// Everything the GPU-facing layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    pub view: glm::Mat4,
    pub projection: glm::Mat4,
    pub clear_color: [f32; 4],
    pub draws: Vec<DrawCall>,
}

/// Step sizes applied by discrete input actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputSteps {
    /// World units per key press.
    pub move_speed: f32,
    /// Orbit angle change per press, in degrees.
    pub angle_step_degrees: f32,
}

impl Default for InputSteps {
    fn default() -> Self {
        Self {
            move_speed: 0.4,
            angle_step_degrees: 5.0,
        }
    }
}

/// Mutations the input layer can request between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    MoveEye(glm::Vec3),
    MoveTarget(glm::Vec3),
    ScaleNearFar(f32),
    ScaleOrthoBounds(f32),
    ScaleHorizontalBounds(f32),
    ScaleVerticalBounds(f32),
    ScaleOrbitRadius(f32),
    /// Signed number of angle steps.
    RotateTheta(f32),
    RotatePhi(f32),
}

/// Mutable scene state owned by the frame driver.
#[derive(Debug, Clone)]
pub struct SceneState {
    pub rig: CameraRig,
    pub projection: Projection,
    pub objects: Vec<SceneObject>,
    pub style: DrawStyle,
    pub clear_color: [f32; 4],
    pub steps: InputSteps,
    elapsed: f64,
    frame: u64,
}

impl SceneState {
    pub fn new(
        rig: CameraRig,
        projection: Projection,
        objects: Vec<SceneObject>,
        style: DrawStyle,
        clear_color: [f32; 4],
        steps: InputSteps,
    ) -> Self {
        Self {
            rig,
            projection,
            objects,
            style,
            clear_color,
            steps,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Seconds of animation time accumulated by [`SceneState::tick`].
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Number of draw calls each frame produces, used to size GPU uniform storage.
    pub fn draws_per_frame(&self) -> usize {
        let per_object = match self.style {
            DrawStyle::Wireframe => 1,
            DrawStyle::FilledWithOutline { .. } => 2,
        };
        self.objects.len() * per_object
    }

    /// Advances animation time by `dt` seconds and returns the frame's render command.
    ///
    /// Time only moves forward; a negative or non-finite `dt` is rejected and leaves the
    /// state unchanged.
    pub fn tick(&mut self, dt: f64) -> Result<RenderCommand, SceneError> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(SceneError::InvalidParameter(format!(
                "frame delta must be finite and non-negative, got {dt}"
            )));
        }
        self.elapsed += dt;
        self.frame += 1;
        self.render_command()
    }

    /// The render command for the current elapsed time, without advancing it.
    pub fn render_command(&self) -> Result<RenderCommand, SceneError> {
        let frame = compute_frame(
            &self.rig.camera(),
            &self.projection,
            &self.objects,
            self.elapsed,
        )?;

        let mut draws = Vec::with_capacity(self.draws_per_frame());
        for (object, model) in self.objects.iter().zip(frame.models) {
            match self.style {
                DrawStyle::Wireframe => draws.push(DrawCall {
                    primitive: Primitive::Lines,
                    model,
                    color: object.color,
                }),
                DrawStyle::FilledWithOutline { outline } => {
                    draws.push(DrawCall {
                        primitive: Primitive::Triangles,
                        model,
                        color: object.color,
                    });
                    draws.push(DrawCall {
                        primitive: Primitive::Lines,
                        model,
                        color: glm::make_vec4(&outline),
                    });
                }
            }
        }

        Ok(RenderCommand {
            view: frame.view,
            projection: frame.projection,
            clear_color: self.clear_color,
            draws,
        })
    }

    /// Applies one input action. Actions that do not fit the current camera rig are ignored.
    pub fn apply(&mut self, action: InputAction) -> Result<(), SceneError> {
        let angle_step = self.steps.angle_step_degrees.to_radians();
        match (action, &mut self.rig) {
            (InputAction::MoveEye(delta), CameraRig::LookAt(camera)) => {
                camera.move_eye(delta.x, delta.y, delta.z)
            }
            (InputAction::MoveTarget(delta), rig) => rig.move_target(delta.x, delta.y, delta.z),
            (InputAction::ScaleNearFar(factor), _) => self.projection.scale_near_far(factor)?,
            (InputAction::ScaleOrthoBounds(factor), _) => {
                self.projection.scale_ortho_bounds(factor)?
            }
            (InputAction::ScaleHorizontalBounds(factor), _) => {
                self.projection.scale_horizontal_bounds(factor)?
            }
            (InputAction::ScaleVerticalBounds(factor), _) => {
                self.projection.scale_vertical_bounds(factor)?
            }
            (InputAction::ScaleOrbitRadius(factor), CameraRig::Orbit(orbit)) => {
                orbit.scale_radius(factor)?
            }
            (InputAction::RotateTheta(steps), CameraRig::Orbit(orbit)) => {
                orbit.rotate_theta(steps * angle_step)
            }
            (InputAction::RotatePhi(steps), CameraRig::Orbit(orbit)) => {
                orbit.rotate_phi(steps * angle_step)
            }
            (action, _) => log::debug!("Ignoring {action:?} for the current camera rig"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;

    const EPS: f32 = 1e-5;

    fn planet(position: glm::Vec3, speed: f32, phase: f32) -> SceneObject {
        SceneObject {
            position,
            color: glm::vec4(1.0, 1.0, 1.0, 1.0),
            spin_degrees_per_second: 30.0,
            spin_axis: glm::Vec3::y(),
            bob: Bob {
                amplitude: 0.2,
                speed,
                phase,
            },
        }
    }

    fn look_at_state() -> SceneState {
        SceneState::new(
            CameraRig::LookAt(Camera::new(
                glm::vec3(0.0, 0.0, 5.0),
                glm::Vec3::zeros(),
                glm::Vec3::y(),
            )),
            Projection::Perspective {
                fov_y_degrees: 60.0,
                aspect: 1.0,
                near: 0.1,
                far: 100.0,
            },
            vec![
                planet(glm::vec3(-3.0, 1.0, -5.0), 0.6, 0.0),
                planet(glm::vec3(0.0, -1.0, -10.0), 1.5, 1.0),
            ],
            DrawStyle::Wireframe,
            [0.0, 0.0, 0.0, 1.0],
            InputSteps::default(),
        )
    }

    #[test]
    fn angle_grows_monotonically() {
        let object = planet(glm::Vec3::zeros(), 0.6, 0.0);
        let mut previous = object.angle(0.0);
        for step in 1..1000 {
            let angle = object.angle(f64::from(step) * 0.5);
            assert!(angle > previous);
            previous = angle;
        }
    }

    #[test]
    fn model_matrix_applies_bob_then_spin() {
        let object = planet(glm::vec3(1.0, 2.0, 3.0), 0.6, 1.0);
        let t = 2.0;
        let model = object.model_matrix(t);

        let origin = model * glm::vec4(0.0, 0.0, 0.0, 1.0);
        let expected_y = 2.0 + 0.2 * (0.6_f32 * 2.0 + 1.0).sin();
        assert!((origin.x - 1.0).abs() < EPS);
        assert!((origin.y - expected_y).abs() < EPS);
        assert!((origin.z - 3.0).abs() < EPS);

        // 60 degrees about +Y turns +X toward -Z
        let x_axis = model * glm::vec4(1.0, 0.0, 0.0, 0.0);
        let radians = 60_f32.to_radians();
        assert!((x_axis.x - radians.cos()).abs() < EPS);
        assert!((x_axis.z + radians.sin()).abs() < EPS);
    }

    #[test]
    fn compute_frame_is_reproducible() {
        let state = look_at_state();
        let camera = state.rig.camera();
        let a = compute_frame(&camera, &state.projection, &state.objects, 12.25).unwrap();
        let b = compute_frame(&camera, &state.projection, &state.objects, 12.25).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.models.len(), 2);
    }

    #[test]
    fn tick_advances_time_and_frames() {
        let mut state = look_at_state();
        state.tick(0.5).unwrap();
        state.tick(0.25).unwrap();
        assert_eq!(state.frame_count(), 2);
        assert!((state.elapsed() - 0.75).abs() < 1e-9);

        assert!(state.tick(-0.1).is_err());
        assert!(state.tick(f64::NAN).is_err());
        assert_eq!(state.frame_count(), 2);
    }

    #[test]
    fn clock_keeps_advancing_in_long_sessions() {
        let mut state = look_at_state();
        state.tick(600_000.0).unwrap();
        let before = state.elapsed();
        let first = state.render_command().unwrap();
        for _ in 0..60 {
            state.tick(1.0 / 60.0).unwrap();
        }
        assert!((state.elapsed() - before - 1.0).abs() < 1e-6);
        assert!(state.objects[0].angle(state.elapsed()) > state.objects[0].angle(before));

        // one second at 30 degrees per second, still resolved after a week of ticks
        let second = state.render_command().unwrap();
        let x_before = first.draws[0].model * glm::vec4(1.0, 0.0, 0.0, 0.0);
        let x_after = second.draws[0].model * glm::vec4(1.0, 0.0, 0.0, 0.0);
        let turned = glm::angle(&x_before.xyz(), &x_after.xyz());
        assert!((turned - 30_f32.to_radians()).abs() < 1e-3);
    }

    #[test]
    fn render_command_matches_frame() {
        let mut state = look_at_state();
        let command = state.tick(1.0).unwrap();
        let frame = compute_frame(&state.rig.camera(), &state.projection, &state.objects, 1.0)
            .unwrap();
        assert_eq!(command.view, frame.view);
        assert_eq!(command.draws.len(), 2);
        assert!(command.draws.iter().all(|d| d.primitive == Primitive::Lines));
        assert_eq!(command.draws[1].model, frame.models[1]);
    }

    #[test]
    fn filled_style_adds_outline_draw() {
        let mut state = look_at_state();
        state.style = DrawStyle::FilledWithOutline {
            outline: [0.0, 0.0, 0.0, 1.0],
        };
        let command = state.render_command().unwrap();
        assert_eq!(command.draws.len(), state.draws_per_frame());
        assert_eq!(command.draws[0].primitive, Primitive::Triangles);
        assert_eq!(command.draws[1].primitive, Primitive::Lines);
        assert_eq!(command.draws[1].color, glm::vec4(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn keyboard_actions_move_camera() {
        let mut state = look_at_state();
        state.apply(InputAction::MoveEye(glm::vec3(0.0, 0.0, -0.4))).unwrap();
        state.apply(InputAction::MoveTarget(glm::vec3(0.4, 0.0, 0.0))).unwrap();
        // orbit-only action is ignored on a look-at rig
        state.apply(InputAction::RotateTheta(1.0)).unwrap();

        let camera = state.rig.camera();
        assert!((camera.eye.z - 4.6).abs() < EPS);
        assert!((camera.target.x - 0.4).abs() < EPS);
    }

    #[test]
    fn degenerate_camera_surfaces_as_error() {
        let mut state = look_at_state();
        state.apply(InputAction::MoveEye(glm::vec3(0.0, 0.0, -5.0))).unwrap();
        assert!(matches!(
            state.render_command(),
            Err(SceneError::DegenerateCamera(_))
        ));
    }

    #[test]
    fn orbit_actions_use_angle_step() {
        let mut state = look_at_state();
        state.rig = CameraRig::Orbit(OrbitCamera {
            radius: 1.0,
            theta: 0.0,
            phi: 0.0,
            target: glm::Vec3::zeros(),
            up: glm::Vec3::y(),
        });
        state.apply(InputAction::RotateTheta(2.0)).unwrap();
        state.apply(InputAction::RotatePhi(-1.0)).unwrap();
        state.apply(InputAction::ScaleOrbitRadius(0.5)).unwrap();
        state.apply(InputAction::MoveEye(glm::vec3(1.0, 0.0, 0.0))).unwrap();

        match &state.rig {
            CameraRig::Orbit(orbit) => {
                assert!((orbit.theta - 10_f32.to_radians()).abs() < EPS);
                assert!((orbit.phi + 5_f32.to_radians()).abs() < EPS);
                assert_eq!(orbit.radius, 0.5);
            }
            CameraRig::LookAt(_) => unreachable!(),
        }
    }
}
