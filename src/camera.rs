//! # Camera
//!
//! Viewer placement for both scenes:
//!
//! - [`Camera`] is a free look-at camera (eye, target, up) moved by the keyboard in the
//!   planets scene.
//! - [`OrbitCamera`] places the eye on a sphere around the target using spherical
//!   coordinates, the way the hat-surface scene's buttons move the viewer.
//! - [`CameraRig`] holds either one and resolves it to a look-at camera each frame.
//!
//! The view matrix is right-handed. Configurations where the look-at basis cannot be built
//! are reported as [`SceneError::DegenerateCamera`] instead of leaking NaN into the frame.

use nalgebra_glm as glm;

use crate::error::SceneError;

/// Vectors shorter than this are treated as zero when validating the look-at basis.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// A look-at camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: glm::Vec3,
    pub target: glm::Vec3,
    pub up: glm::Vec3,
}

impl Camera {
    /// Creates a camera at `eye` looking at `target`.
    pub fn new(eye: glm::Vec3, target: glm::Vec3, up: glm::Vec3) -> Self {
        Self { eye, target, up }
    }

    /// Right-handed look-at view matrix.
    ///
    /// Maps `eye` to the camera-space origin and `target` onto the negative Z axis. Fails
    /// when `eye == target`, when `up` is zero, or when `up` is parallel to the view
    /// direction.
    pub fn view_matrix(&self) -> Result<glm::Mat4, SceneError> {
        let forward = self.target - self.eye;
        if !(forward.iter().all(|c| c.is_finite()) && self.up.iter().all(|c| c.is_finite())) {
            return Err(SceneError::DegenerateCamera(format!(
                "non-finite camera vectors: eye {:?}, target {:?}, up {:?}",
                self.eye, self.target, self.up
            )));
        }
        if forward.norm() < DEGENERATE_EPSILON {
            return Err(SceneError::DegenerateCamera(
                "eye and target coincide".to_string(),
            ));
        }
        if self.up.norm() < DEGENERATE_EPSILON {
            return Err(SceneError::DegenerateCamera(
                "up vector is zero".to_string(),
            ));
        }
        if forward.normalize().cross(&self.up.normalize()).norm() < DEGENERATE_EPSILON {
            return Err(SceneError::DegenerateCamera(
                "up vector is parallel to the view direction".to_string(),
            ));
        }

        Ok(glm::look_at_rh(&self.eye, &self.target, &self.up))
    }

    /// Translates the eye by `(dx, dy, dz)` world units. The target stays put.
    pub fn move_eye(&mut self, dx: f32, dy: f32, dz: f32) {
        self.eye += glm::vec3(dx, dy, dz);
    }

    /// Translates the target by `(dx, dy, dz)` world units.
    pub fn move_target(&mut self, dx: f32, dy: f32, dz: f32) {
        self.target += glm::vec3(dx, dy, dz);
    }
}

/// A camera orbiting `target` at distance `radius`.
///
/// The eye sits at `target + radius * (sin θ cos φ, sin θ sin φ, cos θ)`; at θ = 0 it looks
/// down the negative Z axis from `+radius`. Angles are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
    pub target: glm::Vec3,
    pub up: glm::Vec3,
}

impl OrbitCamera {
    /// The eye position implied by the current radius and angles.
    pub fn eye(&self) -> glm::Vec3 {
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        self.target
            + self.radius * glm::vec3(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
    }

    /// The equivalent look-at camera.
    pub fn to_camera(&self) -> Camera {
        Camera::new(self.eye(), self.target, self.up)
    }

    /// Multiplies the orbit radius by `factor`, which must be finite and positive.
    pub fn scale_radius(&mut self, factor: f32) -> Result<(), SceneError> {
        check_factor("orbit radius", factor)?;
        self.radius *= factor;
        Ok(())
    }

    /// Adds `delta` radians to the polar angle θ.
    pub fn rotate_theta(&mut self, delta: f32) {
        self.theta += delta;
    }

    /// Adds `delta` radians to the azimuth φ.
    pub fn rotate_phi(&mut self, delta: f32) {
        self.phi += delta;
    }
}

/// The camera a scene is viewed through.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraRig {
    LookAt(Camera),
    Orbit(OrbitCamera),
}

impl CameraRig {
    /// Resolves the rig to the look-at camera used for this frame.
    pub fn camera(&self) -> Camera {
        match self {
            CameraRig::LookAt(camera) => camera.clone(),
            CameraRig::Orbit(orbit) => orbit.to_camera(),
        }
    }

    /// Moves the point the rig looks at. An orbit rig carries its eye along.
    pub fn move_target(&mut self, dx: f32, dy: f32, dz: f32) {
        match self {
            CameraRig::LookAt(camera) => camera.move_target(dx, dy, dz),
            CameraRig::Orbit(orbit) => orbit.target += glm::vec3(dx, dy, dz),
        }
    }
}

/// Validates a multiplicative factor for the scaling hooks.
pub(crate) fn check_factor(what: &str, factor: f32) -> Result<(), SceneError> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidParameter(format!(
            "{what} scale factor must be positive and finite, got {factor}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn default_camera() -> Camera {
        Camera::new(
            glm::vec3(0.0, 0.0, 5.0),
            glm::vec3(0.0, 0.0, 0.0),
            glm::vec3(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn view_maps_eye_to_origin() {
        let mut camera = default_camera();
        camera.move_eye(1.5, -2.0, 0.25);
        camera.move_target(0.3, 0.4, 0.0);
        let view = camera.view_matrix().unwrap();
        let eye = view * glm::vec4(camera.eye.x, camera.eye.y, camera.eye.z, 1.0);
        assert!((eye - glm::vec4(0.0, 0.0, 0.0, 1.0)).norm() < EPS);
    }

    #[test]
    fn view_puts_target_on_negative_z() {
        let camera = default_camera();
        let view = camera.view_matrix().unwrap();
        let target = view * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert!(target.x.abs() < EPS && target.y.abs() < EPS);
        assert!((target.z + 5.0).abs() < EPS);
    }

    #[test]
    fn parallel_up_is_degenerate() {
        let camera = Camera::new(
            glm::vec3(0.0, 5.0, 0.0),
            glm::vec3(0.0, 0.0, 0.0),
            glm::vec3(0.0, 1.0, 0.0),
        );
        assert!(matches!(
            camera.view_matrix(),
            Err(SceneError::DegenerateCamera(_))
        ));
    }

    #[test]
    fn coincident_eye_and_target_is_degenerate() {
        let mut camera = default_camera();
        camera.move_eye(0.0, 0.0, -5.0);
        assert!(matches!(
            camera.view_matrix(),
            Err(SceneError::DegenerateCamera(_))
        ));
    }

    #[test]
    fn orbit_eye_follows_spherical_coordinates() {
        let mut orbit = OrbitCamera {
            radius: 1.0,
            theta: 0.0,
            phi: 0.0,
            target: glm::vec3(0.0, 0.0, 0.0),
            up: glm::vec3(0.0, 1.0, 0.0),
        };
        assert!((orbit.eye() - glm::vec3(0.0, 0.0, 1.0)).norm() < EPS);

        orbit.scale_radius(2.0).unwrap();
        orbit.rotate_theta(FRAC_PI_2);
        assert!((orbit.eye() - glm::vec3(2.0, 0.0, 0.0)).norm() < EPS);

        // straight above the target with +Y up
        orbit.rotate_phi(FRAC_PI_2);
        assert!(matches!(
            orbit.to_camera().view_matrix(),
            Err(SceneError::DegenerateCamera(_))
        ));
    }

    #[test]
    fn scale_radius_rejects_non_positive() {
        let mut orbit = OrbitCamera {
            radius: 1.0,
            theta: 0.0,
            phi: 0.0,
            target: glm::Vec3::zeros(),
            up: glm::Vec3::y(),
        };
        assert!(orbit.scale_radius(0.0).is_err());
        assert!(orbit.scale_radius(f32::INFINITY).is_err());
        assert_eq!(orbit.radius, 1.0);
    }
}
