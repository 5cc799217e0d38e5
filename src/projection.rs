//! # Projection
//!
//! Perspective and orthographic projection parameters, their validation, and the scaling
//! hooks the input layer uses to resize the viewing volume. Matrices map camera space to
//! wgpu clip space (right-handed, depth in `[0, 1]`).

use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

use crate::camera::check_factor;
use crate::error::SceneError;

/// Projection parameters, mutated by UI controls between frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    Perspective {
        /// Vertical field of view in degrees.
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Checks the invariants of the current parameters.
    ///
    /// Perspective needs `0 < near < far`, a field of view strictly between 0° and 180°, and a
    /// positive aspect ratio. Orthographic only needs non-empty extents, so a negative `near`
    /// (a volume straddling the eye) is allowed.
    pub fn validate(&self) -> Result<(), SceneError> {
        match *self {
            Projection::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            } => {
                if ![fov_y_degrees, aspect, near, far].iter().all(|v| v.is_finite()) {
                    return Err(SceneError::InvalidProjection(
                        "perspective parameters must be finite".to_string(),
                    ));
                }
                if near <= 0.0 || far <= near {
                    return Err(SceneError::InvalidProjection(format!(
                        "perspective requires 0 < near < far, got near {near}, far {far}"
                    )));
                }
                if fov_y_degrees <= 0.0 || fov_y_degrees >= 180.0 {
                    return Err(SceneError::InvalidProjection(format!(
                        "field of view must be in (0, 180) degrees, got {fov_y_degrees}"
                    )));
                }
                if aspect <= 0.0 {
                    return Err(SceneError::InvalidProjection(format!(
                        "aspect ratio must be positive, got {aspect}"
                    )));
                }
            }
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => {
                if ![left, right, bottom, top, near, far].iter().all(|v| v.is_finite()) {
                    return Err(SceneError::InvalidProjection(
                        "orthographic bounds must be finite".to_string(),
                    ));
                }
                if left == right || bottom == top || near == far {
                    return Err(SceneError::InvalidProjection(format!(
                        "orthographic volume is empty: [{left}, {right}] x [{bottom}, {top}] x [{near}, {far}]"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The projection matrix for the current parameters.
    pub fn matrix(&self) -> Result<glm::Mat4, SceneError> {
        self.validate()?;
        let matrix = match *self {
            Projection::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            } => glm::perspective_rh_zo(aspect, fov_y_degrees.to_radians(), near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => glm::ortho_rh_zo(left, right, bottom, top, near, far),
        };
        Ok(matrix)
    }

    /// Multiplies both clipping planes by `factor`.
    ///
    /// Fails without modifying anything if the factor is not positive or the result would
    /// break the projection's invariants.
    pub fn scale_near_far(&mut self, factor: f32) -> Result<(), SceneError> {
        check_factor("near/far", factor)?;
        let mut scaled = self.clone();
        match &mut scaled {
            Projection::Perspective { near, far, .. }
            | Projection::Orthographic { near, far, .. } => {
                *near *= factor;
                *far *= factor;
            }
        }
        self.replace_checked(scaled)
    }

    /// Multiplies all four orthographic bounds by `factor`. Either every bound changes or none.
    pub fn scale_ortho_bounds(&mut self, factor: f32) -> Result<(), SceneError> {
        self.scale_bounds("ortho bounds", factor, true, true)
    }

    /// Multiplies the orthographic `left` and `right` bounds by `factor`.
    pub fn scale_horizontal_bounds(&mut self, factor: f32) -> Result<(), SceneError> {
        self.scale_bounds("horizontal bounds", factor, true, false)
    }

    /// Multiplies the orthographic `bottom` and `top` bounds by `factor`.
    pub fn scale_vertical_bounds(&mut self, factor: f32) -> Result<(), SceneError> {
        self.scale_bounds("vertical bounds", factor, false, true)
    }

    fn scale_bounds(
        &mut self,
        what: &str,
        factor: f32,
        horizontal: bool,
        vertical: bool,
    ) -> Result<(), SceneError> {
        check_factor(what, factor)?;
        let mut scaled = self.clone();
        match &mut scaled {
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                ..
            } => {
                if horizontal {
                    *left *= factor;
                    *right *= factor;
                }
                if vertical {
                    *bottom *= factor;
                    *top *= factor;
                }
            }
            Projection::Perspective { .. } => {
                log::debug!("Ignoring {what} scale on a perspective projection");
                return Ok(());
            }
        }
        self.replace_checked(scaled)
    }

    /// Updates the perspective aspect ratio after a surface resize.
    ///
    /// Orthographic bounds are fixed by configuration and are left untouched.
    pub fn set_aspect(&mut self, new_aspect: f32) -> Result<(), SceneError> {
        if !(new_aspect.is_finite() && new_aspect > 0.0) {
            return Err(SceneError::InvalidParameter(format!(
                "aspect ratio must be positive and finite, got {new_aspect}"
            )));
        }
        if let Projection::Perspective { aspect, .. } = self {
            *aspect = new_aspect;
        }
        Ok(())
    }

    fn replace_checked(&mut self, candidate: Projection) -> Result<(), SceneError> {
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }
}

/// Flattens a matrix into the 16 column-major floats a graphics context expects.
pub fn flatten(matrix: &glm::Mat4) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(matrix.as_slice());
    out
}
