//! # Scene configuration
//!
//! A scene is described by a [`SceneConfig`]: which mesh to generate, how the camera and
//! projection start out, how objects are drawn and animated. Configs deserialize from TOML,
//! and two presets reproduce the planets and hat-surface scenes.
//!
//! ```toml
//! title = "Two moons"
//! clear_color = [0.0, 0.0, 0.0, 1.0]
//!
//! [mesh]
//! kind = "sphere"
//! radius = 1.0
//! lat_bands = 12
//! long_bands = 12
//!
//! [camera]
//! kind = "look_at"
//! eye = [0.0, 0.0, 5.0]
//! target = [0.0, 0.0, 0.0]
//! up = [0.0, 1.0, 0.0]
//!
//! [projection]
//! kind = "perspective"
//! fov_y_degrees = 60.0
//! aspect = 1.0
//! near = 0.1
//! far = 100.0
//!
//! [[objects]]
//! position = [0.0, 0.0, -4.0]
//! color = [0.8, 0.8, 0.8, 1.0]
//! ```

use std::path::Path;

use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraRig, OrbitCamera};
use crate::error::SceneError;
use crate::frame::{Bob, DrawStyle, InputSteps, SceneObject, SceneState};
use crate::mesh::{self, Mesh};
use crate::projection::Projection;

/// Rotation of the planets preset: half a degree per frame at 60 Hz.
const PLANET_SPIN_DEGREES_PER_SECOND: f32 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshConfig {
    Sphere {
        radius: f32,
        lat_bands: u32,
        long_bands: u32,
    },
    /// A grid sampled from the radial hat function.
    HeightField { rows: u32, cols: u32 },
}

impl MeshConfig {
    pub fn generate(&self) -> Result<Mesh, SceneError> {
        match *self {
            MeshConfig::Sphere {
                radius,
                lat_bands,
                long_bands,
            } => mesh::generate_sphere(radius, lat_bands, long_bands),
            MeshConfig::HeightField { rows, cols } => {
                mesh::generate_height_field(rows, cols, mesh::hat)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraConfig {
    LookAt {
        eye: [f32; 3],
        target: [f32; 3],
        up: [f32; 3],
    },
    Orbit {
        radius: f32,
        theta_degrees: f32,
        phi_degrees: f32,
        #[serde(default)]
        target: [f32; 3],
        #[serde(default = "default_up")]
        up: [f32; 3],
    },
}

impl CameraConfig {
    fn rig(&self) -> CameraRig {
        match self {
            CameraConfig::LookAt { eye, target, up } => CameraRig::LookAt(Camera::new(
                glm::make_vec3(eye),
                glm::make_vec3(target),
                glm::make_vec3(up),
            )),
            CameraConfig::Orbit {
                radius,
                theta_degrees,
                phi_degrees,
                target,
                up,
            } => CameraRig::Orbit(OrbitCamera {
                radius: *radius,
                theta: theta_degrees.to_radians(),
                phi: phi_degrees.to_radians(),
                target: glm::make_vec3(target),
                up: glm::make_vec3(up),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub position: [f32; 3],
    pub color: [f32; 4],
    #[serde(default)]
    pub spin_degrees_per_second: f32,
    #[serde(default = "default_up")]
    pub spin_axis: [f32; 3],
    #[serde(default)]
    pub bob: Bob,
}

impl From<&ObjectConfig> for SceneObject {
    fn from(config: &ObjectConfig) -> Self {
        SceneObject {
            position: glm::make_vec3(&config.position),
            color: glm::make_vec4(&config.color),
            spin_degrees_per_second: config.spin_degrees_per_second,
            spin_axis: glm::make_vec3(&config.spin_axis),
            bob: config.bob,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub title: String,
    pub mesh: MeshConfig,
    pub camera: CameraConfig,
    pub projection: Projection,
    #[serde(default = "default_style")]
    pub style: DrawStyle,
    pub clear_color: [f32; 4],
    #[serde(default)]
    pub steps: InputSteps,
    pub objects: Vec<ObjectConfig>,
}

impl SceneConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Looks up a built-in scene by name (`planets` or `hat`).
    pub fn preset(name: &str) -> Result<Self, SceneError> {
        match name {
            "planets" => Ok(Self::planets()),
            "hat" => Ok(Self::hat_surface()),
            other => Err(SceneError::UnknownPreset(other.to_string())),
        }
    }

    /// Three wireframe planets bobbing in front of a perspective camera.
    pub fn planets() -> Self {
        let planet = |index: usize, position: [f32; 3], color: [f32; 4], bob_speed: f32| {
            ObjectConfig {
                position,
                color,
                spin_degrees_per_second: PLANET_SPIN_DEGREES_PER_SECOND,
                spin_axis: default_up(),
                bob: Bob {
                    amplitude: 0.2,
                    speed: bob_speed,
                    phase: index as f32,
                },
            }
        };

        Self {
            title: "Planets".to_string(),
            mesh: MeshConfig::Sphere {
                radius: 1.0,
                lat_bands: 20,
                long_bands: 20,
            },
            camera: CameraConfig::LookAt {
                eye: [0.0, 0.0, 5.0],
                target: [0.0, 0.0, 0.0],
                up: default_up(),
            },
            projection: Projection::Perspective {
                fov_y_degrees: 60.0,
                aspect: 1.0,
                near: 0.1,
                far: 100.0,
            },
            style: DrawStyle::Wireframe,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            steps: InputSteps::default(),
            objects: vec![
                // mars
                planet(0, [-3.0, 1.0, -5.0], [0.4, 0.2, 0.1, 1.0], 0.6),
                // earth
                planet(1, [0.0, -1.0, -10.0], [0.0, 0.5, 1.0, 1.0], 1.5),
                // jupiter
                planet(2, [3.0, 0.0, -20.0], [1.0, 0.8, 0.2, 1.0], 0.3),
            ],
        }
    }

    /// The radial hat function as a red surface with black cell outlines, viewed through an
    /// orbiting orthographic camera.
    pub fn hat_surface() -> Self {
        Self {
            title: "Hat function".to_string(),
            mesh: MeshConfig::HeightField { rows: 50, cols: 50 },
            camera: CameraConfig::Orbit {
                radius: 1.0,
                theta_degrees: 0.0,
                phi_degrees: 0.0,
                target: [0.0, 0.0, 0.0],
                up: default_up(),
            },
            projection: Projection::Orthographic {
                left: -2.0,
                right: 2.0,
                bottom: -2.0,
                top: 2.0,
                near: -10.0,
                far: 10.0,
            },
            style: DrawStyle::FilledWithOutline {
                outline: [0.0, 0.0, 0.0, 1.0],
            },
            clear_color: [1.0, 1.0, 1.0, 1.0],
            steps: InputSteps::default(),
            objects: vec![ObjectConfig {
                position: [0.0, 0.0, 0.0],
                color: [1.0, 0.0, 0.0, 1.0],
                spin_degrees_per_second: 0.0,
                spin_axis: default_up(),
                bob: Bob::default(),
            }],
        }
    }

    /// Generates the mesh and the initial scene state.
    ///
    /// The projection and the initial camera are validated here so a bad config fails at
    /// startup rather than on the first frame.
    pub fn build(&self) -> Result<(SceneState, Mesh), SceneError> {
        let mesh = self.mesh.generate()?;
        if matches!(self.style, DrawStyle::FilledWithOutline { .. }) && !mesh.has_triangles() {
            return Err(SceneError::InvalidParameter(
                "filled_with_outline style needs a mesh with triangles, such as height_field"
                    .to_string(),
            ));
        }
        self.projection.validate()?;
        let rig = self.camera.rig();
        rig.camera().view_matrix()?;

        let state = SceneState::new(
            rig,
            self.projection.clone(),
            self.objects.iter().map(SceneObject::from).collect(),
            self.style,
            self.clear_color,
            self.steps,
        );
        log::info!(
            "Built scene '{}' with {} vertices and {} objects",
            self.title,
            mesh.vertices.len(),
            state.objects.len()
        );
        Ok((state, mesh))
    }
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_style() -> DrawStyle {
    DrawStyle::Wireframe
}
