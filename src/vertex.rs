//! # Vertex Module
//!
//! This module provides the `Vertex` struct shared by every generated mesh. A vertex is a
//! homogeneous position `[x, y, z, 1.0]` and nothing else: color is a per-draw uniform in this
//! crate, so one mesh buffer can be drawn many times with different colors and transforms.
//!
//! ## Overview
//!
//! - [`Vertex`]: a single immutable mesh vertex.
//! - [`Vertex::vertex_attributes`]: the attribute list the WGSL vertex stage expects.
//! - [`Vertex::description`]: the buffer layout handed to the render pipeline.
//!
//! ## Usage
//!
//! ```rust
//! use orrery_core::Vertex;
//!
//! let vertex = Vertex::new(0.0, 1.0, 0.0);
//! assert_eq!(vertex.position, [0.0, 1.0, 0.0, 1.0]);
//!
//! // Vertices are `Pod`, so a slice of them uploads without copying.
//! let bytes: &[u8] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
//! assert_eq!(bytes.len(), 16);
//! ```
//!
//! ## Crate Dependencies
//!
//! - `wgpu` for the GPU attributes and layouts.
//! - `bytemuck` for casting vertex slices to bytes for buffer upload.

/// A single mesh vertex in homogeneous coordinates.
///
/// The `w` component is always `1.0`; generators never produce any other value. Vertices
/// are created once at startup and are read-only thereafter.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// `[x, y, z, w]` with `w == 1.0`.
    pub position: [f32; 4],
}

impl Vertex {
    /// Creates a vertex at `(x, y, z)` with `w = 1.0`.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z, 1.0],
        }
    }

    /// The Cartesian part of the position.
    pub fn xyz(&self) -> nalgebra_glm::Vec3 {
        nalgebra_glm::vec3(self.position[0], self.position[1], self.position[2])
    }

    /// Generates the vertex attributes layout for the `Vertex` struct.
    ///
    /// A single `Float32x4` attribute at shader location 0, matching `@location(0) position`
    /// in the WGSL vertex stage.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![0 => Float32x4].to_vec()
    }

    /// Returns the vertex buffer layout for the `Vertex` struct.
    ///
    /// The stride is the size of one `Vertex` and the buffer advances per vertex. The
    /// `attributes` slice is normally the result of [`Vertex::vertex_attributes`]; it is taken
    /// by reference so the returned layout can borrow it for pipeline creation.
    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}
