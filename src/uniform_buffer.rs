//! # Uniform Buffer
//!
//! This module defines the `UniformBuffer` struct, the per-draw block of data the vertex and
//! fragment stages read: the combined Model-View-Projection (MVP) matrix and the flat color
//! the draw is shaded with.
//!
//! ## Overview
//!
//! - **Model Transformation**: places one scene object (translation with its bob offset and its
//!   spin) in world space.
//! - **View Transformation**: the look-at camera of the current frame.
//! - **Projection Transformation**: perspective or orthographic, as configured.
//!
//! Every draw call of a frame gets its own `UniformBuffer` in its own slot of the uniform
//! binding, because all uniform writes of a frame land before the GPU executes any draw.
//!
//! ## Memory Layout
//!
//! - `#[repr(C)]` keeps the field order and offsets identical to the WGSL struct
//!   (`mat4x4<f32>` at offset 0, `vec4<f32>` at offset 64).
//! - `bytemuck::Pod` and `bytemuck::Zeroable` let the struct be written to a GPU buffer as raw
//!   bytes. `nalgebra-glm`'s `convert-bytemuck` feature provides these for the matrix and
//!   vector types.

use nalgebra_glm as glm;

use crate::frame::DrawCall;

/// Per-draw uniform data.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformBuffer {
    /// `projection * view * model` for this draw.
    pub mvp: glm::Mat4,

    /// RGBA color of every fragment of this draw.
    pub color: glm::Vec4,
}

impl UniformBuffer {
    /// Combines the frame's view and projection matrices with one draw call.
    pub fn for_draw(view_projection: &glm::Mat4, draw: &DrawCall) -> Self {
        Self {
            mvp: view_projection * draw.model,
            color: draw.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Primitive;

    #[test]
    fn layout_matches_wgsl_struct() {
        assert_eq!(std::mem::size_of::<UniformBuffer>(), 80);
        assert_eq!(std::mem::align_of::<UniformBuffer>(), 4);
    }

    #[test]
    fn for_draw_multiplies_model_last() {
        let view_projection = glm::scale(&glm::Mat4::identity(), &glm::vec3(2.0, 2.0, 2.0));
        let draw = DrawCall {
            primitive: Primitive::Lines,
            model: glm::translate(&glm::Mat4::identity(), &glm::vec3(1.0, 0.0, 0.0)),
            color: glm::vec4(0.1, 0.2, 0.3, 1.0),
        };
        let uniform = UniformBuffer::for_draw(&view_projection, &draw);
        let origin = uniform.mvp * glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, glm::vec4(2.0, 0.0, 0.0, 1.0));
        assert_eq!(uniform.color, draw.color);
    }
}
