//! # Renderable
//!
//! The capability the scene core needs from a graphics backend. Mesh generation and frame
//! computation produce plain data ([`Mesh`], [`RenderCommand`]); an implementation of
//! [`Renderable`] turns that data into GPU work. The wgpu implementation lives in
//! [`crate::scene::GpuScene`].

use crate::error::SceneError;
use crate::frame::RenderCommand;
use crate::mesh::Mesh;

/// A backend that can hold one mesh and draw it once per [`crate::frame::DrawCall`].
///
/// Per frame the host calls [`Renderable::set_uniforms`] with the frame's command, then
/// [`Renderable::draw`] inside its render pass.
pub trait Renderable {
    /// The backend's render pass (or recording target) for one frame.
    type Pass<'pass>
    where
        Self: 'pass;

    /// Uploads vertex and index data. Replaces any previously uploaded mesh.
    fn upload_mesh(&mut self, mesh: &Mesh) -> Result<(), SceneError>;

    /// Stores the per-draw matrices and colors of `command` for the next [`Renderable::draw`].
    fn set_uniforms(&mut self, command: &RenderCommand) -> Result<(), SceneError>;

    /// Records the draw calls prepared by the last [`Renderable::set_uniforms`].
    fn draw<'pass>(&'pass self, pass: &mut Self::Pass<'pass>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::frame::Primitive;
    use crate::uniform_buffer::UniformBuffer;

    /// Records what a GPU backend would have been asked to do.
    #[derive(Default)]
    struct RecordingRenderer {
        vertex_count: usize,
        line_index_count: usize,
        triangle_index_count: usize,
        uniforms: Vec<(Primitive, UniformBuffer)>,
    }

    impl Renderable for RecordingRenderer {
        type Pass<'pass> = Vec<String>;

        fn upload_mesh(&mut self, mesh: &Mesh) -> Result<(), SceneError> {
            self.vertex_count = mesh.vertices.len();
            self.line_index_count = mesh.line_indices.len();
            self.triangle_index_count = mesh.triangle_indices.len();
            Ok(())
        }

        fn set_uniforms(&mut self, command: &RenderCommand) -> Result<(), SceneError> {
            let view_projection = command.projection * command.view;
            self.uniforms = command
                .draws
                .iter()
                .map(|draw| (draw.primitive, UniformBuffer::for_draw(&view_projection, draw)))
                .collect();
            Ok(())
        }

        fn draw<'pass>(&'pass self, pass: &mut Vec<String>) {
            for (slot, (primitive, _)) in self.uniforms.iter().enumerate() {
                let count = match primitive {
                    Primitive::Lines => self.line_index_count,
                    Primitive::Triangles => self.triangle_index_count,
                };
                pass.push(format!("{primitive:?} slot {slot} indices {count}"));
            }
        }
    }

    #[test]
    fn hat_scene_draws_fill_then_outline() {
        let (mut state, mesh) = SceneConfig::hat_surface().build().unwrap();
        let mut renderer = RecordingRenderer::default();
        renderer.upload_mesh(&mesh).unwrap();
        renderer.set_uniforms(&state.tick(1.0 / 60.0).unwrap()).unwrap();

        let mut pass = Vec::new();
        renderer.draw(&mut pass);
        assert_eq!(
            pass,
            vec![
                format!("Triangles slot 0 indices {}", 49 * 49 * 6),
                format!("Lines slot 1 indices {}", 49 * 49 * 8),
            ]
        );
        assert_eq!(renderer.uniforms[0].1.color.x, 1.0);
        assert_eq!(renderer.uniforms[1].1.color.x, 0.0);
    }

    #[test]
    fn planets_scene_uses_one_slot_per_planet() {
        let (mut state, mesh) = SceneConfig::planets().build().unwrap();
        let mut renderer = RecordingRenderer::default();
        renderer.upload_mesh(&mesh).unwrap();
        let command = state.tick(0.5).unwrap();
        renderer.set_uniforms(&command).unwrap();

        assert_eq!(renderer.vertex_count, 21 * 21);
        assert_eq!(renderer.uniforms.len(), 3);
        let mvps: Vec<_> = renderer.uniforms.iter().map(|(_, u)| u.mvp).collect();
        assert_ne!(mvps[0], mvps[1]);
        assert_ne!(mvps[1], mvps[2]);
    }
}
