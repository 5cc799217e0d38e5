//! # Scene
//!
//! The `scene` module is the wgpu side of the [`Renderable`] capability. [`GpuScene`] holds the
//! uploaded mesh buffers, the two render pipelines, and the slotted uniform binding, and turns
//! each frame's [`RenderCommand`] into indexed draw calls.
//!
//! ## Overview
//!
//! - **Vertex buffer**: homogeneous positions from the [`Mesh`] generator.
//! - **Line index buffer**: a line list, used for sphere wireframes and surface outlines.
//! - **Triangle index buffer**: a triangle list, present only for filled surfaces.
//! - **Line pipeline**: `LineList` topology.
//! - **Fill pipeline**: `TriangleList` topology with a depth bias, so outlines drawn afterwards at
//!   the same depth stay in front of the surface they trace.
//! - **Uniform binding**: one slot per draw, selected with a dynamic offset.
//!
//! ## Example Usage
//!
//! ```ignore
//! let mut scene = GpuScene::new(&device, &queue, surface_format, state.draws_per_frame());
//! scene.upload_mesh(&mesh)?;
//!
//! // every frame
//! scene.set_uniforms(&command)?;
//! let mut render_pass = encoder.begin_render_pass(&render_pass_descriptor);
//! scene.draw(&mut render_pass);
//! ```

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::error::SceneError;
use crate::frame::{Primitive, RenderCommand};
use crate::mesh::Mesh;
use crate::renderable::Renderable;
use crate::renderer::Renderer;
use crate::uniform_binding::UniformBinding;
use crate::uniform_buffer::UniformBuffer;
use crate::vertex::Vertex;
use crate::SHADER_SOURCE;

/// Index data uploaded for one primitive type.
struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

/// GPU resources for drawing one mesh many times per frame.
pub struct GpuScene {
    device: Arc<wgpu::Device>,

    queue: Arc<wgpu::Queue>,

    /// `None` until [`Renderable::upload_mesh`] is called.
    vertex_buffer: Option<wgpu::Buffer>,

    line_indices: Option<IndexBuffer>,

    triangle_indices: Option<IndexBuffer>,

    /// Per-draw MVP and color slots.
    pub uniform: UniformBinding,

    line_pipeline: wgpu::RenderPipeline,

    fill_pipeline: wgpu::RenderPipeline,

    /// Primitive of each draw prepared by the last `set_uniforms`, in slot order.
    draws: Vec<Primitive>,
}

impl GpuScene {
    /// Creates the pipelines and a uniform binding with room for `draw_capacity` draws.
    pub fn new(
        device: &Arc<wgpu::Device>,
        queue: &Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        draw_capacity: usize,
    ) -> Self {
        let uniform = UniformBinding::new(device, draw_capacity);

        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(SHADER_SOURCE)),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform.bind_group_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline = Self::create_pipeline(
            device,
            surface_format,
            &pipeline_layout,
            &shader_module,
            Primitive::Lines,
        );
        let fill_pipeline = Self::create_pipeline(
            device,
            surface_format,
            &pipeline_layout,
            &shader_module,
            Primitive::Triangles,
        );

        Self {
            device: Arc::clone(device),
            queue: Arc::clone(queue),
            vertex_buffer: None,
            line_indices: None,
            triangle_indices: None,
            uniform,
            line_pipeline,
            fill_pipeline,
            draws: Vec::new(),
        }
    }

    /// Builds a pipeline for one primitive type.
    ///
    /// Both pipelines share the shader, the uniform layout and the vertex layout, and test depth
    /// with `LessEqual` so coplanar outlines pass. Only the triangle pipeline carries a depth
    /// bias: it pushes filled faces slightly back (slope factor 1, constant 2 units).
    fn create_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        pipeline_layout: &wgpu::PipelineLayout,
        shader_module: &wgpu::ShaderModule,
        primitive: Primitive,
    ) -> wgpu::RenderPipeline {
        let (label, topology, bias) = match primitive {
            Primitive::Lines => (
                "Line Pipeline",
                wgpu::PrimitiveTopology::LineList,
                wgpu::DepthBiasState::default(),
            ),
            Primitive::Triangles => (
                "Fill Pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 1.0,
                    clamp: 0.0,
                },
            ),
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader_module,
                entry_point: Some("vertex_main"),
                buffers: &[Vertex::description(&Vertex::vertex_attributes())],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // surfaces are seen from both sides
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Renderer::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias,
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: shader_module,
                entry_point: Some("fragment_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }

    fn create_index_buffer(&self, label: &str, indices: &[u32]) -> Option<IndexBuffer> {
        if indices.is_empty() {
            return None;
        }
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Some(IndexBuffer {
            buffer,
            count: indices.len() as u32,
        })
    }
}

impl Renderable for GpuScene {
    type Pass<'pass> = wgpu::RenderPass<'pass>;

    fn upload_mesh(&mut self, mesh: &Mesh) -> Result<(), SceneError> {
        if mesh.vertices.is_empty() {
            return Err(SceneError::InvalidMesh("cannot upload an empty mesh".to_string()));
        }

        self.vertex_buffer = Some(self.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
        self.line_indices = self.create_index_buffer("Line Index Buffer", &mesh.line_indices);
        self.triangle_indices =
            self.create_index_buffer("Triangle Index Buffer", &mesh.triangle_indices);

        log::info!(
            "Uploaded mesh: {} vertices, {} line indices, {} triangle indices",
            mesh.vertices.len(),
            mesh.line_indices.len(),
            mesh.triangle_indices.len()
        );
        Ok(())
    }

    fn set_uniforms(&mut self, command: &RenderCommand) -> Result<(), SceneError> {
        if command.draws.len() > self.uniform.capacity() {
            return Err(SceneError::UniformCapacity {
                requested: command.draws.len(),
                capacity: self.uniform.capacity(),
            });
        }

        let view_projection = command.projection * command.view;
        self.draws.clear();
        for (slot, draw) in command.draws.iter().enumerate() {
            self.uniform.update_slot(
                &self.queue,
                slot,
                UniformBuffer::for_draw(&view_projection, draw),
            )?;
            self.draws.push(draw.primitive);
        }
        Ok(())
    }

    fn draw<'pass>(&'pass self, renderpass: &mut wgpu::RenderPass<'pass>) {
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else {
            return;
        };
        renderpass.set_vertex_buffer(0, vertex_buffer.slice(..));

        for (slot, primitive) in self.draws.iter().enumerate() {
            let (pipeline, indices) = match primitive {
                Primitive::Lines => (&self.line_pipeline, self.line_indices.as_ref()),
                Primitive::Triangles => (&self.fill_pipeline, self.triangle_indices.as_ref()),
            };
            let Some(indices) = indices else {
                continue;
            };

            renderpass.set_pipeline(pipeline);
            renderpass.set_bind_group(
                0,
                &self.uniform.bind_group,
                &[self.uniform.dynamic_offset(slot)],
            );
            renderpass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
            renderpass.draw_indexed(0..indices.count, 0, 0..1);
        }
    }
}
