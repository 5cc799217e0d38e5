//! # Uniform Binding Module
//!
//! This module defines the `UniformBinding` struct, which owns the uniform buffer every draw
//! call reads its [`UniformBuffer`] from, together with the bind group and bind group layout
//! that expose it to the shaders.
//!
//! ## Overview
//!
//! A frame issues several draws against the same mesh (three planets, or the filled hat surface
//! followed by its outline), each with its own MVP matrix and color. `queue.write_buffer` calls
//! are all applied before the frame's commands run, so a single uniform slot would leave every
//! draw with the last value written. Instead the buffer is divided into `capacity` slots, and
//! the bind group is bound with a *dynamic offset* selecting the slot for each draw.
//!
//! - **Uniform buffer**: `capacity * stride` bytes, where `stride` is the size of
//!   [`UniformBuffer`] rounded up to the device's `min_uniform_buffer_offset_alignment`.
//! - **Bind group layout**: binding 0, visible to vertex and fragment stages, with
//!   `has_dynamic_offset: true`.
//! - **Bind group**: a window of one `UniformBuffer` over the buffer; the dynamic offset moves
//!   the window.
//!
//! ## Usage
//!
//! ```ignore
//! let mut uniform = UniformBinding::new(&device, 4);
//! uniform.update_slot(&queue, 2, uniform_data)?;
//! render_pass.set_bind_group(0, &uniform.bind_group, &[uniform.dynamic_offset(2)]);
//! ```

use crate::error::SceneError;
use crate::uniform_buffer::UniformBuffer;

/// A slotted uniform buffer bound with dynamic offsets.
pub struct UniformBinding {
    /// The GPU buffer holding `capacity` uniform slots.
    pub buffer: wgpu::Buffer,

    /// Binds a single-slot window of `buffer` at binding 0.
    pub bind_group: wgpu::BindGroup,

    /// The layout shared by the pipelines that read the uniform block.
    pub bind_group_layout: wgpu::BindGroupLayout,

    stride: wgpu::BufferAddress,

    capacity: usize,
}

impl UniformBinding {
    /// Allocates `capacity` uniform slots (at least one).
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let stride = slot_stride(device.limits().min_uniform_buffer_offset_alignment);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: stride * capacity as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            }],
            label: Some("uniform_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_SIZE),
                }),
            }],
            label: Some("uniform_bind_group"),
        });

        log::info!("Allocated {capacity} uniform slots with a stride of {stride} bytes");

        Self {
            buffer,
            bind_group,
            bind_group_layout,
            stride,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The dynamic offset that selects `slot` when setting the bind group.
    pub fn dynamic_offset(&self, slot: usize) -> wgpu::DynamicOffset {
        (slot as wgpu::BufferAddress * self.stride) as wgpu::DynamicOffset
    }

    /// Queues a write of `uniform_buffer` into `slot`.
    pub fn update_slot(
        &mut self,
        queue: &wgpu::Queue,
        slot: usize,
        uniform_buffer: UniformBuffer,
    ) -> Result<(), SceneError> {
        if slot >= self.capacity {
            return Err(SceneError::UniformCapacity {
                requested: slot + 1,
                capacity: self.capacity,
            });
        }
        queue.write_buffer(
            &self.buffer,
            slot as wgpu::BufferAddress * self.stride,
            bytemuck::bytes_of(&uniform_buffer),
        );
        Ok(())
    }
}

const UNIFORM_SIZE: wgpu::BufferAddress =
    std::mem::size_of::<UniformBuffer>() as wgpu::BufferAddress;

/// Rounds the uniform block size up to the device's offset alignment.
fn slot_stride(alignment: u32) -> wgpu::BufferAddress {
    let alignment = wgpu::BufferAddress::from(alignment.max(1));
    UNIFORM_SIZE.div_ceil(alignment) * alignment
}
