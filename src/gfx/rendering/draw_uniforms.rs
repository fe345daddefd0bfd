//! Per-draw uniforms
//!
//! Each draw in a frame gets its own small uniform buffer holding the node's
//! world matrix and tint, bound at group 1. Buffers are kept between frames
//! and only grow.

use cgmath::{Matrix, Matrix4, SquareMatrix};

use crate::wgpu_utils::{binding_types, uniform_buffer::UniformBuffer};

/// MUST match the `Node` struct in `shader.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals under non-uniform scale
    pub normal: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl NodeUniform {
    pub fn new(world: Matrix4<f32>, tint: [f32; 4]) -> Self {
        // a zero scale makes the matrix singular; fall back to the model matrix
        let normal = world.invert().map(|m| m.transpose()).unwrap_or(world);
        Self {
            model: world.into(),
            normal: normal.into(),
            tint,
        }
    }
}

pub struct DrawUniforms {
    layout: wgpu::BindGroupLayout,
    slots: Vec<(UniformBuffer<NodeUniform>, wgpu::BindGroup)>,
}

impl DrawUniforms {
    pub fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Node Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        });

        Self {
            layout,
            slots: Vec::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// Writes one uniform per draw, creating buffers for new slots
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, uniforms: &[NodeUniform]) {
        while self.slots.len() < uniforms.len() {
            let buffer = UniformBuffer::new(device);
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Node Bind Group"),
                layout: &self.layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.binding_resource(),
                }],
            });
            self.slots.push((buffer, bind_group));
        }

        for ((buffer, _), uniform) in self.slots.iter_mut().zip(uniforms) {
            buffer.update_content(queue, *uniform);
        }
    }

    pub fn bind_group(&self, slot: usize) -> Option<&wgpu::BindGroup> {
        self.slots.get(slot).map(|(_, bind_group)| bind_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn normal_matrix_undoes_scale() {
        let world = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let uniform = NodeUniform::new(world, [1.0; 4]);
        assert_eq!(uniform.model[0][0], 2.0);
        assert_eq!(uniform.normal[0][0], 0.5);
        assert_eq!(uniform.normal[1][1], 1.0);
    }

    #[test]
    fn translation_does_not_leak_into_normals() {
        let world = Matrix4::from_translation(Vector3::new(3.0, 0.0, 0.0));
        let uniform = NodeUniform::new(world, [1.0, 1.0, 0.5, 1.0]);
        assert_eq!(uniform.model[3][0], 3.0);
        // translation ends up in the last row, which the shader drops
        assert_eq!(uniform.normal[3][0], 0.0);
        assert_eq!(uniform.tint, [1.0, 1.0, 0.5, 1.0]);
    }

    #[test]
    fn singular_matrices_fall_back() {
        let world = Matrix4::from_scale(0.0);
        let uniform = NodeUniform::new(world, [1.0; 4]);
        assert_eq!(uniform.normal, uniform.model);
    }
}
