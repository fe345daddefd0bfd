//! Global uniform bindings for camera and scene lighting
//!
//! Everything shared by every draw in a frame lives in one uniform buffer
//! bound at group 0: the camera, a white key light and the point lights
//! carried by scene nodes.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, scene::PointLight},
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Point lights beyond this count are dropped for the frame
pub const MAX_LIGHTS: usize = 4;

/// How many of `light_count` lights the shader will never see
pub fn dropped_light_count(light_count: usize) -> usize {
    light_count.saturating_sub(MAX_LIGHTS)
}

/// World position of the white key light
pub const KEY_LIGHT_POSITION: [f32; 3] = [5.0, 5.0, 10.0];

/// One point light as laid out in the shader
///
/// Vectors are padded to 16 bytes for uniform alignment.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// Constant, linear and quadratic factors
    pub attenuation: [f32; 4],
}

impl From<&PointLight> for GpuPointLight {
    fn from(light: &PointLight) -> Self {
        let [x, y, z] = light.position;
        let [r, g, b] = light.color;
        let [c, l, q] = light.attenuation;
        Self {
            position: [x, y, z, 1.0],
            color: [r, g, b, 1.0],
            attenuation: [c, l, q, 0.0],
        }
    }
}

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
    pub key_light_position: [f32; 4],
    pub lights: [GpuPointLight; MAX_LIGHTS],
    /// Number of valid entries in `lights`, padded to 16 bytes
    pub light_count: [u32; 4],
}

impl GlobalUBOContent {
    pub fn new(camera: CameraUniform, lights: &[PointLight]) -> Self {
        let mut gpu_lights = [GpuPointLight::default(); MAX_LIGHTS];
        let count = lights.len().min(MAX_LIGHTS);
        for (slot, light) in gpu_lights.iter_mut().zip(lights) {
            *slot = light.into();
        }

        let [kx, ky, kz] = KEY_LIGHT_POSITION;
        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            key_light_position: [kx, ky, kz, 1.0],
            lights: gpu_lights,
            light_count: [count as u32, 0, 0, 0],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Writes this frame's camera and lights to the global buffer
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    lights: &[PointLight],
) {
    ubo.update_content(queue, GlobalUBOContent::new(camera, lights));
}

/// Bind group layout and bind group for the global uniforms
///
/// Bound to slot 0 in every pipeline.
pub struct GlobalBindings {
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: binding_types::uniform(),
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Global Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(x: f32) -> PointLight {
        PointLight {
            position: [x, 0.0, 1.0],
            color: [1.0, 0.7, 0.2],
            attenuation: [1.0, 0.1, 0.02],
        }
    }

    #[test]
    fn layout_is_uniform_aligned() {
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 48);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>() % 16, 0);
    }

    #[test]
    fn lights_are_packed_in_order() {
        let content = GlobalUBOContent::new(CameraUniform::default(), &[light(1.0), light(2.0)]);
        assert_eq!(content.light_count[0], 2);
        assert_eq!(content.lights[0].position, [1.0, 0.0, 1.0, 1.0]);
        assert_eq!(content.lights[1].position[0], 2.0);
        assert_eq!(content.lights[1].attenuation, [1.0, 0.1, 0.02, 0.0]);
        assert_eq!(content.lights[2], GpuPointLight::default());
        assert_eq!(content.key_light_position, [5.0, 5.0, 10.0, 1.0]);
    }

    #[test]
    fn extra_lights_are_dropped() {
        let lights: Vec<_> = (0..MAX_LIGHTS + 2).map(|i| light(i as f32)).collect();
        let content = GlobalUBOContent::new(CameraUniform::default(), &lights);
        assert_eq!(content.light_count[0] as usize, MAX_LIGHTS);
        assert_eq!(dropped_light_count(lights.len()), 2);
        assert_eq!(dropped_light_count(MAX_LIGHTS), 0);
        assert_eq!(
            content.lights[MAX_LIGHTS - 1].position[0],
            (MAX_LIGHTS - 1) as f32
        );
    }
}
