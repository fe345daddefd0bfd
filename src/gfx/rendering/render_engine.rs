//! WGPU-based rendering engine for the room viewer
//!
//! One pass draws the floor grid and every mesh in the scene's draw list,
//! then an optional UI callback records the overlay into the same encoder.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::Context;
use log::{debug, info, warn};
use wgpu::{util::DeviceExt, DepthStencilState, RenderPipeline, TextureFormat};

use crate::{
    config::RenderSettings,
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
            texture_resource::TextureResource,
        },
        scene::{LineVertex, MeshCache, PointLight, Scene, Vertex3D},
    },
    wgpu_utils::binding_types,
};

use super::{
    draw_uniforms::{DrawUniforms, NodeUniform},
    gpu_mesh::{DrawMesh, GpuMesh},
    grid::{floor_grid, GRID_COLOR, GRID_HALF_EXTENT},
    highlight::WHITE,
};

/// Texture slot of the 1x1 white fallback
const WHITE_TEXTURE: usize = 0;

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,

    mesh_pipeline: RenderPipeline,
    line_pipeline: RenderPipeline,

    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    draw_uniforms: DrawUniforms,

    texture_layout: wgpu::BindGroupLayout,
    textures: Vec<wgpu::BindGroup>,
    texture_slots: HashMap<String, usize>,
    texture_dir: PathBuf,

    /// Indexed by `MeshId`; the cache only ever appends
    gpu_meshes: Vec<GpuMesh>,

    grid_buffer: wgpu::Buffer,
    grid_vertex_count: u32,

    settings: RenderSettings,
}

impl RenderEngine {
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        settings: RenderSettings,
        texture_dir: PathBuf,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            "Surface configured: {}x{} {:?}",
            config.width, config.height, format
        );

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        // GLOBAL UNIFORMS - CAMERA AND LIGHTS, SHARED BY BOTH PIPELINES
        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let draw_uniforms = DrawUniforms::new(&device);

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Diffuse Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::texture_2d(),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let mesh_pipeline = create_mesh_pipeline(
            &device,
            format,
            &[
                global_bindings.bind_group_layout(),
                draw_uniforms.layout(),
                &texture_layout,
            ],
        );
        let line_pipeline =
            create_line_pipeline(&device, format, global_bindings.bind_group_layout());

        let grid = floor_grid(GRID_HALF_EXTENT, GRID_COLOR);
        let grid_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Grid Vertex Buffer"),
            contents: bytemuck::cast_slice(&grid),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let white = TextureResource::white(&device, &queue);
        let white_bind_group = create_texture_bind_group(&device, &texture_layout, &white);

        Ok(RenderEngine {
            surface,
            device: device.into(),
            queue: queue.into(),
            config,
            depth_texture,
            format,
            mesh_pipeline,
            line_pipeline,
            global_ubo,
            global_bindings,
            draw_uniforms,
            texture_layout,
            textures: vec![white_bind_group],
            texture_slots: HashMap::new(),
            texture_dir,
            gpu_meshes: Vec::new(),
            grid_buffer,
            grid_vertex_count: grid.len() as u32,
            settings,
        })
    }

    /// Uploads meshes added to the cache since the last call
    pub fn sync_meshes(&mut self, meshes: &MeshCache) {
        let uploaded = self.gpu_meshes.len();
        for (id, mesh) in meshes.iter().skip(uploaded) {
            let texture = match &mesh.diffuse_texture {
                Some(name) => self.texture_slot(name),
                None => WHITE_TEXTURE,
            };
            debug!("Uploading mesh {:?} '{}'", id, mesh.name);
            self.gpu_meshes
                .push(GpuMesh::new(&self.device, mesh, texture));
        }
    }

    /// Returns the bind group slot for a texture file, loading it on first use
    fn texture_slot(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.texture_slots.get(name) {
            return slot;
        }

        let path = self.texture_dir.join(name);
        let slot = match TextureResource::from_file(&self.device, &self.queue, &path) {
            Ok(texture) => {
                info!("Loaded texture {}", path.display());
                self.textures.push(create_texture_bind_group(
                    &self.device,
                    &self.texture_layout,
                    &texture,
                ));
                self.textures.len() - 1
            }
            Err(err) => {
                warn!("{err}; using plain white");
                WHITE_TEXTURE
            }
        };
        self.texture_slots.insert(name.to_string(), slot);
        slot
    }

    pub fn update(&mut self, camera_uniform: CameraUniform, lights: &[PointLight]) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform, lights);
    }

    /// Draws the scene, tinting highlighted nodes with `highlight`
    ///
    /// `ui_callback` runs after the scene pass with the same encoder and
    /// target so the overlay lands on top.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        highlight: [f32; 4],
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draw_list = scene.draw_list();
        let uniforms: Vec<NodeUniform> = draw_list
            .iter()
            .map(|item| {
                let tint = if item.highlighted { highlight } else { WHITE };
                NodeUniform::new(item.world, tint)
            })
            .collect();
        self.draw_uniforms
            .prepare(&self.device, &self.queue, &uniforms);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b] = self.settings.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            if self.settings.show_grid {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.grid_buffer.slice(..));
                render_pass.draw(0..self.grid_vertex_count, 0..1);
            }

            render_pass.set_pipeline(&self.mesh_pipeline);
            for (slot, item) in draw_list.iter().enumerate() {
                let Some(mesh) = self.gpu_meshes.get(item.mesh.index()) else {
                    continue;
                };
                let Some(node_bind_group) = self.draw_uniforms.bind_group(slot) else {
                    continue;
                };
                let texture = self
                    .textures
                    .get(mesh.texture)
                    .unwrap_or(&self.textures[WHITE_TEXTURE]);

                render_pass.set_bind_group(1, node_bind_group, &[]);
                render_pass.set_bind_group(2, texture, &[]);
                render_pass.draw_mesh(mesh);
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Reconfigures the surface at its current size, after it was lost
    pub fn reconfigure(&mut self) {
        self.resize(self.config.width, self.config.height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &TextureResource,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Diffuse Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

fn depth_state() -> DepthStencilState {
    DepthStencilState {
        format: TextureResource::DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Mesh Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Mesh Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc()],
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // models are lit from both sides, so both faces are drawn
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
            unclipped_depth: false,
        },
        depth_stencil: Some(depth_state()),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}

fn create_line_pipeline(
    device: &wgpu::Device,
    format: TextureFormat,
    globals_layout: &wgpu::BindGroupLayout,
) -> RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Line Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("line.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Line Pipeline Layout"),
        bind_group_layouts: &[globals_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Line Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[LineVertex::desc()],
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: Some(depth_state()),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}
