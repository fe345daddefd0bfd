//! # Graphics Module
//!
//! Camera, scene graph, GPU resources and the renderer.
//!
//! - **Camera System** ([`camera`]) - Z-up orbit camera with mouse and keyboard control
//! - **Scene Management** ([`scene`]) - Node hierarchy, transforms, mesh cache and loader
//! - **Rendering Pipeline** ([`rendering`]) - Lit, textured meshes, floor grid and selection tint
//! - **Resource Management** ([`resources`]) - Global uniforms and textures
//!
//! The scene modules do not touch the GPU, so everything that decides what is
//! drawn and where can be used and tested without a window:
//!
//! ```no_run
//! use roomview::gfx::scene::{MeshCache, ObjMeshLoader, SceneDescription, SceneLoader};
//!
//! let loader = ObjMeshLoader::new("models");
//! let mut meshes = MeshCache::new();
//! let scene = SceneLoader::new(&mut meshes, &loader).load(&SceneDescription::default_room());
//! println!("{} draw calls", scene.draw_list().len());
//! ```

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
