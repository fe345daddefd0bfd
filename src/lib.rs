//! Room Viewer
//!
//! An interactive 3D scene viewer and editor built on wgpu and winit: a scene
//! graph of OBJ meshes with hierarchical transforms, keyboard editing of the
//! selected node, spin animation, node lights and an orbiting camera.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{load_scene, RoomViewApp};
pub use config::ViewerConfig;
pub use error::{SceneError, SceneResult};
