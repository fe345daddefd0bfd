//! Core rendering functionality
//!
//! Pipelines, per-draw GPU resources and frame rendering.

pub mod draw_uniforms;
pub mod gpu_mesh;
pub mod grid;
pub mod highlight;
pub mod render_engine;

pub use highlight::highlight_tint;
pub use render_engine::RenderEngine;
