//! GPU resource management
//!
//! Textures, uniform buffers and bind groups shared across pipelines.

pub mod global_bindings;
pub mod texture_resource;

pub use global_bindings::{
    dropped_light_count, update_global_ubo, GlobalBindings, GlobalUBO, MAX_LIGHTS,
};
pub use texture_resource::TextureResource;
