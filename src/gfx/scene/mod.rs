//! # Scene Management Module
//!
//! The scene graph: nodes with local transforms arranged in a tree, the mesh
//! cache they draw from, and the loader that builds both from a description.
//!
//! ## Key Components
//!
//! - [`Scene`] - Node arena, world transform composition, traversal and selection
//! - [`SceneNode`] - A transform with optional mesh, spin animation and light
//! - [`MeshCache`] - Name-keyed store of loaded geometry
//! - [`SceneLoader`] - Builds a [`Scene`] from a [`SceneDescription`]
//! - [`Vertex3D`] - Vertex layout shared with the renderer
//!
//! ## Usage
//!
//! ```no_run
//! use roomview::gfx::scene::{MeshCache, ObjMeshLoader, SceneDescription, SceneLoader};
//!
//! let obj_loader = ObjMeshLoader::new("models");
//! let mut meshes = MeshCache::new();
//! let description = SceneDescription::from_file("scene.json").unwrap();
//! let mut scene = SceneLoader::new(&mut meshes, &obj_loader).load(&description);
//!
//! scene.select_next();
//! for item in scene.draw_list() {
//!     // item.world places meshes.get(item.mesh) in world space
//! }
//! ```

pub mod loader;
pub mod mesh_cache;
pub mod node;
pub mod scene;
pub mod transform;
pub mod vertex;

// Re-export main types
pub use loader::{NodeDescription, SceneDescription, SceneLoader};
pub use mesh_cache::{MeshCache, MeshData, MeshId, MeshLoader, ObjMeshLoader};
pub use node::{NodeId, NodeKind, NodeLight, SceneNode, Spin};
pub use scene::{DrawItem, PointLight, Scene, SceneStatistics};
pub use transform::{Axis, RotationOrder, Transform, MIN_SCALE};
pub use vertex::{LineVertex, Vertex3D};
