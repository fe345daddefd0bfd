//! Error types for scene loading and editing
//!
//! Loading a scene touches the filesystem, the OBJ parser, the JSON parser and
//! the image decoder. Each of those failures is folded into [`SceneError`] so
//! callers can decide whether to skip the offending item or abort.

use std::path::PathBuf;

use crate::gfx::scene::node::NodeId;

/// Errors produced while building or editing a scene
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Reading a file from disk failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scene description was not valid JSON or had the wrong shape
    #[error("invalid scene description: {0}")]
    Json(#[from] serde_json::Error),

    /// The OBJ parser rejected a mesh file
    #[error("failed to load mesh '{name}': {source}")]
    Obj {
        name: String,
        #[source]
        source: tobj::LoadError,
    },

    /// A mesh file parsed but contained no triangles
    #[error("mesh '{0}' contains no geometry")]
    EmptyMesh(String),

    /// A texture could not be decoded
    #[error("failed to load texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A node handle did not refer to a node in this scene
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),
}

/// Convenience result alias used throughout the scene modules
pub type SceneResult<T> = Result<T, SceneError>;
