//! Scene graph nodes
//!
//! Nodes live in the [`Scene`](super::scene::Scene) arena and refer to each
//! other through [`NodeId`] handles, so the tree can be walked top-down for
//! rendering and a single node can be borrowed mutably for editing.

use cgmath::Vector3;

use super::mesh_cache::MeshId;
use super::transform::{Axis, Transform};

/// Animation steps per second of frame time
///
/// Spin speeds are expressed in degrees per step.
pub const TICKS_PER_SECOND: f32 = 60.0;

/// Handle to a node inside a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a node is only a transform or also draws geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    Group,
    Mesh,
}

/// Continuous rotation about one local axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub axis: Axis,
    /// Degrees per animation tick; negative values spin backwards
    pub speed: f32,
}

/// Point light carried by a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeLight {
    pub color: [f32; 3],
    /// Position of the light in the node's local space
    pub offset: Vector3<f32>,
    /// Constant, linear and quadratic attenuation factors
    pub attenuation: [f32; 3],
}

/// A transform with optional geometry, animation and light
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub mesh: Option<MeshId>,
    pub spin: Option<Spin>,
    pub light: Option<NodeLight>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    /// Creates a group node with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group,
            transform: Transform::default(),
            mesh: None,
            spin: None,
            light: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Marks the node as a mesh node; `mesh` is `None` when the geometry failed to load
    pub fn with_mesh(mut self, mesh: Option<MeshId>) -> Self {
        self.kind = NodeKind::Mesh;
        self.mesh = mesh;
        self
    }

    pub fn with_spin(mut self, axis: Axis, speed: f32) -> Self {
        self.spin = Some(Spin { axis, speed });
        self
    }

    pub fn with_light(mut self, light: NodeLight) -> Self {
        self.light = Some(light);
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Advances the spin animation by `dt` seconds
    pub fn animate(&mut self, dt: f32) {
        if let Some(spin) = self.spin {
            self.transform
                .rotate(spin.axis, spin.speed * dt * TICKS_PER_SECOND);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn spin_advances_one_step_per_tick() {
        let mut node = SceneNode::new("clock").with_spin(Axis::X, -1.0);
        node.animate(1.0 / TICKS_PER_SECOND);
        node.animate(1.0 / TICKS_PER_SECOND);
        assert_relative_eq!(node.transform.rotation.x, -2.0, epsilon = 1e-5);
        assert_relative_eq!(node.transform.rotation.z, 0.0);
    }

    #[test]
    fn nodes_without_spin_stay_put() {
        let mut node = SceneNode::new("table");
        node.animate(10.0);
        assert_eq!(node.transform, Transform::default());
    }

    #[test]
    fn mesh_nodes_may_lack_geometry() {
        let node = SceneNode::new("broken").with_mesh(None);
        assert_eq!(node.kind, NodeKind::Mesh);
        assert!(node.mesh.is_none());
    }
}
