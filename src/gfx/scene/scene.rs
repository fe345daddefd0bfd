//! Node arena with parent/child links
//!
//! World matrices are composed top-down from each node's local transform.
//! Selection cycles through nodes children first.

use cgmath::{Matrix4, Point3, SquareMatrix, Transform as _};

use crate::error::{SceneError, SceneResult};

use super::{
    mesh_cache::{MeshCache, MeshId},
    node::{NodeId, SceneNode, Spin},
    transform::{Axis, RotationOrder},
};

/// One mesh to draw this frame, with its accumulated world matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub mesh: MeshId,
    pub world: Matrix4<f32>,
    pub highlighted: bool,
}

/// A node light resolved into world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub attenuation: [f32; 3],
}

/// Scene graph: a forest of nodes plus the current selection
///
/// A flat scene is simply one whose nodes are all roots.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
    rotation_order: RotationOrder,
    selection_order: Vec<NodeId>,
    selected: Option<NodeId>,
}

impl Scene {
    pub fn new(rotation_order: RotationOrder) -> Self {
        Self {
            rotation_order,
            ..Default::default()
        }
    }

    pub fn rotation_order(&self) -> RotationOrder {
        self.rotation_order
    }

    /// Adds a top-level node
    pub fn add_root(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        self.roots.push(id);
        self.rebuild_selection_order();
        id
    }

    /// Adds `node` as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> SceneResult<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        self.rebuild_selection_order();
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// First node with the given name, in insertion order
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(NodeId)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    // Transforms

    pub fn local_transform(&self, id: NodeId) -> SceneResult<Matrix4<f32>> {
        self.node(id)
            .map(|n| n.transform.matrix(self.rotation_order))
            .ok_or(SceneError::UnknownNode(id))
    }

    /// Composes the local matrices from the root down to `id`
    pub fn world_transform(&self, id: NodeId) -> SceneResult<Matrix4<f32>> {
        let mut world = self.local_transform(id)?;
        let mut parent = self.nodes[id.0].parent;
        while let Some(p) = parent {
            world = self.local_transform(p)? * world;
            parent = self.nodes[p.0].parent;
        }
        Ok(world)
    }

    /// Visits every node top-down with its world matrix
    ///
    /// Parents are visited before their children, siblings in insertion order.
    pub fn walk<F>(&self, mut visitor: F)
    where
        F: FnMut(NodeId, &SceneNode, &Matrix4<f32>),
    {
        let identity = Matrix4::identity();
        for &root in &self.roots {
            self.walk_from(root, &identity, &mut visitor);
        }
    }

    fn walk_from<F>(&self, id: NodeId, parent_world: &Matrix4<f32>, visitor: &mut F)
    where
        F: FnMut(NodeId, &SceneNode, &Matrix4<f32>),
    {
        let node = &self.nodes[id.0];
        let world = *parent_world * node.transform.matrix(self.rotation_order);
        visitor(id, node, &world);
        for &child in &node.children {
            self.walk_from(child, &world, visitor);
        }
    }

    /// Everything that needs a draw call this frame, in traversal order
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        self.walk(|id, node, world| {
            if let Some(mesh) = node.mesh {
                items.push(DrawItem {
                    node: id,
                    mesh,
                    world: *world,
                    highlighted: self.selected == Some(id),
                });
            }
        });
        items
    }

    /// Node lights placed in world space
    pub fn lights(&self) -> Vec<PointLight> {
        let mut lights = Vec::new();
        self.walk(|_, node, world| {
            if let Some(light) = node.light {
                let p = world.transform_point(Point3::new(
                    light.offset.x,
                    light.offset.y,
                    light.offset.z,
                ));
                lights.push(PointLight {
                    position: [p.x, p.y, p.z],
                    color: light.color,
                    attenuation: light.attenuation,
                });
            }
        });
        lights
    }

    // Selection

    fn rebuild_selection_order(&mut self) {
        let mut order = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.post_order(root, &mut order);
        }
        self.selection_order = order;
    }

    fn post_order(&self, id: NodeId, order: &mut Vec<NodeId>) {
        for &child in &self.nodes[id.0].children {
            self.post_order(child, order);
        }
        order.push(id);
    }

    /// Nodes in the order TAB cycles through them (children before their parent)
    pub fn selection_order(&self) -> &[NodeId] {
        &self.selection_order
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&SceneNode> {
        self.selected.and_then(|id| self.node(id))
    }

    pub fn selected_node_mut(&mut self) -> Option<&mut SceneNode> {
        let id = self.selected?;
        self.node_mut(id)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected == Some(id)
    }

    /// Selects the first node in selection order, or nothing if the scene is empty
    pub fn reset_selection(&mut self) {
        self.selected = self.selection_order.first().copied();
    }

    pub fn select(&mut self, id: NodeId) -> SceneResult<()> {
        if id.0 >= self.nodes.len() {
            return Err(SceneError::UnknownNode(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// Moves the selection forward, wrapping at the end
    pub fn select_next(&mut self) -> Option<NodeId> {
        self.step_selection(1)
    }

    /// Moves the selection backward, wrapping at the start
    pub fn select_previous(&mut self) -> Option<NodeId> {
        self.step_selection(-1)
    }

    fn step_selection(&mut self, step: isize) -> Option<NodeId> {
        let len = self.selection_order.len();
        if len == 0 {
            return None;
        }
        let current = self
            .selected
            .and_then(|id| self.selection_order.iter().position(|&n| n == id));
        let next = match current {
            Some(pos) => (pos as isize + step).rem_euclid(len as isize) as usize,
            None => 0,
        };
        self.selected = Some(self.selection_order[next]);
        self.selected
    }

    // Animation

    /// Advances every spinning node by `dt` seconds
    pub fn animate(&mut self, dt: f32) {
        for node in &mut self.nodes {
            node.animate(dt);
        }
    }

    /// Adds `delta` to a node's signed spin speed, giving it a Z spin if it had none
    pub fn adjust_spin(&mut self, id: NodeId, delta: f32) -> SceneResult<f32> {
        let node = self.node_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let spin = node.spin.get_or_insert(Spin {
            axis: Axis::Z,
            speed: 0.0,
        });
        spin.speed += delta;
        Ok(spin.speed)
    }

    pub fn statistics(&self, meshes: &MeshCache) -> SceneStatistics {
        let mesh_nodes = self.nodes.iter().filter_map(|n| n.mesh);
        SceneStatistics {
            node_count: self.nodes.len(),
            mesh_node_count: mesh_nodes.clone().count(),
            mesh_count: meshes.len(),
            total_triangles: mesh_nodes
                .filter_map(|id| meshes.get(id))
                .map(|m| m.triangle_count())
                .sum(),
        }
    }
}

/// Scene statistics for the inspector overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub mesh_node_count: usize,
    pub mesh_count: usize,
    pub total_triangles: usize,
}
