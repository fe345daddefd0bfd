//! Declarative scene descriptions
//!
//! A scene is described either by a JSON document or by the built-in room
//! layout. The JSON format looks like:
//!
//! ```json
//! {
//!   "rotationOrder": "zyx",
//!   "root": [
//!     { "name": "table", "type": "mesh", "model": "table.obj",
//!       "pos": [0, 0, 0], "rot": [0, 0, 0], "scale": [1, 1, 1],
//!       "children": [
//!         { "name": "clock", "type": "mesh", "model": "clock.obj",
//!           "isAnimated": true, "speed": 1.0, "spinAxis": "z" }
//!       ] }
//!   ]
//! }
//! ```
//!
//! [`SceneLoader`] turns a [`SceneDescription`] into a [`Scene`], resolving
//! model names through a [`MeshCache`].

use std::path::Path;

use serde::Deserialize;

use crate::{
    error::{SceneError, SceneResult},
    gfx::resources::{dropped_light_count, MAX_LIGHTS},
};

use super::{
    mesh_cache::{MeshCache, MeshLoader},
    node::{NodeId, NodeLight, SceneNode},
    scene::Scene,
    transform::{Axis, RotationOrder, Transform},
};

/// Root of a scene file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    #[serde(default)]
    pub rotation_order: RotationOrder,
    #[serde(default)]
    pub root: Vec<NodeDescription>,
}

/// Kind of node named by the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Group,
    Mesh,
}

/// Light attached to a described node
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LightDescription {
    pub color: [f32; 3],
    #[serde(default)]
    pub offset: [f32; 3],
    #[serde(default = "default_attenuation")]
    pub attenuation: [f32; 3],
}

fn default_attenuation() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

/// One node of a scene file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    #[serde(default)]
    pub pos: [f32; 3],
    #[serde(default)]
    pub rot: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_spin_axis")]
    pub spin_axis: Axis,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub light: Option<LightDescription>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

fn default_name() -> String {
    "Unnamed".to_string()
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_speed() -> f32 {
    1.0
}

fn default_spin_axis() -> Axis {
    Axis::Z
}

impl NodeDescription {
    /// A mesh node at `pos` with identity rotation and unit scale
    pub fn mesh(name: &str, model: &str, pos: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            node_type: NodeType::Mesh,
            pos,
            rot: [0.0; 3],
            scale: default_scale(),
            is_animated: false,
            speed: default_speed(),
            spin_axis: default_spin_axis(),
            model: Some(model.to_string()),
            light: None,
            children: Vec::new(),
        }
    }

    pub fn spinning(mut self, axis: Axis, speed: f32) -> Self {
        self.is_animated = true;
        self.spin_axis = axis;
        self.speed = speed;
        self
    }

    pub fn lit(mut self, light: LightDescription) -> Self {
        self.light = Some(light);
        self
    }

    fn transform(&self) -> Transform {
        Transform::new(self.pos, self.rot, self.scale)
    }
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// The furnished living room used when no scene file is given
    ///
    /// Every object sits at its modelled position with no rotation and unit
    /// scale. The clock spins about -X, the tv glows blue and the lamp orange.
    pub fn default_room() -> Self {
        let tv_light = LightDescription {
            color: [0.2, 0.2, 1.0],
            offset: [0.0, 0.0, 0.5],
            attenuation: [1.0, 0.2, 0.05],
        };
        let lamp_light = LightDescription {
            color: [1.0, 0.7, 0.2],
            offset: [0.0, 0.0, 1.5],
            attenuation: [1.0, 0.1, 0.02],
        };

        Self {
            rotation_order: RotationOrder::Xyz,
            root: vec![
                NodeDescription::mesh("big_sofa", "big_sofa.obj", [-1.854, 0.030, 0.198]),
                NodeDescription::mesh("bookshelf", "bookshelf.obj", [-2.053, -1.771, 0.030]),
                NodeDescription::mesh("cactus", "cactus.obj", [-0.155, -0.131, 0.503]),
                NodeDescription::mesh("carpet", "carpet.obj", [-0.039, 0.244, 0.046]),
                NodeDescription::mesh("clock", "clock.obj", [-2.262, -1.811, 2.082])
                    .spinning(Axis::X, -1.0),
                NodeDescription::mesh("lamp", "lamp.obj", [-1.829, 1.863, 0.088]).lit(lamp_light),
                NodeDescription::mesh("shelf", "shelf.obj", [-2.181, 0.072, 1.499]),
                NodeDescription::mesh("sofa", "sofa.obj", [-0.077, 1.839, 0.336]),
                NodeDescription::mesh("table", "table.obj", [-0.285, -0.104, 0.048]),
                NodeDescription::mesh("tv", "tv.obj", [2.026, 0.132, 0.720]).lit(tv_light),
                NodeDescription::mesh("walls", "walls.obj", [-0.178, 2.213, 1.590]),
            ],
        }
    }
}

/// Builds scenes from descriptions, sharing one mesh cache
pub struct SceneLoader<'a> {
    meshes: &'a mut MeshCache,
    loader: &'a dyn MeshLoader,
}

impl<'a> SceneLoader<'a> {
    pub fn new(meshes: &'a mut MeshCache, loader: &'a dyn MeshLoader) -> Self {
        Self { meshes, loader }
    }

    /// Builds every node in `description` and selects the first selectable node
    ///
    /// Meshes that fail to load are logged and their nodes are kept without geometry.
    pub fn load(&mut self, description: &SceneDescription) -> Scene {
        let mut scene = Scene::new(description.rotation_order);
        for node in &description.root {
            self.add_node(&mut scene, None, node);
        }
        scene.reset_selection();

        let light_count = scene.lights().len();
        if dropped_light_count(light_count) > 0 {
            log::warn!(
                "{light_count} point lights in scene, only the first {MAX_LIGHTS} are used"
            );
        }

        log::info!(
            "Scene loaded: {} nodes, {} meshes",
            scene.len(),
            self.meshes.len()
        );
        scene
    }

    fn add_node(&mut self, scene: &mut Scene, parent: Option<NodeId>, desc: &NodeDescription) {
        let mut node = SceneNode::new(desc.name.clone()).with_transform(desc.transform());

        if desc.node_type == NodeType::Mesh {
            let mesh = match desc.model.as_deref() {
                Some(model) => match self.meshes.get_or_load(model, self.loader) {
                    Ok(id) => Some(id),
                    Err(err) => {
                        log::warn!("Node '{}' will be drawn without geometry: {}", desc.name, err);
                        None
                    }
                },
                None => {
                    log::warn!("Mesh node '{}' has no model", desc.name);
                    None
                }
            };
            node = node.with_mesh(mesh);
        }

        if desc.is_animated {
            node = node.with_spin(desc.spin_axis, desc.speed);
        }

        if let Some(light) = desc.light {
            node = node.with_light(NodeLight {
                color: light.color,
                offset: light.offset.into(),
                attenuation: light.attenuation,
            });
        }

        let id = match parent {
            Some(parent) => match scene.add_child(parent, node) {
                Ok(id) => id,
                Err(err) => {
                    log::warn!("Skipping node '{}': {}", desc.name, err);
                    return;
                }
            },
            None => scene.add_root(node),
        };

        for child in &desc.children {
            self.add_node(scene, Some(id), child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::mesh_cache::tests::FakeLoader;
    use crate::gfx::scene::node::NodeKind;
    use approx::assert_relative_eq;

    const HIERARCHY: &str = r#"{
        "root": [
            {
                "name": "desk",
                "type": "mesh",
                "model": "desk.obj",
                "pos": [1, 2, 3],
                "children": [
                    { "name": "clock", "type": "mesh", "model": "clock.obj",
                      "isAnimated": true, "speed": 2.5, "spinAxis": "x" },
                    { "name": "other_clock", "type": "mesh", "model": "clock.obj" }
                ]
            },
            { "name": "holder" },
            { "type": "mesh", "model": "missing.obj", "scale": [2, 2, 2] }
        ]
    }"#;

    #[test]
    fn json_defaults_are_filled_in() {
        let desc = SceneDescription::from_json_str(HIERARCHY).unwrap();
        assert_eq!(desc.rotation_order, RotationOrder::Xyz);
        assert_eq!(desc.root.len(), 3);

        let holder = &desc.root[1];
        assert_eq!(holder.node_type, NodeType::Group);
        assert_eq!(holder.scale, [1.0, 1.0, 1.0]);
        assert!(!holder.is_animated);
        assert_relative_eq!(holder.speed, 1.0);

        assert_eq!(desc.root[2].name, "Unnamed");
        assert_eq!(desc.root[0].children[0].spin_axis, Axis::X);
    }

    #[test]
    fn rotation_order_can_be_chosen() {
        let desc = SceneDescription::from_json_str(r#"{ "rotationOrder": "zyx" }"#).unwrap();
        assert_eq!(desc.rotation_order, RotationOrder::Zyx);
        assert!(desc.root.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = SceneDescription::from_json_str(r#"{ "root": [ { "pos": "up" } ] }"#).unwrap_err();
        assert!(matches!(err, SceneError::Json(_)));
    }

    #[test]
    fn missing_scene_file_is_an_io_error() {
        let err = SceneDescription::from_file("/definitely/not/here/scene.json").unwrap_err();
        assert!(matches!(err, SceneError::Io { .. }));
    }

    #[test]
    fn loader_builds_hierarchy_and_shares_meshes() {
        let desc = SceneDescription::from_json_str(HIERARCHY).unwrap();
        let fake = FakeLoader::default();
        let mut cache = MeshCache::new();
        let scene = SceneLoader::new(&mut cache, &fake).load(&desc);

        assert_eq!(scene.len(), 5);
        assert_eq!(scene.roots().len(), 3);
        // clock.obj requested twice but loaded once; missing.obj failed
        assert_eq!(cache.len(), 2);
        assert_eq!(
            *fake.calls.borrow(),
            vec!["desk.obj", "clock.obj", "missing.obj"]
        );

        let desk = scene.find("desk").unwrap();
        let clock = scene.find("clock").unwrap();
        let other = scene.find("other_clock").unwrap();
        assert_eq!(scene.node(desk).unwrap().children(), &[clock, other]);
        assert_eq!(scene.node(clock).unwrap().parent(), Some(desk));
        assert_eq!(scene.node(clock).unwrap().mesh, scene.node(other).unwrap().mesh);

        let spin = scene.node(clock).unwrap().spin.unwrap();
        assert_eq!(spin.axis, Axis::X);
        assert_relative_eq!(spin.speed, 2.5);

        let broken = scene.find("Unnamed").unwrap();
        let broken_node = scene.node(broken).unwrap();
        assert_eq!(broken_node.kind, NodeKind::Mesh);
        assert!(broken_node.mesh.is_none());

        // first in selection order: the desk's first child
        assert_eq!(scene.selected(), Some(clock));
        // only nodes with geometry are drawn
        assert_eq!(scene.draw_list().len(), 3);
    }

    #[test]
    fn bundled_demo_scene_parses() {
        let desc =
            SceneDescription::from_json_str(include_str!("../../../demos/scene.json")).unwrap();
        assert_eq!(desc.rotation_order, RotationOrder::Zyx);

        let fake = FakeLoader::default();
        let mut cache = MeshCache::new();
        let scene = SceneLoader::new(&mut cache, &fake).load(&desc);
        assert!(scene.find("cactus").is_some());
        assert!(!scene.lights().is_empty());
    }

    #[test]
    fn scenes_may_carry_more_lights_than_the_shader_uses() {
        let desc = SceneDescription::from_json_str(
            r#"{ "root": [
                { "name": "a", "light": { "color": [1, 1, 1] } },
                { "name": "b", "light": { "color": [1, 1, 1] } },
                { "name": "c", "light": { "color": [1, 1, 1] } },
                { "name": "d", "light": { "color": [1, 1, 1] } },
                { "name": "e", "light": { "color": [1, 1, 1] } },
                { "name": "f", "light": { "color": [1, 1, 1] } }
            ] }"#,
        )
        .unwrap();
        let fake = FakeLoader::default();
        let mut cache = MeshCache::new();
        let scene = SceneLoader::new(&mut cache, &fake).load(&desc);

        assert_eq!(scene.lights().len(), 6);
        assert_eq!(dropped_light_count(scene.lights().len()), 2);
    }

    #[test]
    fn default_room_is_a_flat_list_with_lights() {
        let desc = SceneDescription::default_room();
        assert_eq!(desc.root.len(), 11);
        assert!(desc.root.iter().all(|n| n.children.is_empty()));

        let fake = FakeLoader::default();
        let mut cache = MeshCache::new();
        let scene = SceneLoader::new(&mut cache, &fake).load(&desc);

        assert_eq!(scene.selected(), scene.find("big_sofa"));
        assert_eq!(scene.lights().len(), 2);
        let clock = scene.node(scene.find("clock").unwrap()).unwrap();
        assert_eq!(clock.spin.unwrap().axis, Axis::X);
        assert_relative_eq!(clock.spin.unwrap().speed, -1.0);
    }
}
