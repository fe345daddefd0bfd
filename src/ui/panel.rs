//! Inspector overlay
//!
//! Lists the keyboard controls, the scene's nodes and the selected node's
//! transform, and lets the transform and spin be edited with sliders.

use crate::gfx::{
    camera::OrbitCamera,
    scene::{NodeKind, Scene, SceneStatistics, Transform, MIN_SCALE},
};

/// Key and action pairs shown in the controls section
pub const CONTROLS_HELP: &[(&str, &str)] = &[
    ("Tab / Shift+Tab", "Select next / previous"),
    ("W / S", "Move along Y"),
    ("D / A", "Move along X"),
    ("Q / E", "Move along Z"),
    ("R / F", "Rotate about X"),
    ("T / G", "Rotate about Y"),
    ("Y / H", "Rotate about Z"),
    ("U / J", "Scale up / down"),
    ("] / [", "Raise / lower spin speed"),
    ("Space", "Toggle animation"),
    ("Enter", "Toggle camera orbit"),
    ("Left / Right", "Orbit camera"),
    ("Up / Down", "Zoom"),
    ("PgUp / PgDn", "Camera height"),
    ("Esc", "Quit"),
];

/// Per-frame values the inspector shows but does not own
pub struct InspectorInfo {
    pub statistics: SceneStatistics,
    pub animating: bool,
    pub fps: f32,
}

pub fn inspector_panel(
    ui: &imgui::Ui,
    scene: &mut Scene,
    camera: &OrbitCamera,
    info: &InspectorInfo,
) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }
    let panel_width = (display_size[0] * 0.28).clamp(300.0, 420.0);

    ui.window("Inspector")
        .size(
            [panel_width, display_size[1] * 0.8],
            imgui::Condition::FirstUseEver,
        )
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .resizable(true)
        .collapsible(true)
        .build(|| {
            render_controls_help(ui);
            render_node_list(ui, scene);
            ui.separator();
            render_selected_node(ui, scene);
            ui.separator();
            render_statistics(ui, camera, info);
        });
}

fn render_controls_help(ui: &imgui::Ui) {
    if ui.collapsing_header("Controls", imgui::TreeNodeFlags::empty()) {
        ui.columns(2, "controls_columns", false);
        for (keys, action) in CONTROLS_HELP {
            ui.text(keys);
            ui.next_column();
            ui.text(action);
            ui.next_column();
        }
        ui.columns(1, "", false);
    }
}

fn render_node_list(ui: &imgui::Ui, scene: &mut Scene) {
    if !ui.collapsing_header("Nodes", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        return;
    }

    if scene.is_empty() {
        ui.text("Scene is empty");
        return;
    }

    let mut clicked = None;
    ui.child_window("node_list")
        .size([0.0, 160.0])
        .border(true)
        .build(|| {
            for &id in scene.selection_order() {
                let Some(node) = scene.node(id) else {
                    continue;
                };
                let label = format!("{}##{}", node.name, id.index());
                if ui
                    .selectable_config(&label)
                    .selected(scene.is_selected(id))
                    .build()
                {
                    clicked = Some(id);
                }
            }
        });

    if let Some(id) = clicked {
        if scene.select(id).is_ok() {
            log::info!("Selected: {}", scene.node(id).map_or("", |n| n.name.as_str()));
        }
    }
}

fn render_selected_node(ui: &imgui::Ui, scene: &mut Scene) {
    let Some(node) = scene.selected_node_mut() else {
        ui.text("Nothing selected");
        return;
    };

    ui.text(format!("Selected: {}", node.name));
    let kind = match (node.kind, node.mesh) {
        (NodeKind::Group, _) => "group",
        (NodeKind::Mesh, Some(_)) => "mesh",
        (NodeKind::Mesh, None) => "mesh (failed to load)",
    };
    ui.text(format!("Kind: {kind}"));
    ui.spacing();

    render_transform_sliders(ui, &mut node.transform);

    if let Some(spin) = node.spin.as_mut() {
        ui.text(format!("Spin axis: {:?}", spin.axis));
        ui.slider("Spin speed", -10.0, 10.0, &mut spin.speed);
    } else {
        ui.text("Not spinning");
    }

    if ui.button("Reset transform") {
        node.transform = Transform::default();
    }
}

fn render_transform_sliders(ui: &imgui::Ui, transform: &mut Transform) {
    if ui.collapsing_header("Position", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        ui.slider("X##pos", -10.0, 10.0, &mut transform.position.x);
        ui.slider("Y##pos", -10.0, 10.0, &mut transform.position.y);
        ui.slider("Z##pos", -10.0, 10.0, &mut transform.position.z);
    }

    if ui.collapsing_header("Rotation", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        ui.slider("X##rot", -180.0, 180.0, &mut transform.rotation.x);
        ui.slider("Y##rot", -180.0, 180.0, &mut transform.rotation.y);
        ui.slider("Z##rot", -180.0, 180.0, &mut transform.rotation.z);
    }

    if ui.collapsing_header("Scale", imgui::TreeNodeFlags::DEFAULT_OPEN) {
        ui.slider("X##scale", MIN_SCALE, 5.0, &mut transform.scale.x);
        ui.slider("Y##scale", MIN_SCALE, 5.0, &mut transform.scale.y);
        ui.slider("Z##scale", MIN_SCALE, 5.0, &mut transform.scale.z);
    }
}

fn render_statistics(ui: &imgui::Ui, camera: &OrbitCamera, info: &InspectorInfo) {
    let stats = &info.statistics;
    ui.columns(2, "stats", false);
    for (label, value) in [
        ("Nodes", stats.node_count.to_string()),
        ("Mesh nodes", stats.mesh_node_count.to_string()),
        ("Cached meshes", stats.mesh_count.to_string()),
        ("Triangles", stats.total_triangles.to_string()),
        ("Animation", if info.animating { "on" } else { "off" }.to_string()),
        ("Camera orbit", if camera.spinning { "on" } else { "off" }.to_string()),
        ("FPS", format!("{:.0}", info.fps)),
    ] {
        ui.text(label);
        ui.next_column();
        ui.text(value);
        ui.next_column();
    }
    ui.columns(1, "", false);
}
