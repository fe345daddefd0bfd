//! Keyboard editing
//!
//! Key presses are mapped to [`EditorCommand`]s by [`KeyBindings`] and then
//! applied to the scene and camera by [`InputController`]. Keeping the two
//! apart lets the command logic run without a window.

use log::{debug, info};
use winit::keyboard::KeyCode;

use crate::config::ControlSettings;
use crate::gfx::camera::OrbitCamera;
use crate::gfx::scene::{Axis, Scene};

/// Direction of an incremental edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn apply(self, amount: f32) -> f32 {
        match self {
            Sign::Positive => amount,
            Sign::Negative => -amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    SelectNext,
    SelectPrevious,
    ToggleAnimation,
    ToggleCameraSpin,
    Move(Axis, Sign),
    Rotate(Axis, Sign),
    Scale(Sign),
    AdjustSpin(Sign),
    Orbit(Sign),
    /// Positive moves the camera closer
    Zoom(Sign),
    Raise(Sign),
    Exit,
}

impl EditorCommand {
    /// Commands that edit the selected node and do nothing without one
    pub fn needs_selection(self) -> bool {
        matches!(
            self,
            EditorCommand::Move(..)
                | EditorCommand::Rotate(..)
                | EditorCommand::Scale(_)
                | EditorCommand::AdjustSpin(_)
        )
    }
}

/// Fixed keyboard layout
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyBindings;

impl KeyBindings {
    pub fn command_for(&self, key: KeyCode, shift: bool) -> Option<EditorCommand> {
        use EditorCommand::*;
        use Sign::*;

        let command = match key {
            KeyCode::Tab if shift => SelectPrevious,
            KeyCode::Tab => SelectNext,
            KeyCode::Space => ToggleAnimation,
            KeyCode::Enter | KeyCode::NumpadEnter => ToggleCameraSpin,

            KeyCode::KeyW => Move(Axis::Y, Positive),
            KeyCode::KeyS => Move(Axis::Y, Negative),
            KeyCode::KeyD => Move(Axis::X, Positive),
            KeyCode::KeyA => Move(Axis::X, Negative),
            KeyCode::KeyQ => Move(Axis::Z, Positive),
            KeyCode::KeyE => Move(Axis::Z, Negative),

            KeyCode::KeyR => Rotate(Axis::X, Positive),
            KeyCode::KeyF => Rotate(Axis::X, Negative),
            KeyCode::KeyT => Rotate(Axis::Y, Positive),
            KeyCode::KeyG => Rotate(Axis::Y, Negative),
            KeyCode::KeyY => Rotate(Axis::Z, Positive),
            KeyCode::KeyH => Rotate(Axis::Z, Negative),

            KeyCode::KeyU => Scale(Positive),
            KeyCode::KeyJ => Scale(Negative),
            KeyCode::BracketRight => AdjustSpin(Positive),
            KeyCode::BracketLeft => AdjustSpin(Negative),

            KeyCode::ArrowLeft => Orbit(Negative),
            KeyCode::ArrowRight => Orbit(Positive),
            KeyCode::ArrowUp => Zoom(Positive),
            KeyCode::ArrowDown => Zoom(Negative),
            KeyCode::PageUp => Raise(Positive),
            KeyCode::PageDown => Raise(Negative),

            KeyCode::Escape => Exit,
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Handled,
    Ignored,
    Exit,
}

/// Whether node spin animation advances each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    pub enabled: bool,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AnimationState {
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}

pub struct InputController {
    pub bindings: KeyBindings,
    pub settings: ControlSettings,
    pub animation: AnimationState,
}

impl InputController {
    pub fn new(settings: ControlSettings, animation: AnimationState) -> Self {
        Self {
            bindings: KeyBindings,
            settings,
            animation,
        }
    }

    /// Maps a key press and applies it
    pub fn handle_key(
        &mut self,
        key: KeyCode,
        shift: bool,
        scene: &mut Scene,
        camera: &mut OrbitCamera,
    ) -> CommandOutcome {
        match self.bindings.command_for(key, shift) {
            Some(command) => self.apply(command, scene, camera),
            None => CommandOutcome::Ignored,
        }
    }

    pub fn apply(
        &mut self,
        command: EditorCommand,
        scene: &mut Scene,
        camera: &mut OrbitCamera,
    ) -> CommandOutcome {
        let step = self.settings;

        if command.needs_selection() {
            let Some(id) = scene.selected() else {
                return CommandOutcome::Ignored;
            };

            if let EditorCommand::AdjustSpin(sign) = command {
                return match scene.adjust_spin(id, sign.apply(step.spin_step)) {
                    Ok(speed) => {
                        debug!("Spin speed of {:?} is now {speed:.2}", id);
                        CommandOutcome::Handled
                    }
                    Err(_) => CommandOutcome::Ignored,
                };
            }

            let Some(node) = scene.node_mut(id) else {
                return CommandOutcome::Ignored;
            };
            match command {
                EditorCommand::Move(axis, sign) => {
                    node.transform.translate(axis, sign.apply(step.move_step))
                }
                EditorCommand::Rotate(axis, sign) => {
                    node.transform.rotate(axis, sign.apply(step.rotate_step))
                }
                EditorCommand::Scale(sign) => {
                    node.transform.scale_uniform(sign.apply(step.scale_step))
                }
                _ => return CommandOutcome::Ignored,
            }
            return CommandOutcome::Handled;
        }

        match command {
            EditorCommand::SelectNext | EditorCommand::SelectPrevious => {
                let selected = if command == EditorCommand::SelectNext {
                    scene.select_next()
                } else {
                    scene.select_previous()
                };
                match selected.and_then(|id| scene.node(id)) {
                    Some(node) => {
                        info!("Selected: {}", node.name);
                        CommandOutcome::Handled
                    }
                    None => CommandOutcome::Ignored,
                }
            }
            EditorCommand::ToggleAnimation => {
                let enabled = self.animation.toggle();
                info!("Animation {}", if enabled { "on" } else { "off" });
                CommandOutcome::Handled
            }
            EditorCommand::ToggleCameraSpin => {
                let spinning = camera.toggle_spin();
                info!("Camera orbit {}", if spinning { "on" } else { "off" });
                CommandOutcome::Handled
            }
            EditorCommand::Orbit(sign) => {
                camera.add_angle(sign.apply(step.orbit_step));
                CommandOutcome::Handled
            }
            EditorCommand::Zoom(sign) => {
                camera.add_distance(-sign.apply(step.zoom_step));
                CommandOutcome::Handled
            }
            EditorCommand::Raise(sign) => {
                camera.add_height(sign.apply(step.height_step));
                CommandOutcome::Handled
            }
            EditorCommand::Exit => CommandOutcome::Exit,
            _ => CommandOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{SceneNode, Transform};
    use approx::assert_relative_eq;

    fn two_node_scene() -> Scene {
        let mut scene = Scene::default();
        let table = scene.add_root(SceneNode::new("table"));
        scene
            .add_child(
                table,
                SceneNode::new("lamp").with_transform(Transform::new(
                    [1.0, 0.0, 0.0],
                    [0.0; 3],
                    [1.0; 3],
                )),
            )
            .unwrap();
        scene
    }

    fn controller() -> InputController {
        InputController::new(ControlSettings::default(), AnimationState::default())
    }

    #[test]
    fn layout_matches_keys() {
        let keys = KeyBindings;
        assert_eq!(
            keys.command_for(KeyCode::Tab, false),
            Some(EditorCommand::SelectNext)
        );
        assert_eq!(
            keys.command_for(KeyCode::Tab, true),
            Some(EditorCommand::SelectPrevious)
        );
        assert_eq!(
            keys.command_for(KeyCode::KeyS, false),
            Some(EditorCommand::Move(Axis::Y, Sign::Negative))
        );
        assert_eq!(
            keys.command_for(KeyCode::KeyY, false),
            Some(EditorCommand::Rotate(Axis::Z, Sign::Positive))
        );
        assert_eq!(
            keys.command_for(KeyCode::BracketLeft, false),
            Some(EditorCommand::AdjustSpin(Sign::Negative))
        );
        assert_eq!(
            keys.command_for(KeyCode::Escape, false),
            Some(EditorCommand::Exit)
        );
        assert_eq!(keys.command_for(KeyCode::KeyZ, false), None);
    }

    #[test]
    fn edits_without_selection_are_ignored() {
        let mut scene = two_node_scene();
        let mut camera = OrbitCamera::default();
        let mut input = controller();

        let outcome = input.apply(
            EditorCommand::Move(Axis::X, Sign::Positive),
            &mut scene,
            &mut camera,
        );
        assert_eq!(outcome, CommandOutcome::Ignored);
        for (_, node) in scene.iter() {
            assert!(node.spin.is_none());
        }
    }

    #[test]
    fn editing_changes_only_the_selected_node() {
        let mut scene = two_node_scene();
        let mut camera = OrbitCamera::default();
        let mut input = controller();

        // children come first in selection order
        input.handle_key(KeyCode::Tab, false, &mut scene, &mut camera);
        let lamp = scene.find("lamp").unwrap();
        let table = scene.find("table").unwrap();
        assert_eq!(scene.selected(), Some(lamp));

        input.handle_key(KeyCode::KeyD, false, &mut scene, &mut camera);
        input.handle_key(KeyCode::KeyR, false, &mut scene, &mut camera);
        input.handle_key(KeyCode::KeyJ, false, &mut scene, &mut camera);

        let node = scene.node(lamp).unwrap();
        assert_relative_eq!(node.transform.position.x, 1.2, epsilon = 1e-6);
        assert_relative_eq!(node.transform.rotation.x, 5.0);
        assert_relative_eq!(node.transform.scale.x, 0.95, epsilon = 1e-6);
        assert_eq!(scene.node(table).unwrap().transform, Transform::default());
    }

    #[test]
    fn spin_keys_adjust_speed() {
        let mut scene = two_node_scene();
        let mut camera = OrbitCamera::default();
        let mut input = controller();
        scene.select_next();

        input.handle_key(KeyCode::BracketRight, false, &mut scene, &mut camera);
        input.handle_key(KeyCode::BracketRight, false, &mut scene, &mut camera);
        let spin = scene.selected_node().unwrap().spin.unwrap();
        assert_eq!(spin.axis, Axis::Z);
        assert_relative_eq!(spin.speed, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn spin_keys_shift_the_signed_speed_of_a_reverse_spin() {
        let mut scene = Scene::default();
        scene.add_root(SceneNode::new("clock").with_spin(Axis::X, -1.0));
        scene.reset_selection();
        let mut camera = OrbitCamera::default();
        let mut input = controller();

        input.handle_key(KeyCode::BracketRight, false, &mut scene, &mut camera);
        let spin = scene.selected_node().unwrap().spin.unwrap();
        assert_eq!(spin.axis, Axis::X);
        assert_relative_eq!(spin.speed, -0.9, epsilon = 1e-6);

        input.handle_key(KeyCode::BracketLeft, false, &mut scene, &mut camera);
        input.handle_key(KeyCode::BracketLeft, false, &mut scene, &mut camera);
        let spin = scene.selected_node().unwrap().spin.unwrap();
        assert_relative_eq!(spin.speed, -1.1, epsilon = 1e-6);
    }

    #[test]
    fn toggles_and_camera_commands() {
        let mut scene = two_node_scene();
        let mut camera = OrbitCamera::default();
        let mut input = controller();

        assert!(input.animation.enabled);
        input.handle_key(KeyCode::Space, false, &mut scene, &mut camera);
        assert!(!input.animation.enabled);

        input.handle_key(KeyCode::Enter, false, &mut scene, &mut camera);
        assert!(camera.spinning);

        input.handle_key(KeyCode::ArrowUp, false, &mut scene, &mut camera);
        assert_relative_eq!(camera.distance, 14.5);
        input.handle_key(KeyCode::PageDown, false, &mut scene, &mut camera);
        assert_relative_eq!(camera.height, 4.5);
        input.handle_key(KeyCode::ArrowRight, false, &mut scene, &mut camera);
        assert_relative_eq!(camera.angle, 0.1);

        assert_eq!(
            input.handle_key(KeyCode::Escape, false, &mut scene, &mut camera),
            CommandOutcome::Exit
        );
        assert_eq!(
            input.handle_key(KeyCode::F12, false, &mut scene, &mut camera),
            CommandOutcome::Ignored
        );
    }

    #[test]
    fn selecting_in_an_empty_scene_is_ignored() {
        let mut scene = Scene::default();
        let mut camera = OrbitCamera::default();
        let mut input = controller();
        assert_eq!(
            input.apply(EditorCommand::SelectNext, &mut scene, &mut camera),
            CommandOutcome::Ignored
        );
    }
}
