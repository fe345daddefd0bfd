use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Mouse orbit: left-drag turns and raises the camera, the wheel zooms
pub struct CameraController {
    pub rotate_speed: f32,
    pub raise_speed: f32,
    pub zoom_speed: f32,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, raise_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            raise_speed,
            zoom_speed,
            is_mouse_pressed: false,
        }
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / 20.0
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    camera.add_angle(-delta.0 as f32 * self.rotate_speed);
                    camera.add_height(delta.1 as f32 * self.raise_speed);
                }
            }
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn drag_only_orbits_while_pressed() {
        let mut controller = CameraController::new(0.005, 0.02, 0.5);
        let mut camera = OrbitCamera::default();

        controller.process_events(&DeviceEvent::MouseMotion { delta: (-100.0, 0.0) }, &mut camera);
        assert_relative_eq!(camera.angle, 0.0);

        controller.process_events(
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
            &mut camera,
        );
        controller.process_events(&DeviceEvent::MouseMotion { delta: (-100.0, 50.0) }, &mut camera);
        assert_relative_eq!(camera.angle, 0.5, epsilon = 1e-5);
        assert_relative_eq!(camera.height, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn wheel_zooms() {
        let mut controller = CameraController::new(0.005, 0.02, 0.5);
        let mut camera = OrbitCamera::default();
        controller.process_events(
            &DeviceEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(0.0, 2.0),
            },
            &mut camera,
        );
        assert_relative_eq!(camera.distance, 14.0);
    }
}
