use cgmath::{Vector3, Zero};
use log::{error, info, warn};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::{PathSettings, ViewerConfig},
    gfx::{
        camera::{camera_utils::CameraManager, CameraController, OrbitCamera},
        rendering::{highlight_tint, RenderEngine},
        scene::{MeshCache, ObjMeshLoader, Scene, SceneDescription, SceneLoader},
    },
    input::{AnimationState, CommandOutcome, InputController},
    ui::{inspector_panel, InputCapture, InspectorInfo, UiManager},
};

/// Longest frame step fed to animation, so a stall does not cause a jump
const MAX_FRAME_DT: f32 = 0.1;

/// Seconds of animation to run for a frame that took `elapsed`
fn frame_step(elapsed: Duration) -> f32 {
    elapsed.as_secs_f32().min(MAX_FRAME_DT)
}

/// Builds the scene named by `paths`, or the built-in room when none is set
///
/// Meshes that fail to load are logged and their nodes kept without geometry.
pub fn load_scene(paths: &PathSettings) -> anyhow::Result<(Scene, MeshCache)> {
    let description = match &paths.scene {
        Some(path) => {
            info!("Loading scene {}", path.display());
            SceneDescription::from_file(path)?
        }
        None => {
            info!("No scene file given, using the built-in room");
            SceneDescription::default_room()
        }
    };

    let obj_loader = ObjMeshLoader::new(&paths.model_dir);
    let mut meshes = MeshCache::new();
    let scene = SceneLoader::new(&mut meshes, &obj_loader).load(&description);
    Ok((scene, meshes))
}

pub struct RoomViewApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    meshes: MeshCache,
    camera_manager: CameraManager,
    input: InputController,
    shift_held: bool,
    started: Instant,
    last_frame: Instant,
    fps: f32,
    fatal: Option<anyhow::Error>,
}

impl RoomViewApp {
    pub fn new(config: ViewerConfig, scene: Scene, meshes: MeshCache) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new()?;

        let camera_settings = config.camera;
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let mut camera = OrbitCamera::new(
            camera_settings.angle,
            camera_settings.distance,
            camera_settings.height,
            Vector3::zero(),
            aspect,
        );
        camera.spin_speed = camera_settings.spin_speed;
        let controller = CameraController::new(
            camera_settings.mouse_rotate_speed,
            camera_settings.mouse_raise_speed,
            camera_settings.mouse_zoom_speed,
        );

        let input = InputController::new(
            config.controls,
            AnimationState {
                enabled: config.render.animate_on_start,
            },
        );

        let now = Instant::now();
        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                scene,
                meshes,
                camera_manager: CameraManager::new(camera, controller),
                input,
                shift_held: false,
                started: now,
                last_frame: now,
                fps: 0.0,
                fatal: None,
            },
        })
    }

    /// Runs the event loop until the window closes or Escape is pressed
    pub fn run(mut self) -> anyhow::Result<()> {
        let Some(event_loop) = self.event_loop.take() else {
            anyhow::bail!("Event loop already consumed");
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_settings = &self.config.window;
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(window_settings.title.clone())
                    .with_inner_size(LogicalSize::new(
                        window_settings.width,
                        window_settings.height,
                    )),
            )?,
        );

        let (width, height) = window.inner_size().into();
        self.camera_manager.camera.resize_projection(width, height);

        let settings = self.config.render;
        let texture_dir = self.config.paths.texture_dir.clone();
        let window_clone = window.clone();
        let mut renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, settings, texture_dir).await
        })?;
        renderer.sync_meshes(&self.meshes);

        if settings.show_inspector {
            self.ui_manager = Some(UiManager::new(
                renderer.device(),
                renderer.queue(),
                renderer.surface_format(),
                &window,
            ));
        }

        self.render_engine = Some(renderer);
        self.window = Some(window);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(render_engine), Some(window)) =
            (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };

        let now = Instant::now();
        let dt = frame_step(now - self.last_frame);
        self.last_frame = now;
        if dt > 0.0 {
            self.fps = self.fps * 0.9 + (1.0 / dt) * 0.1;
        }

        if self.input.animation.enabled {
            self.scene.animate(dt);
        }
        self.camera_manager.update(dt);

        render_engine.sync_meshes(&self.meshes);
        render_engine.update(self.camera_manager.camera.uniform, &self.scene.lights());

        let elapsed = (now - self.started).as_secs_f32();
        let highlight = highlight_tint(elapsed, self.config.render.highlight);

        let result = if let Some(ui_manager) = self.ui_manager.as_mut() {
            let info = InspectorInfo {
                statistics: self.scene.statistics(&self.meshes),
                animating: self.input.animation.enabled,
                fps: self.fps,
            };
            let scene = &mut self.scene;
            let camera = &self.camera_manager.camera;
            ui_manager.update_logic(window, |ui| inspector_panel(ui, scene, camera, &info));

            render_engine.render_frame(
                &self.scene,
                highlight,
                Some(
                    |device: &wgpu::Device,
                     queue: &wgpu::Queue,
                     encoder: &mut wgpu::CommandEncoder,
                     view: &wgpu::TextureView| {
                        ui_manager.render_display_only(device, queue, encoder, view);
                    },
                ),
            )
        } else {
            render_engine.render_frame(
                &self.scene,
                highlight,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            )
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(err) => warn!("Skipped frame: {err}"),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let PhysicalKey::Code(key_code) = event.physical_key else {
            return;
        };

        let outcome = self.input.handle_key(
            key_code,
            self.shift_held,
            &mut self.scene,
            &mut self.camera_manager.camera,
        );
        if outcome == CommandOutcome::Exit {
            info!("Exit requested");
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init_graphics(event_loop) {
            error!("Failed to start renderer: {err:#}");
            self.fatal = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Overlay sees input first
        let capture = match self.ui_manager.as_mut() {
            Some(ui_manager) => ui_manager.handle_input(&window, window_id, &event),
            None => InputCapture::default(),
        };

        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_held = modifiers.state().shift_key();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if capture.allows_editor_keys() {
                    self.handle_key(event_loop, &event);
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self.window.is_none() {
            return;
        }

        // Don't drag the camera while the pointer is over the overlay, but
        // let a release through so a drag that ends there still stops
        let releases_button = matches!(
            event,
            DeviceEvent::Button {
                state: ElementState::Released,
                ..
            }
        );
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if !ui_manager.capture().allows_camera() && !releases_button {
                return;
            }
        }

        self.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{transform::Axis, SceneNode};
    use approx::assert_relative_eq;

    #[test]
    fn short_frames_pass_through() {
        assert_relative_eq!(frame_step(Duration::from_millis(16)), 0.016, epsilon = 1e-6);
        assert_relative_eq!(frame_step(Duration::ZERO), 0.0);
    }

    #[test]
    fn stalled_frame_advances_animation_by_the_cap() {
        let mut scene = Scene::default();
        let clock = scene.add_root(SceneNode::new("clock").with_spin(Axis::Z, 1.0));

        let dt = frame_step(Duration::from_secs(2));
        assert_relative_eq!(dt, MAX_FRAME_DT);

        scene.animate(dt);
        // one degree per tick, six ticks in a tenth of a second
        let rotation = scene.node(clock).unwrap().transform.rotation.z;
        assert_relative_eq!(rotation, 6.0, epsilon = 1e-4);
    }
}
