//! ImGui integration with wgpu and winit
//!
//! Frame timing, input capture and drawing of the inspector overlay.

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use log::warn;
use std::time::Instant;
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

/// What the overlay has claimed from the last event it saw
///
/// Hovering the panel claims the mouse only; a focused text or slider widget
/// claims the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputCapture {
    pub keyboard: bool,
    pub mouse: bool,
}

impl InputCapture {
    fn from_io(io: &imgui::Io) -> Self {
        Self {
            keyboard: io.want_capture_keyboard,
            mouse: io.want_capture_mouse,
        }
    }

    /// Whether editor key bindings should see key presses
    pub fn allows_editor_keys(self) -> bool {
        !self.keyboard
    }

    /// Whether mouse drags and the wheel should reach the camera
    pub fn allows_camera(self) -> bool {
        !self.mouse
    }
}

pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Creates the ImGui context with DPI locked to 1.0
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: 18.0,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    /// Feeds a window event to ImGui and returns what the overlay now holds
    pub fn handle_input(
        &mut self,
        window: &Window,
        window_id: WindowId,
        event: &WindowEvent,
    ) -> InputCapture {
        match event {
            WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseInput { .. }
            | WindowEvent::MouseWheel { .. }
            | WindowEvent::KeyboardInput { .. }
            | WindowEvent::ModifiersChanged(_)
            | WindowEvent::Focused(_)
            | WindowEvent::Resized(_) => {
                let ui_event: Event<()> = Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                self.platform
                    .handle_event(self.context.io_mut(), window, &ui_event);
                self.capture()
            }
            _ => self.capture(),
        }
    }

    pub fn capture(&self) -> InputCapture {
        InputCapture::from_io(self.context.io())
    }

    /// Builds this frame's UI and returns what the overlay wants to capture
    pub fn update_logic<F>(&mut self, window: &Window, run_ui: F) -> InputCapture
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(err) = self.platform.prepare_frame(self.context.io_mut(), window) {
            warn!("Failed to prepare UI frame: {err:?}");
        }

        let ui = self.context.frame();
        run_ui(ui);

        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        self.capture()
    }

    /// Draws the UI built by the last [`update_logic`](Self::update_logic) on
    /// top of `color_attachment`
    pub fn render_display_only(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        color_attachment: &TextureView,
    ) {
        let draw_data = self.context.render();

        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imgui_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // keep the scene underneath
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(err) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            warn!("Failed to render UI: {err:?}");
        }
    }
}
