//! Windowed entry point: event loop, input routing and the frame driver.

use anyhow::Result;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::scancode::PhysicalKeyExtScancode;
use winit::window::WindowId;

use keel_core::{RendererConfig, Timer};
use keel_platform::{button_index, InputState, Window};
use keel_renderer::Renderer;

struct App {
    window: Option<Window>,
    renderer: Option<Renderer>,
    input: InputState,
    timer: Timer,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            renderer: None,
            input: InputState::new(),
            timer: Timer::new(),
        }
    }

    fn toggle_mouse_capture(&mut self) {
        let captured = self.input.toggle_mouse_capture();
        if let Some(ref window) = self.window {
            window.set_mouse_capture(captured);
        }
        info!(captured, "Mouse capture toggled");
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = RendererConfig::default();
        let window = match Window::new(event_loop, config.initial_extent, &config.app_name) {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match Renderer::new(&window, config) {
            Ok(renderer) => {
                info!("Initialization complete, entering main loop");
                self.renderer = Some(renderer);
                self.window = Some(window);
            }
            Err(e) => {
                error!("Failed to create renderer: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                if let Some(mut renderer) = self.renderer.take() {
                    renderer.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(ref mut window) = self.window {
                    window.resize(size.width, size.height);
                }
                if let Some(ref mut renderer) = self.renderer {
                    renderer.on_resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let _delta = self.timer.delta_secs();

                let mut render_failed = false;
                if let Some(ref mut renderer) = self.renderer {
                    if let Err(e) = renderer.render_frame() {
                        error!("Render error, shutting down: {}", e);
                        render_failed = true;
                    }
                }

                // The renderer refuses further frames after a hard error.
                if render_failed {
                    if let Some(mut renderer) = self.renderer.take() {
                        renderer.shutdown();
                    }
                    event_loop.exit();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;

                if event.physical_key == PhysicalKey::Code(KeyCode::Backquote)
                    && pressed
                    && !event.repeat
                {
                    self.toggle_mouse_capture();
                }

                if let Some(scan_code) = event.physical_key.to_scancode() {
                    self.input.set_key(scan_code, pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input
                    .set_button(button_index(button), state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .set_mouse_position(position.x as f32, position.y as f32);
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.input.add_mouse_motion(dx as f32, dy as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.input.begin_pump();
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    keel_core::init_logging();
    info!("Starting Keel");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
