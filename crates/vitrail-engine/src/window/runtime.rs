use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuInit};
use crate::time::{FrameClock, FrameTime};

/// Logical pixels per wheel line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub gpu: GpuInit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "vitrail".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            gpu: GpuInit::default(),
        }
    }
}

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Pointer input forwarded to [`App::on_pointer`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerInput {
    /// Cursor moved while the left button is held, in logical pixels.
    Drag { dx: f32, dy: f32 },
    /// Wheel scrolled; positive lines scroll up (away from the user).
    Scroll { lines: f32 },
}

/// Per-frame context passed to [`App::on_frame`].
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

/// Application contract driven by [`Runtime`].
pub trait App {
    /// Called once after the window and GPU exist. An error ends the run.
    fn init(&mut self, gpu: &Gpu<'_>) -> Result<()>;

    /// Called for key presses (repeats excluded).
    fn on_key(&mut self, key: KeyCode) -> AppControl {
        let _ = key;
        AppControl::Continue
    }

    /// Called for drags and wheel scrolls.
    fn on_pointer(&mut self, input: PointerInput) {
        let _ = input;
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}

/// Single-window event loop.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            app,
            window: None,
            pointer: PointerState::default(),
            error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Cursor tracking for drag deltas.
#[derive(Debug, Default)]
struct PointerState {
    position: Option<LogicalPosition<f32>>,
    dragging: bool,
}

impl PointerState {
    /// Records the new position; returns a drag delta when the button is held.
    fn moved(&mut self, position: LogicalPosition<f32>) -> Option<PointerInput> {
        let previous = self.position.replace(position)?;
        self.dragging.then(|| PointerInput::Drag {
            dx: position.x - previous.x,
            dy: position.y - previous.y,
        })
    }
}

fn scroll_lines(delta: MouseScrollDelta, scale_factor: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => p.to_logical::<f32>(scale_factor).y / PIXELS_PER_LINE,
    }
}

struct AppState<A: App> {
    config: RuntimeConfig,
    app: A,
    window: Option<WindowEntry>,
    pointer: PointerState,
    /// First fatal error; returned from `Runtime::run`.
    error: Option<anyhow::Error>,
}

impl<A: App> AppState<A> {
    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()?;

        entry
            .with_gpu(|gpu| self.app.init(gpu))
            .context("application init failed")?;
        entry.with_window(|w| w.request_redraw());

        self.window = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> AppControl {
        let Some(entry) = self.window.as_mut() else {
            return AppControl::Continue;
        };

        let app = &mut self.app;
        entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: fields.window,
                gpu: fields.gpu,
                time,
            };
            app.on_frame(&mut ctx)
        })
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.create_window_entry(event_loop) {
            self.fail(event_loop, err.context("failed to create initial window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // The camera orbits, so redraw continuously.
        if let Some(entry) = self.window.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if self.app.on_key(code) == AppControl::Exit {
                        event_loop.exit();
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let Some(entry) = self.window.as_ref() else { return };
                let scale = entry.with_window(|w| w.scale_factor());
                if let Some(input) = self.pointer.moved(position.to_logical(scale)) {
                    self.app.on_pointer(input);
                }
            }

            WindowEvent::CursorLeft { .. } => {
                self.pointer = PointerState::default();
            }

            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.pointer.dragging = state == ElementState::Pressed;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let Some(entry) = self.window.as_ref() else { return };
                let scale = entry.with_window(|w| w.scale_factor());
                self.app.on_pointer(PointerInput::Scroll {
                    lines: scroll_lines(delta, scale),
                });
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
