use anyhow::Result;
use glam::Vec3;
use winit::keyboard::KeyCode;

use vitrail_engine::camera::Camera;
use vitrail_engine::device::{Gpu, SurfaceErrorAction};
use vitrail_engine::render::{BlitRenderer, OitConfig, OitRenderer, RenderTarget};

use vitrail_engine::window::{App, AppControl, FrameCtx, PointerInput};

use crate::scene::Scene;

const ORBIT_RADIUS: f32 = 7.0;
const ORBIT_HEIGHT: f32 = 3.0;
/// Radians per second.
const ORBIT_SPEED: f32 = 0.35;

/// Radians per logical pixel of horizontal drag.
const DRAG_YAW: f32 = 0.01;
/// World units per logical pixel of vertical drag.
const DRAG_HEIGHT: f32 = 0.02;
const HEIGHT_RANGE: (f32, f32) = (-1.0, 8.0);
/// Radius scale per wheel line.
const ZOOM_STEP: f32 = 0.9;
const RADIUS_RANGE: (f32, f32) = (2.5, 20.0);

/// What is presented to the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DebugView {
    Final,
    Accumulation,
    Revealage,
}

/// Input-driven state, independent of the GPU.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub view: DebugView,
    pub paused: bool,
    pub orbit_angle: f32,
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Scene time in seconds; stops while paused.
    pub time: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view: DebugView::Final,
            paused: false,
            orbit_angle: 0.0,
            orbit_radius: ORBIT_RADIUS,
            orbit_height: ORBIT_HEIGHT,
            time: 0.0,
        }
    }
}

impl ViewState {
    pub fn handle_key(&mut self, key: KeyCode) -> AppControl {
        match key {
            KeyCode::Digit1 => self.view = DebugView::Final,
            KeyCode::Digit2 => self.view = DebugView::Accumulation,
            KeyCode::Digit3 => self.view = DebugView::Revealage,
            KeyCode::Space => self.paused = !self.paused,
            KeyCode::Escape => return AppControl::Exit,
            _ => return AppControl::Continue,
        }
        log::info!("view {:?}, paused {}", self.view, self.paused);
        AppControl::Continue
    }

    /// Drag orbits and raises the camera; the wheel zooms toward the target.
    pub fn handle_pointer(&mut self, input: PointerInput) {
        match input {
            PointerInput::Drag { dx, dy } => {
                self.orbit_angle = (self.orbit_angle - dx * DRAG_YAW).rem_euclid(std::f32::consts::TAU);
                self.orbit_height =
                    (self.orbit_height + dy * DRAG_HEIGHT).clamp(HEIGHT_RANGE.0, HEIGHT_RANGE.1);
            }
            PointerInput::Scroll { lines } => {
                self.orbit_radius =
                    (self.orbit_radius * ZOOM_STEP.powf(lines)).clamp(RADIUS_RANGE.0, RADIUS_RANGE.1);
            }
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.time += dt;
        self.orbit_angle = (self.orbit_angle + dt * ORBIT_SPEED) % std::f32::consts::TAU;
    }

    pub fn camera(&self) -> Camera {
        let (s, c) = self.orbit_angle.sin_cos();
        Camera::perspective(
            Vec3::new(self.orbit_radius * s, self.orbit_height, self.orbit_radius * c),
            Vec3::new(0.0, 1.0, 0.0),
            50.0,
        )
    }
}

struct GpuState {
    renderer: OitRenderer,
    blit: BlitRenderer,
    scene: Scene,
}

#[derive(Default)]
pub struct Viewer {
    state: ViewState,
    gpu: Option<GpuState>,
}

impl App for Viewer {
    fn init(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let renderer = OitRenderer::new(gpu.device(), OitConfig::default())?;
        let scene = Scene::new(&gpu.render_ctx(), renderer.layouts())?;
        self.gpu = Some(GpuState {
            renderer,
            blit: BlitRenderer::new(),
            scene,
        });
        log::info!("keys: 1 final, 2 accumulation, 3 revealage, space pause, esc quit");
        log::info!("mouse: drag to orbit, wheel to zoom");
        Ok(())
    }

    fn on_key(&mut self, key: KeyCode) -> AppControl {
        self.state.handle_key(key)
    }

    fn on_pointer(&mut self, input: PointerInput) {
        self.state.handle_pointer(input);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.state.advance(ctx.time.dt);

        let Some(state) = self.gpu.as_mut() else {
            return AppControl::Continue;
        };
        let size = ctx.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let mut frame = match ctx.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match ctx.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        let rctx = ctx.gpu.render_ctx();
        let camera = self.state.camera().data(rctx.aspect());
        let draws = state.scene.draw_list(self.state.time);
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            state.renderer.render(&rctx, &mut target, &camera, &draws);
        }

        let debug_source = state.renderer.targets().and_then(|t| match self.state.view {
            DebugView::Final => None,
            DebugView::Accumulation => Some(&t.accumulation),
            DebugView::Revealage => Some(&t.revealage),
        });
        if let Some(source) = debug_source {
            state.blit.blit(&rctx, &mut frame.encoder, source, &frame.view);
        }

        ctx.gpu.submit(frame);
        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_select_views() {
        let mut state = ViewState::default();
        state.handle_key(KeyCode::Digit2);
        assert_eq!(state.view, DebugView::Accumulation);
        state.handle_key(KeyCode::Digit3);
        assert_eq!(state.view, DebugView::Revealage);
        state.handle_key(KeyCode::Digit1);
        assert_eq!(state.view, DebugView::Final);
    }

    #[test]
    fn escape_exits() {
        let mut state = ViewState::default();
        assert_eq!(state.handle_key(KeyCode::Escape), AppControl::Exit);
        assert_eq!(state.handle_key(KeyCode::KeyQ), AppControl::Continue);
    }

    #[test]
    fn pause_freezes_orbit_and_time() {
        let mut state = ViewState::default();
        state.advance(1.0);
        let angle = state.orbit_angle;
        assert!(angle > 0.0);

        state.handle_key(KeyCode::Space);
        state.advance(1.0);
        assert_eq!(state.orbit_angle, angle);
        assert_eq!(state.time, 1.0);
    }

    #[test]
    fn camera_stays_on_orbit() {
        let mut state = ViewState::default();
        state.advance(3.0);
        let p = state.camera().position;
        let radius = (p.x * p.x + p.z * p.z).sqrt();
        assert!((radius - ORBIT_RADIUS).abs() < 1e-4);
        assert_eq!(p.y, ORBIT_HEIGHT);
    }

    #[test]
    fn drag_orbits_and_raises_camera() {
        let mut state = ViewState::default();
        state.handle_pointer(PointerInput::Drag { dx: -100.0, dy: 50.0 });
        assert!((state.orbit_angle - 1.0).abs() < 1e-5);
        assert!((state.orbit_height - (ORBIT_HEIGHT + 1.0)).abs() < 1e-5);

        let p = state.camera().position;
        let radius = (p.x * p.x + p.z * p.z).sqrt();
        assert!((radius - ORBIT_RADIUS).abs() < 1e-4);
    }

    #[test]
    fn drag_height_is_clamped() {
        let mut state = ViewState::default();
        state.handle_pointer(PointerInput::Drag { dx: 0.0, dy: -10_000.0 });
        assert_eq!(state.orbit_height, HEIGHT_RANGE.0);
    }

    #[test]
    fn wheel_zooms_within_limits() {
        let mut state = ViewState::default();
        state.handle_pointer(PointerInput::Scroll { lines: 1.0 });
        assert!(state.orbit_radius < ORBIT_RADIUS);

        state.handle_pointer(PointerInput::Scroll { lines: 100.0 });
        assert_eq!(state.orbit_radius, RADIUS_RANGE.0);
        state.handle_pointer(PointerInput::Scroll { lines: -100.0 });
        assert_eq!(state.orbit_radius, RADIUS_RANGE.1);
    }
}
