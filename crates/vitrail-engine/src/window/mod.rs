//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, and wires them to the
//! GPU layer and an [`App`].

mod runtime;

pub use runtime::{App, AppControl, FrameCtx, PointerInput, Runtime, RuntimeConfig};
