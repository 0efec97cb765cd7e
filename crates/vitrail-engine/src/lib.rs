//! Vitrail engine crate.
//!
//! Weighted-blended order-independent transparency on wgpu: the GPU device
//! layer, the three-pass renderer, a CPU model of the same math, and the
//! window runtime that drives it.

pub mod camera;
pub mod device;
pub mod logging;
pub mod oit;
pub mod render;
pub mod time;
pub mod window;
