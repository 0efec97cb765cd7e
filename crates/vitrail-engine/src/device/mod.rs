//! Window-bound wgpu device.
//!
//! [`Gpu`] owns the surface and hands out one [`GpuFrame`] per redraw; the
//! renderers only ever see the [`RenderCtx`](crate::render::RenderCtx) it builds.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
