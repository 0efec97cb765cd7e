//! CPU model of weighted-blended OIT.
//!
//! Mirrors `oit_surface.wgsl`, `oit_composite.wgsl` and the fixed-function
//! blend states the pipelines bind, one pixel at a time. The renderer never
//! calls into this module; it exists so the numerical behavior of the GPU
//! path can be checked and debugged on the CPU.

pub mod blend;
mod pixel;
mod weight;

pub use pixel::{composite_over, OitPixel, ReferencePixel, SurfaceOutputs};
pub use weight::{
    weight, ALPHA_BIAS, ALPHA_SCALE, DEPTH_SCALE, WEIGHT_EXPONENT, WEIGHT_MAX, WEIGHT_MIN,
    WEIGHT_SCALE,
};

/// Lower bound for the accumulated alpha divisor in the composite pass.
pub const ACCUM_ALPHA_EPSILON: f32 = 1e-5;

/// Revealage clear value; a pixel still holding it was never touched.
pub const REVEALAGE_CLEAR: f32 = 1.0;
