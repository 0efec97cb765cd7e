//! Depth/opacity weight heuristic.
//!
//! Empirically tuned; the constants must match `oit_surface.wgsl` exactly.

/// Alpha is scaled by this before saturating at one.
pub const ALPHA_SCALE: f32 = 10.0;
/// Added to the saturated alpha so fully transparent texels keep a tiny weight.
pub const ALPHA_BIAS: f32 = 0.01;
/// Exponent applied to both the alpha and depth terms.
pub const WEIGHT_EXPONENT: f32 = 3.0;
pub const WEIGHT_SCALE: f32 = 1e8;
/// Depth falloff; `1 - depth * DEPTH_SCALE` stays positive for depth in [-1, 1].
pub const DEPTH_SCALE: f32 = 0.9;
pub const WEIGHT_MIN: f32 = 1e-2;
pub const WEIGHT_MAX: f32 = 3e3;

/// Weight of a transparent fragment with straight alpha `alpha` at clip-space
/// depth `clip_depth` (`@builtin(position).z`).
///
/// Nearer and more opaque fragments weigh more; the result is clamped to
/// `[WEIGHT_MIN, WEIGHT_MAX]`.
pub fn weight(alpha: f32, clip_depth: f32) -> f32 {
    let a = (alpha * ALPHA_SCALE).min(1.0) + ALPHA_BIAS;
    let d = 1.0 - clip_depth * DEPTH_SCALE;
    (a.powf(WEIGHT_EXPONENT) * WEIGHT_SCALE * d.powf(WEIGHT_EXPONENT)).clamp(WEIGHT_MIN, WEIGHT_MAX)
}
