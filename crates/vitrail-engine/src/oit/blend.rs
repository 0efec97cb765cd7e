//! CPU evaluation of `wgpu::BlendState`.
//!
//! Follows the WebGPU blending equations for a single pixel. Constant factors
//! use the default blend constant (transparent black); dual-source factors are
//! not modeled and evaluate to zero.

use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState};

/// Blends `src` (fragment output) onto `dst` (current target value).
///
/// Channels are RGBA. A target without an alpha channel can pass any alpha in
/// `dst`; it is simply not stored by the caller.
pub fn apply(state: &BlendState, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let component = if i < 3 { &state.color } else { &state.alpha };
        *slot = blend_channel(component, src, dst, i);
    }
    out
}

fn blend_channel(component: &BlendComponent, src: [f32; 4], dst: [f32; 4], channel: usize) -> f32 {
    let s = src[channel];
    let d = dst[channel];
    let sf = factor(component.src_factor, src, dst, channel);
    let df = factor(component.dst_factor, src, dst, channel);

    match component.operation {
        BlendOperation::Add => s * sf + d * df,
        BlendOperation::Subtract => s * sf - d * df,
        BlendOperation::ReverseSubtract => d * df - s * sf,
        // Min/Max ignore the factors.
        BlendOperation::Min => s.min(d),
        BlendOperation::Max => s.max(d),
    }
}

fn factor(f: BlendFactor, src: [f32; 4], dst: [f32; 4], channel: usize) -> f32 {
    const BLEND_CONSTANT: [f32; 4] = [0.0; 4];

    match f {
        BlendFactor::Zero => 0.0,
        BlendFactor::One => 1.0,
        BlendFactor::Src => src[channel],
        BlendFactor::OneMinusSrc => 1.0 - src[channel],
        BlendFactor::SrcAlpha => src[3],
        BlendFactor::OneMinusSrcAlpha => 1.0 - src[3],
        BlendFactor::Dst => dst[channel],
        BlendFactor::OneMinusDst => 1.0 - dst[channel],
        BlendFactor::DstAlpha => dst[3],
        BlendFactor::OneMinusDstAlpha => 1.0 - dst[3],
        BlendFactor::SrcAlphaSaturated => {
            if channel == 3 {
                1.0
            } else {
                src[3].min(1.0 - dst[3])
            }
        }
        BlendFactor::Constant => BLEND_CONSTANT[channel],
        BlendFactor::OneMinusConstant => 1.0 - BLEND_CONSTANT[channel],
        // Src1, OneMinusSrc1, Src1Alpha, OneMinusSrc1Alpha
        _ => 0.0,
    }
}
