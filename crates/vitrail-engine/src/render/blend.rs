//! Fixed-function blend states of the OIT passes.
//!
//! These are half of each pass's contract: `oit_surface.wgsl` writes values
//! that are only meaningful under `ACCUMULATION_BLEND` / `REVEALAGE_BLEND`,
//! and `oit_composite.wgsl` emits straight alpha for `COMPOSITE_BLEND`.
//! [`Program`](super::Program) binds them together with the shader source.

use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState};

const ADDITIVE: BlendComponent = BlendComponent {
    src_factor: BlendFactor::One,
    dst_factor: BlendFactor::One,
    operation: BlendOperation::Add,
};

/// `dst += src` on all four channels.
pub const ACCUMULATION_BLEND: BlendState = BlendState {
    color: ADDITIVE,
    alpha: ADDITIVE,
};

/// `dst *= 1 - src.r`.
///
/// The fragment writes its alpha into the red channel, so after every layer
/// the target holds the product of `(1 - alpha)`. The revealage target has no
/// alpha channel; its alpha component is a plain replace.
pub const REVEALAGE_BLEND: BlendState = BlendState {
    color: BlendComponent {
        src_factor: BlendFactor::Zero,
        dst_factor: BlendFactor::OneMinusSrc,
        operation: BlendOperation::Add,
    },
    alpha: BlendComponent::REPLACE,
};

/// Standard straight-alpha "over": `(SrcAlpha, OneMinusSrcAlpha)`.
pub const COMPOSITE_BLEND: BlendState = BlendState::ALPHA_BLENDING;

/// Accumulation starts from zero every frame.
pub const ACCUMULATION_CLEAR: wgpu::Color = wgpu::Color::TRANSPARENT;

/// Revealage starts fully revealed every frame.
pub const REVEALAGE_CLEAR: wgpu::Color = wgpu::Color {
    r: crate::oit::REVEALAGE_CLEAR as f64,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};
