use crate::render::blend::{ACCUMULATION_BLEND, COMPOSITE_BLEND, REVEALAGE_BLEND};
use crate::render::OPAQUE_ALPHA_CUTOFF;

use super::blend::apply;
use super::{weight, ACCUM_ALPHA_EPSILON, REVEALAGE_CLEAR};

/// The two outputs of the transparent surface fragment stage.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceOutputs {
    /// Weighted premultiplied color (location 0).
    pub accumulation: [f32; 4],
    /// Straight alpha, written to the red channel (location 1).
    pub revealage: f32,
}

impl SurfaceOutputs {
    /// Shades a fragment whose straight-alpha color (texel times vertex color)
    /// is `color` at clip-space depth `clip_depth`.
    pub fn shade(color: [f32; 4], clip_depth: f32) -> Self {
        let [r, g, b, a] = color;
        let w = weight(a, clip_depth);
        Self {
            accumulation: [r * a * w, g * a * w, b * a * w, a * w],
            revealage: a,
        }
    }
}

/// One pixel of the accumulation + revealage targets.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OitPixel {
    pub accumulation: [f32; 4],
    pub revealage: f32,
}

impl OitPixel {
    /// State after the per-frame clears.
    pub const CLEARED: Self = Self {
        accumulation: [0.0; 4],
        revealage: REVEALAGE_CLEAR,
    };

    /// Blends one fragment's outputs in, exactly as the pipeline's blend states do.
    pub fn accumulate(&mut self, out: SurfaceOutputs) {
        self.accumulation = apply(&ACCUMULATION_BLEND, out.accumulation, self.accumulation);
        // Single-channel target: only red survives.
        let revealed = apply(
            &REVEALAGE_BLEND,
            [out.revealage, 0.0, 0.0, 1.0],
            [self.revealage, 0.0, 0.0, 1.0],
        );
        self.revealage = revealed[0];
    }

    /// The composite fragment stage. `None` means the fragment is discarded.
    pub fn resolve(&self) -> Option<[f32; 4]> {
        if self.revealage == REVEALAGE_CLEAR {
            return None;
        }

        let [r, g, b, a] = self.accumulation;
        let divisor = a.max(ACCUM_ALPHA_EPSILON);
        Some([r / divisor, g / divisor, b / divisor, 1.0 - self.revealage])
    }
}

impl Default for OitPixel {
    fn default() -> Self {
        Self::CLEARED
    }
}

/// Applies the composite pass output onto the opaque background.
pub fn composite_over(resolved: Option<[f32; 4]>, background: [f32; 4]) -> [f32; 4] {
    match resolved {
        Some(src) => apply(&COMPOSITE_BLEND, src, background),
        None => background,
    }
}

/// One pixel of the whole frame: opaque pass, transparent pass, composite.
///
/// Depth uses the `Less` compare of both surface pipelines; only the opaque
/// pass writes depth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReferencePixel {
    pub color: [f32; 4],
    pub depth: f32,
    pub oit: OitPixel,
}

impl ReferencePixel {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self {
            color: clear_color,
            depth: 1.0,
            oit: OitPixel::CLEARED,
        }
    }

    /// Returns whether the fragment survived the alpha cutoff and depth test.
    pub fn draw_opaque(&mut self, color: [f32; 4], depth: f32) -> bool {
        if color[3] < OPAQUE_ALPHA_CUTOFF || depth >= self.depth {
            return false;
        }
        self.color = color;
        self.depth = depth;
        true
    }

    /// Returns whether the fragment survived the depth test.
    pub fn draw_transparent(&mut self, color: [f32; 4], depth: f32) -> bool {
        if depth >= self.depth {
            return false;
        }
        self.oit.accumulate(SurfaceOutputs::shade(color, depth));
        true
    }

    pub fn resolve(&self) -> [f32; 4] {
        composite_over(self.oit.resolve(), self.color)
    }
}
