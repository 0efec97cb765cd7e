use super::bindings::{texture_sampler_bind_group, SurfaceLayouts};
use super::{AlphaCoverage, RenderCtx, Texture};

/// How a material's translucent texels are selected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Blending {
    /// Derived from the texture: opaque texels in the opaque pass, translucent
    /// texels in the OIT pass.
    Auto,
    /// Always drawn by the OIT pass, even when the texture has no translucent
    /// texels. Opaque texels still go through the opaque pass.
    Translucent,
}

/// Which passes draw a material.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Passes {
    pub opaque: bool,
    pub transparent: bool,
}

impl Passes {
    /// Opaque texels must reach the depth-writing pass whatever the blending
    /// mode; otherwise they would be averaged with the layers behind them.
    pub const fn route(coverage: AlphaCoverage, blending: Blending) -> Self {
        Self {
            opaque: coverage.opaque,
            transparent: coverage.translucent || matches!(blending, Blending::Translucent),
        }
    }
}

/// Diffuse texture binding (surface group 2) plus pass routing.
pub struct SurfaceMaterial {
    pub(crate) bind_group: wgpu::BindGroup,
    passes: Passes,
}

impl SurfaceMaterial {
    pub fn new(ctx: &RenderCtx<'_>, layouts: &SurfaceLayouts, diffuse: &Texture, blending: Blending) -> Self {
        let bind_group = texture_sampler_bind_group(
            ctx.device,
            "vitrail material bind group",
            &layouts.material,
            &diffuse.view,
            &diffuse.sampler,
        );

        Self {
            bind_group,
            passes: Passes::route(diffuse.coverage, blending),
        }
    }

    pub fn passes(&self) -> Passes {
        self.passes
    }

    /// Drawn by the opaque pass.
    pub fn has_opaque_pixels(&self) -> bool {
        self.passes.opaque
    }

    /// Drawn by the transparent (OIT) pass.
    pub fn has_transparent_pixels(&self) -> bool {
        self.passes.transparent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oit::ReferencePixel;

    const TRANSLUCENT_ONLY: AlphaCoverage = AlphaCoverage {
        translucent: true,
        opaque: false,
    };
    const MIXED: AlphaCoverage = AlphaCoverage {
        translucent: true,
        opaque: true,
    };

    #[test]
    fn opaque_texture_draws_in_opaque_pass_only() {
        let passes = Passes::route(AlphaCoverage::OPAQUE, Blending::Auto);
        assert_eq!(passes, Passes { opaque: true, transparent: false });
    }

    #[test]
    fn translucent_texture_draws_in_oit_pass_only() {
        let passes = Passes::route(TRANSLUCENT_ONLY, Blending::Auto);
        assert_eq!(passes, Passes { opaque: false, transparent: true });
    }

    #[test]
    fn mixed_texture_draws_in_both_passes() {
        let passes = Passes::route(MIXED, Blending::Auto);
        assert_eq!(passes, Passes { opaque: true, transparent: true });
    }

    #[test]
    fn forced_translucent_keeps_opaque_texels_in_opaque_pass() {
        let passes = Passes::route(AlphaCoverage::OPAQUE, Blending::Translucent);
        assert_eq!(passes, Passes { opaque: true, transparent: true });

        let passes = Passes::route(TRANSLUCENT_ONLY, Blending::Translucent);
        assert_eq!(passes, Passes { opaque: false, transparent: true });
    }

    #[test]
    fn forced_translucent_opaque_texel_keeps_its_color() {
        let wall = [0.9, 0.1, 0.4, 1.0];
        let glass = [0.0, 1.0, 0.0, 0.5];
        let passes = Passes::route(AlphaCoverage::OPAQUE, Blending::Translucent);

        let mut px = ReferencePixel::new([0.0, 0.0, 0.0, 1.0]);
        if passes.opaque {
            px.draw_opaque(wall, 0.2);
        }
        // Both passes draw the wall: the OIT copy fails the depth test it wrote.
        assert!(passes.transparent);
        assert!(!px.draw_transparent(wall, 0.2));
        assert!(!px.draw_transparent(glass, 0.6));

        assert_eq!(px.resolve(), wall);
    }
}
