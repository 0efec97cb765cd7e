use anyhow::{ensure, Result};

/// Formats and clear color used by [`OitRenderer`](super::OitRenderer).
#[derive(Debug, Clone, Copy)]
pub struct OitConfig {
    /// Four-channel float target, blended additively.
    pub accumulation_format: wgpu::TextureFormat,
    /// Single-channel float target, blended multiplicatively.
    pub revealage_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// Opaque pass clear; what shows where nothing is drawn.
    pub clear_color: wgpu::Color,
}

impl Default for OitConfig {
    fn default() -> Self {
        Self {
            accumulation_format: wgpu::TextureFormat::Rgba16Float,
            revealage_format: wgpu::TextureFormat::R16Float,
            depth_format: wgpu::TextureFormat::Depth32Float,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.07,
                a: 1.0,
            },
        }
    }
}

impl OitConfig {
    /// Checks that the formats can carry the OIT blend equations.
    ///
    /// Only guaranteed format features are consulted, so a format that needs
    /// an optional device feature is rejected.
    pub fn validate(&self) -> Result<()> {
        check_float_target(self.accumulation_format, 4, "accumulation")?;
        check_float_target(self.revealage_format, 1, "revealage")?;
        ensure!(
            self.depth_format.has_depth_aspect(),
            "depth format {:?} has no depth aspect",
            self.depth_format
        );
        Ok(())
    }
}

fn check_float_target(format: wgpu::TextureFormat, components: u8, what: &str) -> Result<()> {
    ensure!(
        format.components() == components,
        "{what} format {format:?} must have {components} channel(s)"
    );
    ensure!(
        matches!(
            format.sample_type(None, None),
            Some(wgpu::TextureSampleType::Float { .. })
        ),
        "{what} format {format:?} must be sampled as float"
    );

    let features = format.guaranteed_format_features(wgpu::Features::empty());
    ensure!(
        features.allowed_usages.contains(
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
        ),
        "{what} format {format:?} must be renderable and sampleable"
    );
    ensure!(
        features.flags.contains(wgpu::TextureFormatFeatureFlags::BLENDABLE),
        "{what} format {format:?} is not blendable"
    );
    Ok(())
}
