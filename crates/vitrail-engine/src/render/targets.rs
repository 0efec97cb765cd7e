use super::texture::create_attachment;
use super::OitConfig;

/// Per-frame intermediate targets: accumulation, revealage and depth.
///
/// Sized to the drawable; contents never carry over between frames (each
/// pass clears what it owns).
pub struct OitTargets {
    pub accumulation: wgpu::TextureView,
    pub revealage: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    size: (u32, u32),
    // Views keep their textures alive, but holding them makes ownership explicit.
    _textures: [wgpu::Texture; 3],
}

impl OitTargets {
    pub fn new(device: &wgpu::Device, config: &OitConfig, size: (u32, u32)) -> Self {
        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;

        let (accum_tex, accumulation) = create_attachment(
            device,
            "vitrail oit accumulation",
            config.accumulation_format,
            size,
            sampled,
        );
        let (reveal_tex, revealage) = create_attachment(
            device,
            "vitrail oit revealage",
            config.revealage_format,
            size,
            sampled,
        );
        let (depth_tex, depth) = create_attachment(
            device,
            "vitrail depth",
            config.depth_format,
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        log::debug!("oit targets allocated at {}x{}", size.0, size.1);

        Self {
            accumulation,
            revealage,
            depth,
            size,
            _textures: [accum_tex, reveal_tex, depth_tex],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}
