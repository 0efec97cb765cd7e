use anyhow::Result;

use super::RenderCtx;

/// Which kinds of texels a texture contains.
///
/// Decides which passes a material is drawn in: opaque texels go through the
/// opaque pass, translucent ones through the OIT pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct AlphaCoverage {
    /// At least one texel has alpha < 255.
    pub translucent: bool,
    /// At least one texel has alpha == 255.
    pub opaque: bool,
}

impl AlphaCoverage {
    pub const OPAQUE: Self = Self {
        translucent: false,
        opaque: true,
    };

    /// Scans the alpha channel of tightly packed RGBA8 data.
    pub fn scan(rgba8: &[u8]) -> Self {
        let mut coverage = Self::default();
        for alpha in rgba8.chunks_exact(4).map(|px| px[3]) {
            if alpha < u8::MAX {
                coverage.translucent = true;
            } else {
                coverage.opaque = true;
            }
            if coverage.translucent && coverage.opaque {
                break;
            }
        }
        coverage
    }
}

/// A sampled 2D texture with its view and sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
    pub coverage: AlphaCoverage,
}

impl Texture {
    /// Uploads straight-alpha sRGB RGBA8 pixels (row-major, no padding).
    pub fn from_rgba8(
        ctx: &RenderCtx<'_>,
        label: &str,
        rgba8: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "texture `{label}` has zero size");
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            rgba8.len() == expected,
            "texture `{label}`: expected {expected} bytes for {width}x{height}, got {}",
            rgba8.len()
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba8,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let coverage = AlphaCoverage::scan(rgba8);
        log::trace!("texture `{label}` {width}x{height} coverage {coverage:?}");

        Ok(Self {
            texture,
            view,
            sampler,
            size: (width, height),
            coverage,
        })
    }
}

/// Offscreen color target that can later be sampled (e.g. by the blit pass).
pub struct RenderTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub size: (u32, u32),
}

impl RenderTexture {
    pub fn new(ctx: &RenderCtx<'_>, label: &str, format: wgpu::TextureFormat, size: (u32, u32)) -> Self {
        let (texture, view) = create_attachment(
            ctx.device,
            label,
            format,
            size,
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        );
        Self {
            texture,
            view,
            format,
            size,
        }
    }
}

/// Creates a single-sample 2D attachment. Zero dimensions are bumped to one.
pub(crate) fn create_attachment(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    (width, height): (u32, u32),
    usage: wgpu::TextureUsages,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
