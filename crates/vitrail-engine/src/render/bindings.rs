//! Bind group contract between the host and the WGSL sources.
//!
//! Every `@group(N) @binding(M)` in `shaders/` corresponds to one of the
//! constants below; `shaders::tests` checks the sources against them.

/// Groups of the opaque and transparent surface passes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum SurfaceGroup {
    /// `CameraData` uniform, rebound once per frame.
    Camera = 0,
    /// `ModelMatrices` uniform, rebound per draw.
    Model = 1,
    /// Diffuse texture + sampler.
    Material = 2,
}

/// Groups of the composite pass. Each target has its own sampler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum CompositeGroup {
    Accumulation = 0,
    Revealage = 1,
}

/// Groups of the blit pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub enum BlitGroup {
    Source = 0,
}

impl SurfaceGroup {
    pub const ALL: [Self; 3] = [Self::Camera, Self::Model, Self::Material];

    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

impl CompositeGroup {
    pub const ALL: [Self; 2] = [Self::Accumulation, Self::Revealage];

    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

impl BlitGroup {
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Binding of the uniform buffer inside the camera and model groups.
pub const UNIFORM_BINDING: u32 = 0;
/// Binding of the texture inside a texture + sampler group.
pub const TEXTURE_BINDING: u32 = 0;
/// Binding of the sampler inside a texture + sampler group.
pub const SAMPLER_BINDING: u32 = 1;

/// How a texture + sampler group may be sampled.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sampling {
    /// Filterable float texture with a filtering sampler (diffuse maps).
    Filtering,
    /// Exact texel reads; accepts any float format (OIT targets, blit sources).
    NonFiltering,
}

pub(crate) fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    min_size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: UNIFORM_BINDING,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(min_size),
            },
            count: None,
        }],
    })
}

/// Texture at [`TEXTURE_BINDING`] plus sampler at [`SAMPLER_BINDING`].
pub fn texture_sampler_layout(
    device: &wgpu::Device,
    label: &str,
    sampling: Sampling,
) -> wgpu::BindGroupLayout {
    let filterable = sampling == Sampling::Filtering;
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: TEXTURE_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: SAMPLER_BINDING,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(if filterable {
                    wgpu::SamplerBindingType::Filtering
                } else {
                    wgpu::SamplerBindingType::NonFiltering
                }),
                count: None,
            },
        ],
    })
}

pub(crate) fn texture_sampler_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: TEXTURE_BINDING,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: SAMPLER_BINDING,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

/// Nearest/clamp sampler for exact reads of frame targets.
pub(crate) fn nearest_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

/// Layouts shared by both surface pipelines, in group order.
pub struct SurfaceLayouts {
    pub camera: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
}

impl SurfaceLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        use super::uniforms::{CameraData, ModelMatrices};

        Self {
            camera: uniform_layout(
                device,
                "vitrail camera bgl",
                std::mem::size_of::<CameraData>() as u64,
            ),
            model: uniform_layout(
                device,
                "vitrail model bgl",
                std::mem::size_of::<ModelMatrices>() as u64,
            ),
            material: texture_sampler_layout(device, "vitrail material bgl", Sampling::Filtering),
        }
    }

    /// Layouts ordered by [`SurfaceGroup::index`].
    pub fn ordered(&self) -> [&wgpu::BindGroupLayout; 3] {
        SurfaceGroup::ALL.map(|g| match g {
            SurfaceGroup::Camera => &self.camera,
            SurfaceGroup::Model => &self.model,
            SurfaceGroup::Material => &self.material,
        })
    }
}
