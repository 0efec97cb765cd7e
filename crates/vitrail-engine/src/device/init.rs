/// How [`Gpu::new`](super::Gpu::new) picks and configures the device and surface.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the instance may use.
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,

    /// Choose an sRGB swapchain format when the surface offers one. Diffuse
    /// textures are decoded from sRGB and shading happens in linear space.
    pub prefer_srgb: bool,
    pub present_mode: wgpu::PresentMode,
    /// Replaced by a supported mode when the surface rejects it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Blendable `Rgba16Float` and `R16Float` targets are core WebGPU, so the
    /// OIT passes need nothing here.
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
