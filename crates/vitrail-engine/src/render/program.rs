//! Shader programs and the fixed-function state each one depends on.
//!
//! A [`Program`] is the unit a pipeline is built from: WGSL source, color
//! targets with their blend states, and depth state. Keeping them together
//! means a shader can never be paired with the wrong blend equation.

use super::blend::{ACCUMULATION_BLEND, COMPOSITE_BLEND, REVEALAGE_BLEND};
use super::{OitConfig, Vertex};

/// Opaque fragments with alpha below this are discarded by the opaque program.
/// Mirrored in `opaque_surface.wgsl`.
pub const OPAQUE_ALPHA_CUTOFF: f32 = 0.999;

pub(crate) const OPAQUE_SURFACE_WGSL: &str = include_str!("shaders/opaque_surface.wgsl");
pub(crate) const OIT_SURFACE_WGSL: &str = include_str!("shaders/oit_surface.wgsl");
pub(crate) const OIT_COMPOSITE_WGSL: &str = include_str!("shaders/oit_composite.wgsl");
pub(crate) const BLIT_WGSL: &str = include_str!("shaders/blit.wgsl");

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Program {
    /// Textured, lit, depth-writing forward pass.
    OpaqueSurface,
    /// Writes weighted accumulation and revealage.
    TransparentSurface,
    /// Full-screen resolve onto the opaque color target.
    Composite,
    /// Full-screen texture copy.
    Blit,
}

/// Formats of every attachment a program may render to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TargetFormats {
    pub color: wgpu::TextureFormat,
    pub accumulation: wgpu::TextureFormat,
    pub revealage: wgpu::TextureFormat,
    pub depth: wgpu::TextureFormat,
}

impl TargetFormats {
    pub fn new(color: wgpu::TextureFormat, config: &OitConfig) -> Self {
        Self {
            color,
            accumulation: config.accumulation_format,
            revealage: config.revealage_format,
            depth: config.depth_format,
        }
    }
}

impl Program {
    pub const ALL: [Self; 4] = [
        Self::OpaqueSurface,
        Self::TransparentSurface,
        Self::Composite,
        Self::Blit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::OpaqueSurface => "vitrail opaque surface",
            Self::TransparentSurface => "vitrail oit surface",
            Self::Composite => "vitrail oit composite",
            Self::Blit => "vitrail blit",
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Self::OpaqueSurface => OPAQUE_SURFACE_WGSL,
            Self::TransparentSurface => OIT_SURFACE_WGSL,
            Self::Composite => OIT_COMPOSITE_WGSL,
            Self::Blit => BLIT_WGSL,
        }
    }

    /// Color targets in `@location` order.
    pub fn color_targets(self, formats: &TargetFormats) -> Vec<Option<wgpu::ColorTargetState>> {
        let target = |format, blend| {
            Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };

        match self {
            Self::OpaqueSurface | Self::Blit => vec![target(formats.color, None)],
            Self::TransparentSurface => vec![
                target(formats.accumulation, Some(ACCUMULATION_BLEND)),
                target(formats.revealage, Some(REVEALAGE_BLEND)),
            ],
            Self::Composite => vec![target(formats.color, Some(COMPOSITE_BLEND))],
        }
    }

    /// Transparent surfaces test against opaque depth but never write it.
    pub fn depth_stencil(self, formats: &TargetFormats) -> Option<wgpu::DepthStencilState> {
        let depth_write_enabled = match self {
            Self::OpaqueSurface => true,
            Self::TransparentSurface => false,
            Self::Composite | Self::Blit => return None,
        };

        Some(wgpu::DepthStencilState {
            format: formats.depth,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        })
    }

    /// Surfaces draw both faces so panes are visible from behind.
    fn primitive(self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        }
    }

    pub fn create_pipeline(
        self,
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        formats: &TargetFormats,
    ) -> wgpu::RenderPipeline {
        let label = self.label();
        log::debug!("creating pipeline `{label}` for {:?}", formats.color);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(self.source().into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts,
            immediate_size: 0,
        });

        let targets = self.color_targets(formats);

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: self.primitive(),
            depth_stencil: self.depth_stencil(formats),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}
