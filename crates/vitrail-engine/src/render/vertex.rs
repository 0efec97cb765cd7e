use bytemuck::{Pod, Zeroable};

/// Vertex shared by every pipeline.
///
/// `color` is unused by the OIT math beyond modulating the texel; `normal`
/// only feeds the opaque pass's lighting.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

/// Shader locations of the vertex attributes.
pub mod location {
    pub const POSITION: u32 = 0;
    pub const COLOR: u32 = 1;
    pub const NORMAL: u32 = 2;
    pub const TEX_COORDS: u32 = 3;
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 4] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: std::mem::offset_of!(Vertex, position) as u64,
            shader_location: location::POSITION,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: std::mem::offset_of!(Vertex, color) as u64,
            shader_location: location::COLOR,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: std::mem::offset_of!(Vertex, normal) as u64,
            shader_location: location::NORMAL,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: std::mem::offset_of!(Vertex, tex_coords) as u64,
            shader_location: location::TEX_COORDS,
        },
    ];

    pub const fn new(position: [f32; 3], color: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            color,
            normal,
            tex_coords,
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── full-screen quad ──────────────────────────────────────────────────────

const fn screen_vertex(x: f32, y: f32) -> Vertex {
    // NDC +Y is up, texture +V is down.
    Vertex::new(
        [x, y, 0.0],
        [1.0, 1.0, 1.0],
        [0.0, 0.0, 1.0],
        [(x + 1.0) * 0.5, (1.0 - y) * 0.5],
    )
}

/// NDC quad covering the whole target, used by the composite and blit passes.
pub const FULLSCREEN_VERTICES: [Vertex; 4] = [
    screen_vertex(-1.0, -1.0),
    screen_vertex(1.0, -1.0),
    screen_vertex(1.0, 1.0),
    screen_vertex(-1.0, 1.0),
];

pub const FULLSCREEN_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 44);
        let offsets: Vec<u64> = Vertex::ATTRS.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 24, 36]);
    }

    #[test]
    fn locations_are_zero_to_three() {
        let locs: Vec<u32> = Vertex::ATTRS.iter().map(|a| a.shader_location).collect();
        assert_eq!(locs, [0, 1, 2, 3]);
    }

    #[test]
    fn fullscreen_quad_maps_corners_to_texture_corners() {
        assert_eq!(FULLSCREEN_VERTICES[0].tex_coords, [0.0, 1.0]);
        assert_eq!(FULLSCREEN_VERTICES[2].tex_coords, [1.0, 0.0]);
        assert_eq!(FULLSCREEN_VERTICES[3].tex_coords, [0.0, 0.0]);
    }
}
