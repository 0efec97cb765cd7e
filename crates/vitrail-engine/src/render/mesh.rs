use anyhow::Result;
use wgpu::util::DeviceExt;

use super::vertex::{FULLSCREEN_INDICES, FULLSCREEN_VERTICES};
use super::{RenderCtx, Vertex};

/// Indexed triangle geometry on the GPU.
///
/// Meshes carry no transform; each draw call supplies its own model matrix,
/// so one mesh may be drawn any number of times per frame.
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn new(ctx: &RenderCtx<'_>, label: &str, vertices: &[Vertex], indices: &[u16]) -> Result<Self> {
        Self::with_device(ctx.device, label, vertices, indices)
    }

    pub(crate) fn with_device(
        device: &wgpu::Device,
        label: &str,
        vertices: &[Vertex],
        indices: &[u16],
    ) -> Result<Self> {
        validate(vertices, indices).map_err(|e| e.context(format!("mesh `{label}`")))?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // wgpu requires buffer sizes to be a multiple of 4 bytes.
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&padded),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Full-screen quad in NDC for the composite and blit programs.
    pub(crate) fn fullscreen_quad(device: &wgpu::Device, label: &str) -> Result<Self> {
        Self::with_device(device, label, &FULLSCREEN_VERTICES, &FULLSCREEN_INDICES)
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

fn validate(vertices: &[Vertex], indices: &[u16]) -> Result<()> {
    anyhow::ensure!(!vertices.is_empty(), "no vertices");
    anyhow::ensure!(
        !indices.is_empty() && indices.len() % 3 == 0,
        "index count {} is not a positive multiple of 3",
        indices.len()
    );
    anyhow::ensure!(
        vertices.len() <= u16::MAX as usize + 1,
        "{} vertices exceed the u16 index range",
        vertices.len()
    );
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        anyhow::bail!("index {bad} out of range for {} vertices", vertices.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Vec<Vertex> {
        vec![Vertex::new([0.0; 3], [1.0; 3], [0.0, 0.0, 1.0], [0.0; 2]); 3]
    }

    #[test]
    fn accepts_triangle_list() {
        assert!(validate(&tri(), &[0, 1, 2]).is_ok());
    }

    #[test]
    fn rejects_partial_triangles() {
        let err = validate(&tri(), &[0, 1]).unwrap_err();
        assert!(err.to_string().contains("multiple of 3"));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = validate(&tri(), &[0, 1, 3]).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_empty_geometry() {
        assert!(validate(&[], &[0, 1, 2]).is_err());
        assert!(validate(&tri(), &[]).is_err());
    }
}
