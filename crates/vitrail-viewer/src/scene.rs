//! Procedural demo scene: an opaque floor and crate, a wall with cut-out
//! translucent windows, and overlapping glass panes.

use anyhow::Result;
use glam::{Mat4, Quat, Vec3};

use vitrail_engine::render::{
    Blending, DrawList, Mesh, RenderCtx, SurfaceLayouts, SurfaceMaterial, Texture, Vertex,
};

const WHITE: [f32; 3] = [1.0; 3];

pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Geometry {
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, uv_scale: f32) {
        let base = self.vertices.len() as u16;
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        for (p, uv) in corners.iter().zip(uvs) {
            self.vertices.push(Vertex::new(
                p.to_array(),
                WHITE,
                normal.to_array(),
                [uv[0] * uv_scale, uv[1] * uv_scale],
            ));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn upload(&self, ctx: &RenderCtx<'_>, label: &str) -> Result<Mesh> {
        Mesh::new(ctx, label, &self.vertices, &self.indices)
    }
}

/// Square in the XZ plane at y = 0, facing +Y. Texture repeats `uv_repeat` times.
pub fn plane(half: f32, uv_repeat: f32) -> Geometry {
    let mut g = Geometry { vertices: Vec::new(), indices: Vec::new() };
    g.push_quad(
        [
            Vec3::new(-half, 0.0, half),
            Vec3::new(half, 0.0, half),
            Vec3::new(half, 0.0, -half),
            Vec3::new(-half, 0.0, -half),
        ],
        Vec3::Y,
        uv_repeat,
    );
    g
}

/// Rectangle in the XY plane centred on the origin, facing +Z.
pub fn quad(width: f32, height: f32) -> Geometry {
    let (hw, hh) = (width * 0.5, height * 0.5);
    let mut g = Geometry { vertices: Vec::new(), indices: Vec::new() };
    g.push_quad(
        [
            Vec3::new(-hw, -hh, 0.0),
            Vec3::new(hw, -hh, 0.0),
            Vec3::new(hw, hh, 0.0),
            Vec3::new(-hw, hh, 0.0),
        ],
        Vec3::Z,
        1.0,
    );
    g
}

/// Axis-aligned cube centred on the origin with per-face normals.
pub fn cube(half: f32) -> Geometry {
    let mut g = Geometry { vertices: Vec::new(), indices: Vec::new() };
    for normal in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
        // Two axes spanning the face, ordered so the quad winds CCW from outside.
        let u = if normal.y.abs() > 0.5 { Vec3::X } else { Vec3::Y.cross(normal) };
        let v = normal.cross(u);
        let c = normal * half;
        let (u, v) = (u * half, v * half);
        g.push_quad([c - u - v, c + u - v, c + u + v, c - u + v], normal, 1.0);
    }
    g
}

/// Opaque two-tone checkerboard, `size` x `size` texels.
pub fn checkerboard(size: u32, cells: u32, a: [u8; 3], b: [u8; 3]) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let c = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            out.extend_from_slice(&[c[0], c[1], c[2], 255]);
        }
    }
    out
}

/// Opaque masonry with a 2x2 grid of tinted, translucent window openings.
pub fn window_wall(size: u32) -> Vec<u8> {
    const STONE: [u8; 4] = [196, 178, 150, 255];
    const GLASS: [u8; 4] = [90, 160, 220, 110];

    let margin = size / 8;
    let half = size / 2;
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let (cx, cy) = (x % half, y % half);
            let inside = cx >= margin && cx < half - margin && cy >= margin && cy < half - margin;
            out.extend_from_slice(if inside { &GLASS } else { &STONE });
        }
    }
    out
}

/// Glass with an opaque frame `border` texels wide.
pub fn framed_glass(size: u32, border: u32, frame: [u8; 4], glass: [u8; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let edge = x < border || y < border || x >= size - border || y >= size - border;
            out.extend_from_slice(if edge { &frame } else { &glass });
        }
    }
    out
}

struct Pane {
    material: SurfaceMaterial,
    transform: Mat4,
}

/// GPU resources of the demo scene.
pub struct Scene {
    floor: Mesh,
    floor_material: SurfaceMaterial,
    cube: Mesh,
    crate_material: SurfaceMaterial,
    wall: Mesh,
    wall_material: SurfaceMaterial,
    pane: Mesh,
    panes: Vec<Pane>,
    spinner: SurfaceMaterial,
}

impl Scene {
    pub fn new(ctx: &RenderCtx<'_>, layouts: &SurfaceLayouts) -> Result<Self> {
        let material = |label: &str, rgba: &[u8], size: u32, blending| -> Result<SurfaceMaterial> {
            let texture = Texture::from_rgba8(ctx, label, rgba, size, size)?;
            Ok(SurfaceMaterial::new(ctx, layouts, &texture, blending))
        };

        let floor_material = material(
            "floor",
            &checkerboard(64, 8, [210, 210, 210], [70, 70, 78]),
            64,
            Blending::Auto,
        )?;
        let crate_material = material(
            "crate",
            &checkerboard(32, 4, [150, 100, 60], [120, 80, 45]),
            32,
            Blending::Auto,
        )?;
        let wall_material = material("wall", &window_wall(128), 128, Blending::Auto)?;

        let tints: [([u8; 4], Vec3, f32); 3] = [
            ([230, 40, 40, 120], Vec3::new(-0.8, 1.2, 1.2), 0.3),
            ([40, 220, 60, 100], Vec3::new(0.0, 1.3, 1.7), -0.2),
            ([50, 80, 240, 150], Vec3::new(0.8, 1.1, 2.2), 0.1),
        ];
        let mut panes = Vec::with_capacity(tints.len());
        for (i, (rgba, position, yaw)) in tints.into_iter().enumerate() {
            panes.push(Pane {
                material: material(&format!("pane {i}"), &rgba, 1, Blending::Auto)?,
                transform: Mat4::from_rotation_translation(Quat::from_rotation_y(yaw), position),
            });
        }

        let spinner = material(
            "spinner",
            &framed_glass(32, 3, [40, 40, 40, 255], [250, 220, 90, 90]),
            32,
            Blending::Auto,
        )?;

        Ok(Self {
            floor: plane(6.0, 6.0).upload(ctx, "floor")?,
            floor_material,
            cube: cube(0.5).upload(ctx, "crate")?,
            crate_material,
            wall: quad(4.0, 3.0).upload(ctx, "wall")?,
            wall_material,
            pane: quad(1.4, 1.4).upload(ctx, "pane")?,
            panes,
            spinner,
        })
    }

    /// Draws for time `t` seconds. Transparent draws are deliberately
    /// interleaved with opaque ones; the renderer does not need sorting.
    pub fn draw_list(&self, t: f32) -> DrawList<'_> {
        let mut draws = DrawList::new();

        for pane in &self.panes {
            draws.push(&self.pane, &pane.material, pane.transform);
        }
        draws.push(&self.floor, &self.floor_material, Mat4::IDENTITY);
        draws.push(
            &self.wall,
            &self.wall_material,
            Mat4::from_translation(Vec3::new(0.0, 1.5, -1.0)),
        );
        draws.push(
            &self.pane,
            &self.spinner,
            Mat4::from_rotation_translation(Quat::from_rotation_y(t * 0.6), Vec3::new(0.0, 1.2, 1.7)),
        );
        draws.push(
            &self.cube,
            &self.crate_material,
            Mat4::from_translation(Vec3::new(1.8, 0.5, 0.3)),
        );

        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_values(rgba: &[u8]) -> Vec<u8> {
        rgba.chunks_exact(4).map(|p| p[3]).collect()
    }

    #[test]
    fn cube_has_outward_ccw_faces() {
        let g = cube(1.0);
        assert_eq!(g.vertices.len(), 24);
        assert_eq!(g.indices.len(), 36);

        for tri in g.indices.chunks_exact(3) {
            let p = |i: u16| Vec3::from(g.vertices[i as usize].position);
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            let normal = Vec3::from(g.vertices[tri[0] as usize].normal);
            assert!(face.dot(normal) > 0.0);
            assert!(p(tri[0]).dot(normal) > 0.0);
        }
    }

    #[test]
    fn plane_faces_up_with_repeated_uvs() {
        let g = plane(2.0, 4.0);
        assert!(g.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0] && v.position[1] == 0.0));
        let max_u = g.vertices.iter().map(|v| v.tex_coords[0]).fold(0.0, f32::max);
        assert_eq!(max_u, 4.0);
    }

    #[test]
    fn quad_is_centred() {
        let g = quad(2.0, 1.0);
        let sum: Vec3 = g.vertices.iter().map(|v| Vec3::from(v.position)).sum();
        assert!(sum.length() < 1e-6);
    }

    #[test]
    fn checkerboard_alternates_and_is_opaque() {
        let rgba = checkerboard(4, 2, [255, 0, 0], [0, 0, 255]);
        assert_eq!(rgba.len(), 64);
        assert_eq!(&rgba[0..3], &[255, 0, 0]);
        assert_eq!(&rgba[8..11], &[0, 0, 255]);
        assert!(alpha_values(&rgba).iter().all(|&a| a == 255));
    }

    #[test]
    fn window_wall_mixes_coverage() {
        let alphas = alpha_values(&window_wall(64));
        assert!(alphas.contains(&255));
        assert!(alphas.iter().any(|&a| a < 255));
    }

    #[test]
    fn framed_glass_border_is_opaque() {
        let rgba = framed_glass(8, 1, [0, 0, 0, 255], [255, 255, 255, 64]);
        let alphas = alpha_values(&rgba);
        assert_eq!(alphas[0], 255);
        assert_eq!(alphas[8 + 1], 64);
        assert_eq!(alphas.iter().filter(|&&a| a == 255).count(), 28);
    }
}
