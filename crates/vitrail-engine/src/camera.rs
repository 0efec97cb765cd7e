//! View and projection for the surface passes.
//!
//! Right-handed, y-up. Projections map depth to wgpu's `0..1` range.

use glam::{Mat4, Vec3};

use crate::render::CameraData;

pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 1000.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    /// Vertical field of view in degrees.
    Perspective { fov_y_degrees: f32 },
    /// Visible height in world units; width follows the aspect ratio.
    Orthographic { height: f32 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub projection: Projection,
}

impl Camera {
    pub fn perspective(position: Vec3, target: Vec3, fov_y_degrees: f32) -> Self {
        Self {
            position,
            target,
            projection: Projection::Perspective { fov_y_degrees },
        }
    }

    pub fn orthographic(position: Vec3, target: Vec3, height: f32) -> Self {
        Self {
            position,
            target,
            projection: Projection::Orthographic { height },
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        match self.projection {
            Projection::Perspective { fov_y_degrees } => {
                Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, Z_NEAR, Z_FAR)
            }
            Projection::Orthographic { height } => {
                let half_h = height * 0.5;
                let half_w = half_h * aspect;
                Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, Z_NEAR, Z_FAR)
            }
        }
    }

    /// Uniform block for one frame.
    pub fn data(&self, aspect: f32) -> CameraData {
        CameraData::new(self.view_matrix(), self.projection_matrix(aspect), self.position)
    }
}
