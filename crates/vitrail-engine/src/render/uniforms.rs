//! Uniform blocks shared with the surface shaders.
//!
//! Field order and padding mirror the WGSL structs; matrices are glam's
//! column-major layout, which is what WGSL `mat4x4<f32>` expects.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// `CameraData` in WGSL. `position` is a `vec3` so the struct rounds up to 144 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub position: [f32; 3],
    pub _pad: f32,
}

impl CameraData {
    pub fn new(view: Mat4, proj: Mat4, position: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            position: position.to_array(),
            _pad: 0.0,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view)
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.proj)
    }
}

impl Default for CameraData {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
    }
}

/// `ModelMatrices` in WGSL. One per draw call.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelMatrices {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of model-view; transforms normals into view space.
    pub normal_matrix: [[f32; 4]; 4],
}

impl ModelMatrices {
    pub fn new(view: Mat4, proj: Mat4, model: Mat4) -> Self {
        let model_view = view * model;

        // A degenerate (zero-scale) model has no meaningful normals.
        let normal_matrix = if model_view.determinant().abs() > f32::EPSILON {
            model_view.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };

        Self {
            mvp: (proj * model_view).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }

    pub fn for_camera(camera: &CameraData, model: Mat4) -> Self {
        Self::new(camera.view(), camera.proj(), model)
    }
}
