//! GPU rendering subsystem.
//!
//! [`OitRenderer`] draws a [`DrawList`] in three passes:
//! - opaque surfaces into the color target, writing depth;
//! - translucent surfaces into the accumulation and revealage targets, testing
//!   depth without writing it;
//! - a full-screen composite of those targets onto the color target.
//!
//! Every shader lives in a [`Program`] next to the blend and depth state it
//! relies on; bind group numbering is shared through [`bindings`].

pub mod bindings;
pub mod blend;
mod blit;
mod config;
mod ctx;
mod material;
mod mesh;
mod program;
mod renderer;
mod targets;
mod texture;
mod uniforms;
mod vertex;

pub use bindings::SurfaceLayouts;
pub use blit::BlitRenderer;
pub use config::OitConfig;
pub use ctx::{RenderCtx, RenderTarget};
pub use material::{Blending, Passes, SurfaceMaterial};
pub use mesh::Mesh;
pub use program::{Program, TargetFormats, OPAQUE_ALPHA_CUTOFF};
pub use renderer::{Draw, DrawList, OitRenderer};
pub use targets::OitTargets;
pub use texture::{AlphaCoverage, RenderTexture, Texture};
pub use uniforms::{CameraData, ModelMatrices};
pub use vertex::{location, Vertex, FULLSCREEN_INDICES, FULLSCREEN_VERTICES};
