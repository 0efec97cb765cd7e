use super::bindings::{
    nearest_sampler, texture_sampler_bind_group, texture_sampler_layout, BlitGroup, Sampling,
};
use super::{Mesh, OitConfig, Program, RenderCtx, TargetFormats};

/// Copies a texture onto a color target with a full-screen quad.
///
/// Used to present render-to-texture output and the OIT debug views. The
/// pipeline is created lazily for `ctx.surface_format`.
#[derive(Default)]
pub struct BlitRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,
    quad: Option<Mesh>,
}

impl BlitRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites `destination` with `source`. Both are sampled/written at
    /// their own resolution; the quad always covers the whole destination.
    pub fn blit(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        destination: &wgpu::TextureView,
    ) {
        self.ensure_resources(ctx);
        self.ensure_pipeline(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(layout) = self.bind_group_layout.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };
        let Some(quad) = self.quad.as_ref() else { return };

        let bind_group =
            texture_sampler_bind_group(ctx.device, "vitrail blit bind group", layout, source, sampler);

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vitrail blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: destination,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(BlitGroup::Source.index(), &bind_group, &[]);
        quad.draw(&mut rpass);
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_resources(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group_layout.is_none() {
            self.bind_group_layout = Some(texture_sampler_layout(
                ctx.device,
                "vitrail blit bgl",
                Sampling::NonFiltering,
            ));
        }
        if self.sampler.is_none() {
            self.sampler = Some(nearest_sampler(ctx.device, "vitrail blit sampler"));
        }
        if self.quad.is_none() {
            match Mesh::fullscreen_quad(ctx.device, "vitrail blit quad") {
                Ok(quad) => self.quad = Some(quad),
                Err(err) => log::error!("blit quad: {err:#}"),
            }
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }
        let Some(layout) = self.bind_group_layout.as_ref() else { return };

        // Only the color format matters to the blit program.
        let formats = TargetFormats::new(ctx.surface_format, &OitConfig::default());
        self.pipeline = Some(Program::Blit.create_pipeline(ctx.device, &[layout], &formats));
        self.pipeline_format = Some(ctx.surface_format);
    }
}
