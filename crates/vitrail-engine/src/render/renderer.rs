use anyhow::Result;
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::bindings::{
    nearest_sampler, texture_sampler_bind_group, texture_sampler_layout, CompositeGroup,
    Sampling, SurfaceGroup, SurfaceLayouts, UNIFORM_BINDING,
};
use super::blend::{ACCUMULATION_CLEAR, REVEALAGE_CLEAR};
use super::{
    CameraData, Mesh, ModelMatrices, OitConfig, OitTargets, Program, RenderCtx, RenderTarget,
    SurfaceMaterial, TargetFormats,
};

/// One recorded draw call.
pub struct Draw<'a> {
    pub mesh: &'a Mesh,
    pub material: &'a SurfaceMaterial,
    pub model: Mat4,
}

/// Draw calls for one frame, in submission order.
///
/// Order only matters for the opaque pass (depth tested); transparent
/// surfaces resolve the same way regardless of order.
#[derive(Default)]
pub struct DrawList<'a> {
    draws: Vec<Draw<'a>>,
}

impl<'a> DrawList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mesh: &'a Mesh, material: &'a SurfaceMaterial, model: Mat4) {
        self.draws.push(Draw { mesh, material, model });
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Draw<'a>> {
        self.draws.iter()
    }

    fn has_transparent(&self) -> bool {
        self.draws.iter().any(|d| d.material.has_transparent_pixels())
    }
}

/// Per-draw model uniform. Each draw in a frame gets its own slot because
/// queue writes land before any pass of the submission executes.
struct ModelSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct Pipelines {
    format: wgpu::TextureFormat,
    opaque: wgpu::RenderPipeline,
    transparent: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
}

/// Frame-level state produced alongside the targets.
struct Frame {
    targets: OitTargets,
    /// Ordered by [`CompositeGroup::index`].
    composite_bind_groups: [wgpu::BindGroup; 2],
}

/// Opaque pass, weighted-blended transparent pass, composite.
///
/// Pipelines are created lazily for the color format of the current
/// [`RenderCtx`]; frame targets follow its size.
pub struct OitRenderer {
    config: OitConfig,

    layouts: SurfaceLayouts,
    composite_layouts: [wgpu::BindGroupLayout; 2],

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_slots: Vec<ModelSlot>,

    quad: Mesh,
    sampler: wgpu::Sampler,

    pipelines: Option<Pipelines>,
    frame: Option<Frame>,
}

impl OitRenderer {
    pub fn new(device: &wgpu::Device, config: OitConfig) -> Result<Self> {
        config.validate()?;

        let layouts = SurfaceLayouts::new(device);
        let composite_layouts = CompositeGroup::ALL.map(|group| {
            let label = match group {
                CompositeGroup::Accumulation => "vitrail composite accumulation bgl",
                CompositeGroup::Revealage => "vitrail composite revealage bgl",
            };
            texture_sampler_layout(device, label, Sampling::NonFiltering)
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vitrail camera ubo"),
            contents: bytemuck::bytes_of(&CameraData::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = uniform_bind_group(
            device,
            "vitrail camera bind group",
            &layouts.camera,
            &camera_buffer,
        );

        let quad = Mesh::fullscreen_quad(device, "vitrail fullscreen quad")?;
        let sampler = nearest_sampler(device, "vitrail composite sampler");

        Ok(Self {
            config,
            layouts,
            composite_layouts,
            camera_buffer,
            camera_bind_group,
            model_slots: Vec::new(),
            quad,
            sampler,
            pipelines: None,
            frame: None,
        })
    }

    pub fn config(&self) -> &OitConfig {
        &self.config
    }

    /// Layouts materials must be created against.
    pub fn layouts(&self) -> &SurfaceLayouts {
        &self.layouts
    }

    /// Targets of the most recent frame, `None` before the first render.
    pub fn targets(&self) -> Option<&OitTargets> {
        self.frame.as_ref().map(|f| &f.targets)
    }

    /// Records the three passes into `target.encoder`.
    ///
    /// The color target is cleared to [`OitConfig::clear_color`] even when
    /// `draws` is empty. Nothing is recorded for a zero-sized context.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        camera: &CameraData,
        draws: &DrawList<'_>,
    ) {
        let (w, h) = ctx.size;
        if w == 0 || h == 0 {
            log::trace!("skipping oit render at {w}x{h}");
            return;
        }

        self.ensure_pipelines(ctx.device, ctx.surface_format);
        self.ensure_frame(ctx.device, ctx.size);
        self.ensure_model_slots(ctx.device, draws.len());

        ctx.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
        for (slot, draw) in self.model_slots.iter().zip(draws.iter()) {
            let matrices = ModelMatrices::for_camera(camera, draw.model);
            ctx.queue
                .write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&matrices));
        }

        let Some(pipelines) = self.pipelines.as_ref() else { return };
        let Some(frame) = self.frame.as_ref() else { return };

        // ── opaque ─────────────────────────────────────────────────────────
        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vitrail opaque pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &frame.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&pipelines.opaque);
            rpass.set_bind_group(SurfaceGroup::Camera.index(), &self.camera_bind_group, &[]);
            for (slot, draw) in self.model_slots.iter().zip(draws.iter()) {
                if !draw.material.has_opaque_pixels() {
                    continue;
                }
                rpass.set_bind_group(SurfaceGroup::Model.index(), &slot.bind_group, &[]);
                rpass.set_bind_group(SurfaceGroup::Material.index(), &draw.material.bind_group, &[]);
                draw.mesh.draw(&mut rpass);
            }
        }

        // ── transparent ────────────────────────────────────────────────────
        // Always runs so the targets are cleared for debug views.
        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vitrail oit pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: &frame.targets.accumulation,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(ACCUMULATION_CLEAR),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    }),
                    Some(wgpu::RenderPassColorAttachment {
                        view: &frame.targets.revealage,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(REVEALAGE_CLEAR),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    }),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &frame.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&pipelines.transparent);
            rpass.set_bind_group(SurfaceGroup::Camera.index(), &self.camera_bind_group, &[]);
            for (slot, draw) in self.model_slots.iter().zip(draws.iter()) {
                if !draw.material.has_transparent_pixels() {
                    continue;
                }
                rpass.set_bind_group(SurfaceGroup::Model.index(), &slot.bind_group, &[]);
                rpass.set_bind_group(SurfaceGroup::Material.index(), &draw.material.bind_group, &[]);
                draw.mesh.draw(&mut rpass);
            }
        }

        if !draws.has_transparent() {
            return;
        }

        // ── composite ──────────────────────────────────────────────────────
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vitrail composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&pipelines.composite);
        for (group, bind_group) in CompositeGroup::ALL.iter().zip(&frame.composite_bind_groups) {
            rpass.set_bind_group(group.index(), bind_group, &[]);
        }
        self.quad.draw(&mut rpass);
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.pipelines.as_ref().is_some_and(|p| p.format == format) {
            return;
        }

        let formats = TargetFormats::new(format, &self.config);
        let surface = self.layouts.ordered();
        let [accumulation, revealage] = &self.composite_layouts;

        self.pipelines = Some(Pipelines {
            format,
            opaque: Program::OpaqueSurface.create_pipeline(device, &surface, &formats),
            transparent: Program::TransparentSurface.create_pipeline(device, &surface, &formats),
            composite: Program::Composite.create_pipeline(
                device,
                &[accumulation, revealage],
                &formats,
            ),
        });
    }

    fn ensure_frame(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if self.frame.as_ref().is_some_and(|f| f.targets.size() == size) {
            return;
        }

        let targets = OitTargets::new(device, &self.config, size);
        let composite_bind_groups = CompositeGroup::ALL.map(|group| {
            let (label, view) = match group {
                CompositeGroup::Accumulation => {
                    ("vitrail composite accumulation", &targets.accumulation)
                }
                CompositeGroup::Revealage => ("vitrail composite revealage", &targets.revealage),
            };
            texture_sampler_bind_group(
                device,
                label,
                &self.composite_layouts[group.index() as usize],
                view,
                &self.sampler,
            )
        });

        self.frame = Some(Frame {
            targets,
            composite_bind_groups,
        });
    }

    fn ensure_model_slots(&mut self, device: &wgpu::Device, count: usize) {
        if self.model_slots.len() >= count {
            return;
        }

        log::debug!("growing model uniform slots {} -> {count}", self.model_slots.len());
        while self.model_slots.len() < count {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("vitrail model ubo"),
                size: std::mem::size_of::<ModelMatrices>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group =
                uniform_bind_group(device, "vitrail model bind group", &self.layouts.model, &buffer);
            self.model_slots.push(ModelSlot { buffer, bind_group });
        }
    }
}

fn uniform_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: UNIFORM_BINDING,
            resource: buffer.as_entire_binding(),
        }],
    })
}
