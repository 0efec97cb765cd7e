// GPU smoke tests for the OIT renderer and the blit path.
// Each test skips when no adapter is available (headless CI).

use glam::{Mat4, Vec3};
use vitrail_engine::camera::Camera;
use vitrail_engine::render::bindings::{texture_sampler_layout, Sampling};
use vitrail_engine::render::{
    Blending, BlitRenderer, DrawList, Mesh, OitConfig, OitRenderer, Program, RenderCtx,
    RenderTarget, RenderTexture, SurfaceLayouts, SurfaceMaterial, TargetFormats, Texture, Vertex,
};

const SIZE: (u32, u32) = (64, 64);
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn create_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .ok()?;

    let desc = wgpu::DeviceDescriptor {
        label: Some("vitrail test device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::downlevel_defaults(),
        experimental_features: wgpu::ExperimentalFeatures::disabled(),
        memory_hints: wgpu::MemoryHints::Performance,
        trace: wgpu::Trace::Off,
    };
    pollster::block_on(adapter.request_device(&desc)).ok()
}

/// Axis-aligned quad in the z plane, facing +Z.
fn quad(x0: f32, x1: f32, z: f32) -> [Vertex; 4] {
    let v = |x: f32, y: f32, u: f32, t: f32| {
        Vertex::new([x, y, z], [1.0; 3], [0.0, 0.0, 1.0], [u, t])
    };
    [v(x0, -1.0, 0.0, 1.0), v(x1, -1.0, 1.0, 1.0), v(x1, 1.0, 1.0, 0.0), v(x0, 1.0, 0.0, 0.0)]
}

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

fn solid(ctx: &RenderCtx<'_>, layouts: &SurfaceLayouts, rgba: [u8; 4]) -> SurfaceMaterial {
    let texture = Texture::from_rgba8(ctx, "solid", &rgba, 1, 1).expect("texture");
    SurfaceMaterial::new(ctx, layouts, &texture, Blending::Auto)
}

/// Camera whose view exactly spans x, y in [-1, 1].
fn camera() -> Camera {
    Camera::orthographic(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 2.0)
}

fn read_rgba8(device: &wgpu::Device, queue: &wgpu::Queue, target: &RenderTexture) -> Vec<u8> {
    let (w, h) = target.size;
    // 64 * 4 bytes is already row-aligned.
    let bytes_per_row = w * 4;
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("vitrail readback"),
        size: (bytes_per_row * h) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vitrail readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(h),
            },
        },
        wgpu::Extent3d {
            width: w,
            height: h,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, |_| {});
    let _ = device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: None,
    });
    let data = slice.get_mapped_range().to_vec();
    buffer.unmap();
    data
}

fn pixel(data: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * SIZE.0 + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

const BACKGROUND: [u8; 4] = [13, 13, 18, 255];

fn assert_background(px: [u8; 4]) {
    let close = px.iter().zip(BACKGROUND).all(|(a, b)| a.abs_diff(b) <= 1);
    assert!(close, "expected background, got {px:?}");
}

fn render_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    renderer: &mut OitRenderer,
    output: &RenderTexture,
    draws: &DrawList<'_>,
) {
    let ctx = RenderCtx::new(device, queue, FORMAT, SIZE);
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vitrail test frame"),
    });
    {
        let mut target = RenderTarget::new(&mut encoder, &output.view);
        renderer.render(&ctx, &mut target, &camera().data(ctx.aspect()), draws);
    }
    queue.submit(std::iter::once(encoder.finish()));
}

#[test]
fn every_program_builds_a_pipeline() {
    let Some((device, _queue)) = create_device_queue() else {
        eprintln!("Skipping every_program_builds_a_pipeline (no GPU)");
        return;
    };

    let formats = TargetFormats::new(FORMAT, &OitConfig::default());
    let surface = SurfaceLayouts::new(&device);
    let accumulation = texture_sampler_layout(&device, "accumulation", Sampling::NonFiltering);
    let revealage = texture_sampler_layout(&device, "revealage", Sampling::NonFiltering);
    let source = texture_sampler_layout(&device, "blit source", Sampling::NonFiltering);

    // Validation failures panic through the default uncaptured error handler.
    for program in Program::ALL {
        let layouts: Vec<&wgpu::BindGroupLayout> = match program {
            Program::OpaqueSurface | Program::TransparentSurface => surface.ordered().to_vec(),
            Program::Composite => vec![&accumulation, &revealage],
            Program::Blit => vec![&source],
        };
        let _ = program.create_pipeline(&device, &layouts, &formats);
    }
}

#[test]
fn empty_frame_clears_to_background() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping empty_frame_clears_to_background (no GPU)");
        return;
    };

    let ctx = RenderCtx::new(&device, &queue, FORMAT, SIZE);
    let output = RenderTexture::new(&ctx, "output", FORMAT, SIZE);
    let mut renderer = OitRenderer::new(&device, OitConfig::default()).expect("renderer");

    render_frame(&device, &queue, &mut renderer, &output, &DrawList::new());
    let data = read_rgba8(&device, &queue, &output);

    assert_background(pixel(&data, 32, 32));
    assert!(renderer.targets().is_some());
}

#[test]
fn translucent_pane_composites_over_background() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping translucent_pane_composites_over_background (no GPU)");
        return;
    };

    let ctx = RenderCtx::new(&device, &queue, FORMAT, SIZE);
    let output = RenderTexture::new(&ctx, "output", FORMAT, SIZE);
    let mut renderer = OitRenderer::new(&device, OitConfig::default()).expect("renderer");

    let pane = Mesh::new(&ctx, "pane", &quad(-1.0, 0.0, 0.0), &QUAD_INDICES).expect("mesh");
    let red = solid(&ctx, renderer.layouts(), [255, 0, 0, 128]);

    let mut draws = DrawList::new();
    draws.push(&pane, &red, Mat4::IDENTITY);
    render_frame(&device, &queue, &mut renderer, &output, &draws);
    let data = read_rgba8(&device, &queue, &output);

    // 1.0 * 0.502 + 0.05 * 0.498 on red, background only on the right.
    let left = pixel(&data, 16, 32);
    assert!((125..=145).contains(&left[0]), "left {left:?}");
    assert!(left[1] < 12, "left {left:?}");
    assert_background(pixel(&data, 48, 32));
}

#[test]
fn opaque_surface_hides_translucent_layer_behind_it() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping opaque_surface_hides_translucent_layer_behind_it (no GPU)");
        return;
    };

    let ctx = RenderCtx::new(&device, &queue, FORMAT, SIZE);
    let output = RenderTexture::new(&ctx, "output", FORMAT, SIZE);
    let mut renderer = OitRenderer::new(&device, OitConfig::default()).expect("renderer");

    let back = Mesh::new(&ctx, "back", &quad(-1.0, 1.0, -1.0), &QUAD_INDICES).expect("mesh");
    let front = Mesh::new(&ctx, "front", &quad(0.0, 1.0, 0.0), &QUAD_INDICES).expect("mesh");
    let red = solid(&ctx, renderer.layouts(), [255, 0, 0, 128]);
    let green = solid(&ctx, renderer.layouts(), [0, 255, 0, 255]);

    // Transparent first: submission order must not matter.
    let mut draws = DrawList::new();
    draws.push(&back, &red, Mat4::IDENTITY);
    draws.push(&front, &green, Mat4::IDENTITY);
    render_frame(&device, &queue, &mut renderer, &output, &draws);
    let data = read_rgba8(&device, &queue, &output);

    let right = pixel(&data, 48, 32);
    assert!(right[0] < 4 && right[1] > 200, "right {right:?}");
    let left = pixel(&data, 16, 32);
    assert!(left[0] > 100, "left {left:?}");
}

fn assert_within_one_lsb(a: &[u8], b: &[u8]) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!(
            x.abs_diff(*y) <= 1,
            "pixel {} channel {} differs: {x} vs {y}",
            i / 4,
            i % 4
        );
    }
}

#[test]
fn overlapping_panes_resolve_the_same_in_either_order() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping overlapping_panes_resolve_the_same_in_either_order (no GPU)");
        return;
    };

    let ctx = RenderCtx::new(&device, &queue, FORMAT, SIZE);
    let output = RenderTexture::new(&ctx, "output", FORMAT, SIZE);
    let mut renderer = OitRenderer::new(&device, OitConfig::default()).expect("renderer");

    let near = Mesh::new(&ctx, "near", &quad(-1.0, 0.5, 0.0), &QUAD_INDICES).expect("mesh");
    let far = Mesh::new(&ctx, "far", &quad(-0.5, 1.0, -1.0), &QUAD_INDICES).expect("mesh");
    assert_eq!(near.index_count(), 6);
    let red = solid(&ctx, renderer.layouts(), [255, 0, 0, 128]);
    let blue = solid(&ctx, renderer.layouts(), [0, 0, 255, 153]);

    let mut near_first = DrawList::new();
    near_first.push(&near, &red, Mat4::IDENTITY);
    near_first.push(&far, &blue, Mat4::IDENTITY);
    render_frame(&device, &queue, &mut renderer, &output, &near_first);
    let a = read_rgba8(&device, &queue, &output);

    let mut far_first = DrawList::new();
    far_first.push(&far, &blue, Mat4::IDENTITY);
    far_first.push(&near, &red, Mat4::IDENTITY);
    render_frame(&device, &queue, &mut renderer, &output, &far_first);
    let b = read_rgba8(&device, &queue, &output);

    assert_within_one_lsb(&a, &b);

    // Both layers contribute where they overlap.
    let overlap = pixel(&a, 32, 32);
    assert!(overlap[0] > 60 && overlap[2] > 60, "overlap {overlap:?}");
    assert!(overlap[1] < 20, "overlap {overlap:?}");
}

#[test]
fn fully_transparent_pane_leaves_background_intact() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping fully_transparent_pane_leaves_background_intact (no GPU)");
        return;
    };

    let ctx = RenderCtx::new(&device, &queue, FORMAT, SIZE);
    let output = RenderTexture::new(&ctx, "output", FORMAT, SIZE);
    let mut renderer = OitRenderer::new(&device, OitConfig::default()).expect("renderer");

    let pane = Mesh::new(&ctx, "pane", &quad(-1.0, 1.0, 0.0), &QUAD_INDICES).expect("mesh");
    let clear = solid(&ctx, renderer.layouts(), [255, 0, 0, 0]);

    let mut draws = DrawList::new();
    draws.push(&pane, &clear, Mat4::IDENTITY);
    render_frame(&device, &queue, &mut renderer, &output, &draws);
    let data = read_rgba8(&device, &queue, &output);

    // Zero accumulated alpha must not turn into NaN or black.
    for (x, y) in [(8, 8), (32, 32), (56, 56)] {
        assert_background(pixel(&data, x, y));
    }
}

#[test]
fn odd_index_count_mesh_draws() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping odd_index_count_mesh_draws (no GPU)");
        return;
    };

    let ctx = RenderCtx::new(&device, &queue, FORMAT, SIZE);
    let output = RenderTexture::new(&ctx, "output", FORMAT, SIZE);
    let mut renderer = OitRenderer::new(&device, OitConfig::default()).expect("renderer");

    let corners = quad(-1.0, 1.0, 0.0);
    let triangle =
        Mesh::new(&ctx, "triangle", &[corners[0], corners[1], corners[3]], &[0, 1, 2]).expect("mesh");
    assert_eq!(triangle.index_count(), 3);
    let green = solid(&ctx, renderer.layouts(), [0, 255, 0, 255]);

    let mut draws = DrawList::new();
    draws.push(&triangle, &green, Mat4::IDENTITY);
    render_frame(&device, &queue, &mut renderer, &output, &draws);
    let data = read_rgba8(&device, &queue, &output);

    let inside = pixel(&data, 8, 56);
    assert!(inside[1] > 200, "inside {inside:?}");
    assert_background(pixel(&data, 56, 8));
}

#[test]
fn blit_copies_render_texture() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping blit_copies_render_texture (no GPU)");
        return;
    };

    let ctx = RenderCtx::new(&device, &queue, FORMAT, SIZE);
    let scene = RenderTexture::new(&ctx, "scene", FORMAT, SIZE);
    let copy = RenderTexture::new(&ctx, "copy", FORMAT, SIZE);
    let mut renderer = OitRenderer::new(&device, OitConfig::default()).expect("renderer");
    let mut blit = BlitRenderer::new();

    render_frame(&device, &queue, &mut renderer, &scene, &DrawList::new());

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("vitrail test blit"),
    });
    blit.blit(&ctx, &mut encoder, &scene.view, &copy.view);
    queue.submit(std::iter::once(encoder.finish()));

    let data = read_rgba8(&device, &queue, &copy);
    assert_background(pixel(&data, 5, 60));
}
