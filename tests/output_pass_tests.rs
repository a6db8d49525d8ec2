//! End-to-end pass tests over real pipelines.
//!
//! These render 1x1 uniform images through the actual shaders, so they need
//! an adapter (hardware or software). When none is available each test
//! prints a note and returns early instead of failing.

use afterglow::{
    BlendPass, EffectPass, FrameContext, FrameSettings, GpuContext, OutputPass, RenderTarget,
    ShaderManager, ToneMappingMode,
};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

fn try_gpu() -> Option<GpuContext> {
    match GpuContext::new_blocking() {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("no GPU adapter available, skipping: {e}");
            None
        }
    }
}

// IEEE 754 binary32 <-> binary16, enough precision for uniform test pixels.
fn f16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32 - 127 + 15;
    if exp >= 31 {
        return sign | 0x7c00;
    }
    if exp <= 0 {
        return sign;
    }
    sign | ((exp as u16) << 10) | (((bits & 0x007f_ffff) >> 13) as u16)
}

fn f16_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0f32 } else { 1.0 };
    let exp = i32::from((bits >> 10) & 0x1f);
    let mantissa = f32::from(bits & 0x3ff);
    match exp {
        0 => sign * mantissa * 2f32.powi(-24),
        0x1f => sign * f32::INFINITY,
        _ => sign * (1.0 + mantissa / 1024.0) * 2f32.powi(exp - 15),
    }
}

fn upload_pixel(queue: &wgpu::Queue, texture: &wgpu::Texture, rgba: [f32; 4]) {
    let mut bytes = Vec::with_capacity(8);
    for channel in rgba {
        bytes.extend_from_slice(&f16_bits(channel).to_le_bytes());
    }
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &bytes,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(8),
            rows_per_image: Some(1),
        },
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
    );
}

fn read_pixel(gpu: &GpuContext, texture: &wgpu::Texture) -> [f32; 4] {
    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Pixel Readback"),
        size: 8,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: None,
                rows_per_image: None,
            },
        },
        wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue.submit(Some(encoder.finish()));

    let slice = buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, |result| {
        result.expect("buffer map failed");
    });
    gpu.device
        .poll(wgpu::PollType::wait_indefinitely())
        .expect("device poll failed");

    let mapped = slice.get_mapped_range();
    let mut pixel = [0.0f32; 4];
    for (out, chunk) in pixel.iter_mut().zip(mapped.chunks_exact(2)) {
        *out = f16_to_f32(u16::from_le_bytes([chunk[0], chunk[1]]));
    }
    drop(mapped);
    buffer.unmap();
    pixel
}

fn run_pass(
    gpu: &GpuContext,
    shaders: &mut ShaderManager,
    frame: &FrameSettings,
    pass: &mut dyn EffectPass,
    write: &RenderTarget,
    read: &RenderTarget,
) {
    let mut ctx = FrameContext::new(gpu, shaders, frame);
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Encoder"),
        });
    pass.render(&mut ctx, &mut encoder, write, read);
    gpu.queue.submit(Some(encoder.finish()));
}

fn assert_pixel_close(actual: [f32; 4], expected: [f32; 4]) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < 1e-3, "got {actual:?}, expected {expected:?}");
    }
}

#[test]
fn linear_mode_midgray_maps_to_half() {
    let Some(gpu) = try_gpu() else { return };
    let mut shaders = ShaderManager::new();

    let source = RenderTarget::new(&gpu.device, 1, 1, FORMAT, "Test Source").unwrap();
    let dest = RenderTarget::new(&gpu.device, 1, 1, FORMAT, "Test Dest").unwrap();
    upload_pixel(&gpu.queue, source.texture(), [0.5, 0.5, 0.5, 1.0]);

    let mut pass = OutputPass::new(&gpu.device);
    pass.options_mut().render_to_screen = false;
    let frame = FrameSettings {
        tone_mapping: ToneMappingMode::Linear,
        exposure: 1.0,
        ..FrameSettings::default()
    };
    run_pass(&gpu, &mut shaders, &frame, &mut pass, &dest, &source);

    // Linear curve at 0.5 with exposure 1.0 is 0.5; alpha is forced to 1.
    assert_pixel_close(read_pixel(&gpu, dest.texture()), [0.5, 0.5, 0.5, 1.0]);
}

#[test]
fn none_mode_passes_source_through() {
    let Some(gpu) = try_gpu() else { return };
    let mut shaders = ShaderManager::new();

    let source = RenderTarget::new(&gpu.device, 1, 1, FORMAT, "Test Source").unwrap();
    let dest = RenderTarget::new(&gpu.device, 1, 1, FORMAT, "Test Dest").unwrap();
    // 0.25 / 0.5 / 0.75 are exact in binary16, so passthrough is exact too.
    upload_pixel(&gpu.queue, source.texture(), [0.25, 0.5, 0.75, 1.0]);

    let mut pass = OutputPass::new(&gpu.device);
    pass.options_mut().render_to_screen = false;
    // Default frame: no tone mapping. The sRGB define is active here, and
    // the output must still equal the source exactly because no shader-side
    // transfer is applied.
    let frame = FrameSettings::default();
    run_pass(&gpu, &mut shaders, &frame, &mut pass, &dest, &source);

    assert_pixel_close(read_pixel(&gpu, dest.texture()), [0.25, 0.5, 0.75, 1.0]);
}

#[test]
fn output_pass_keeps_swap_default() {
    let Some(gpu) = try_gpu() else { return };
    let pass = OutputPass::new(&gpu.device);
    // Off-screen use must hand the tone-mapped buffer downstream, so the
    // swap flag keeps the inherited default.
    assert!(pass.options().needs_swap);
    assert!(pass.options().render_to_screen);
}

#[test]
fn blend_without_overlay_copies_base() {
    let Some(gpu) = try_gpu() else { return };
    let mut shaders = ShaderManager::new();

    let source = RenderTarget::new(&gpu.device, 1, 1, FORMAT, "Test Source").unwrap();
    let dest = RenderTarget::new(&gpu.device, 1, 1, FORMAT, "Test Dest").unwrap();
    upload_pixel(&gpu.queue, source.texture(), [0.3, 0.6, 0.9, 1.0]);

    let mut pass = BlendPass::new(&gpu.device);
    // No overlay set: the frame degrades to a plain copy of the base.
    let frame = FrameSettings::default();
    run_pass(&gpu, &mut shaders, &frame, &mut pass, &dest, &source);

    assert_pixel_close(read_pixel(&gpu, dest.texture()), [0.3, 0.6, 0.9, 1.0]);
}
