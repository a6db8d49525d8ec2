//! Headless tone-mapping demo.
//!
//! Builds a small post chain — additive glow blend followed by the ACES
//! output pass — over a procedural HDR gradient, renders it off-screen,
//! and saves the result as `tonemap.png`.
//!
//! Run with `cargo run --example tonemap`.

use anyhow::{Context, Result};

use afterglow::{
    BlendPass, EffectComposer, FrameContext, FrameSettings, GpuContext, OutputPass, ShaderManager,
    ToneMappingMode, Tracked,
};

const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;

/// IEEE 754 binary32 → binary16, round-to-nearest. Enough for writing
/// demo pixel data; not a general-purpose conversion.
fn f16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32 - 127 + 15;
    let mantissa = bits & 0x007f_ffff;

    if exp >= 31 {
        return sign | 0x7c00; // overflow to infinity
    }
    if exp <= 0 {
        return sign; // flush denormals/underflow to zero
    }
    sign | ((exp as u16) << 10) | ((mantissa >> 13) as u16)
}

fn rgba16f_pixels(f: impl Fn(f32, f32) -> [f32; 4]) -> Vec<u8> {
    let mut data = Vec::with_capacity((WIDTH * HEIGHT * 8) as usize);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let u = x as f32 / (WIDTH - 1) as f32;
            let v = y as f32 / (HEIGHT - 1) as f32;
            for channel in f(u, v) {
                data.extend_from_slice(&f16_bits(channel).to_le_bytes());
            }
        }
    }
    data
}

fn upload_rgba16f(queue: &wgpu::Queue, texture: &wgpu::Texture, data: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(WIDTH * 8),
            rows_per_image: Some(HEIGHT),
        },
        wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
    );
}

fn readback_rgba8(gpu: &GpuContext, texture: &wgpu::Texture) -> Result<Vec<u8>> {
    let unpadded = WIDTH * 4;
    let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: u64::from(padded * HEIGHT),
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
                bytes_per_row: Some(padded),
                rows_per_image: Some(HEIGHT),
            },
        },
        wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
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
        .context("device poll failed")?;

    let mapped = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded * HEIGHT) as usize);
    for row in 0..HEIGHT {
        let start = (row * padded) as usize;
        pixels.extend_from_slice(&mapped[start..start + unpadded as usize]);
    }
    drop(mapped);
    buffer.unmap();
    Ok(pixels)
}

fn main() -> Result<()> {
    env_logger::init();

    let gpu = GpuContext::new_blocking()?;
    let mut shaders = ShaderManager::new();

    let mut composer = EffectComposer::new(&gpu.device, WIDTH, HEIGHT)?;

    // -----------------------------------------------------------------
    // Base image: an HDR horizontal luminance sweep, 0 → 8 stops.
    // -----------------------------------------------------------------
    let base = rgba16f_pixels(|u, v| {
        let luminance = (u * 8.0).exp2() - 1.0;
        [
            luminance,
            luminance * (0.4 + 0.6 * v),
            luminance * v,
            1.0,
        ]
    });
    upload_rgba16f(&gpu.queue, composer.read_target().texture(), &base);

    // -----------------------------------------------------------------
    // Overlay: a radial HDR glow, rendered "elsewhere" (here: the CPU).
    // -----------------------------------------------------------------
    let glow_texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Glow Overlay"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba16Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let glow = rgba16f_pixels(|u, v| {
        let (dx, dy) = (u - 0.5, v - 0.5);
        let falloff = (-(dx * dx + dy * dy) * 24.0).exp();
        [4.0 * falloff, 3.0 * falloff, 1.5 * falloff, 1.0]
    });
    upload_rgba16f(&gpu.queue, &glow_texture, &glow);
    let glow_view =
        Tracked::new(glow_texture.create_view(&wgpu::TextureViewDescriptor::default()));

    // -----------------------------------------------------------------
    // Screen stand-in for the headless run.
    // -----------------------------------------------------------------
    let screen_format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let screen_texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Screen Stand-in"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: screen_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let screen_view =
        Tracked::new(screen_texture.create_view(&wgpu::TextureViewDescriptor::default()));

    // -----------------------------------------------------------------
    // Chain: blend glow over base, then tone-map to the screen.
    // -----------------------------------------------------------------
    let mut blend = Box::new(BlendPass::new(&gpu.device));
    blend.set_overlay(&glow_view);
    blend.set_strength(0.8);
    composer.add_pass(blend);
    composer.add_pass(Box::new(OutputPass::new(&gpu.device)));

    let frame = FrameSettings {
        tone_mapping: ToneMappingMode::AcesFilmic,
        exposure: 1.2,
        ..FrameSettings::default()
    };

    let mut ctx =
        FrameContext::new(&gpu, &mut shaders, &frame).with_screen(&screen_view, screen_format);
    composer.render(&gpu, &mut ctx);

    let pixels = readback_rgba8(&gpu, &screen_texture)?;
    image::save_buffer(
        "tonemap.png",
        &pixels,
        WIDTH,
        HEIGHT,
        image::ColorType::Rgba8,
    )
    .context("failed to write tonemap.png")?;

    println!("Wrote tonemap.png ({WIDTH}x{HEIGHT}, {} shader modules)", shaders.module_count());
    Ok(())
}
