//! Output Pass (Tone Mapping + Color Space Compositor)
//!
//! Terminal stage of the post-processing chain: samples the accumulated HDR
//! image, applies the frame's tone mapping operator and exposure, and writes
//! the result to the screen (or to the write target when composing
//! off-screen).
//!
//! # Shader Variants
//!
//! The tone mapping operator is a compile-time constant in the shader.
//! The active variant is re-derived from [`FrameSettings`] on **every**
//! render call, so flipping `frame.tone_mapping` between frames just
//! selects a different cached pipeline — no explicit invalidation step.
//!
//! # Performance
//!
//! - One pipeline per (operator, color space, format), cached across frames
//! - BindGroup rebuilt only when the input texture view changes
//! - Exposure uploads only on change (version-tracked uniform buffer)

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;

use crate::defines::ShaderDefines;
use crate::fullscreen::FullscreenQuad;
use crate::pass::{EffectPass, FrameContext, PassOptions};
use crate::target::RenderTarget;
use crate::tone_mapping::{FrameSettings, OutputColorSpace, ToneMappingMode};
use crate::tracked::Tracked;
use crate::uniform::UniformBuffer;

/// Pipeline cache key: one entry per shader variant × output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct OutputPipelineKey {
    tone_mapping: ToneMappingMode,
    srgb_output: bool,
    format: wgpu::TextureFormat,
}

/// GPU-side uniform block. Padded to 16 bytes to match the WGSL struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct OutputUniforms {
    exposure: f32,
    _pad: [u32; 3],
}

impl Default for OutputUniforms {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            _pad: [0; 3],
        }
    }
}

/// Derives the shader define set for the output shader from the frame
/// configuration. Called fresh on every render, never cached.
#[must_use]
pub fn output_shader_defines(frame: &FrameSettings) -> ShaderDefines {
    let mut defines = ShaderDefines::new();
    frame.tone_mapping.apply_to_defines(&mut defines);
    if frame.output_color_space == OutputColorSpace::Srgb {
        defines.set("SRGB_TRANSFER", "1");
    }
    defines
}

/// Tone-mapping output pass.
///
/// By default renders to the screen (`render_to_screen = true`). The swap
/// flag keeps its inherited default, so an off-screen instance hands the
/// tone-mapped buffer to the next pass in the chain.
pub struct OutputPass {
    options: PassOptions,

    // === GPU Resources ===
    /// Bind group layout: [texture_2d, sampler, uniform]
    layout: Tracked<wgpu::BindGroupLayout>,
    /// Linear sampler for the source image
    sampler: Tracked<wgpu::Sampler>,
    quad: FullscreenQuad,
    uniforms: UniformBuffer<OutputUniforms>,

    // === Cache State ===
    /// Cached pipelines by shader variant — typically 1 entry
    pipelines: FxHashMap<OutputPipelineKey, wgpu::RenderPipeline>,
    /// (input view id, bind group); rebuilt when the input view changes
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

impl OutputPass {
    /// Creates a new output pass. Pipelines are lazily created on first
    /// render (one per shader variant actually used).
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let entries = [
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ];

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Output BindGroup Layout"),
            entries: &entries,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Output Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        Self {
            options: PassOptions {
                render_to_screen: true,
                ..PassOptions::default()
            },
            layout: Tracked::new(layout),
            sampler: Tracked::new(sampler),
            quad: FullscreenQuad::new(device),
            uniforms: UniformBuffer::new(OutputUniforms::default(), "Output Uniforms"),
            pipelines: FxHashMap::default(),
            bind_group: None,
        }
    }

    /// Ensures a pipeline exists for the current shader variant and returns
    /// its cache key.
    fn ensure_pipeline(
        &mut self,
        ctx: &mut FrameContext<'_>,
        format: wgpu::TextureFormat,
    ) -> OutputPipelineKey {
        let key = OutputPipelineKey {
            tone_mapping: ctx.frame.tone_mapping,
            srgb_output: ctx.frame.output_color_space == OutputColorSpace::Srgb,
            format,
        };

        if !self.pipelines.contains_key(&key) {
            log::debug!(
                "Compiling output pipeline: {} / srgb={} / {:?}",
                ctx.frame.tone_mapping.name(),
                key.srgb_output,
                format,
            );

            let defines = output_shader_defines(ctx.frame);
            let (module, _hash) =
                ctx.shaders.get_or_compile(ctx.device, "output", &defines);

            let pipeline_layout =
                ctx.device
                    .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                        label: Some("Output Pipeline Layout"),
                        bind_group_layouts: &[Some(&self.layout)],
                        immediate_size: 0,
                    });

            let pipeline =
                ctx.device
                    .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Output Pipeline"),
                        layout: Some(&pipeline_layout),
                        vertex: wgpu::VertexState {
                            module,
                            entry_point: Some("vs_main"),
                            compilation_options: Default::default(),
                            buffers: &[FullscreenQuad::vertex_layout()],
                        },
                        fragment: Some(wgpu::FragmentState {
                            module,
                            entry_point: Some("fs_main"),
                            compilation_options: Default::default(),
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                        }),
                        primitive: wgpu::PrimitiveState::default(),
                        depth_stencil: None,
                        multisample: wgpu::MultisampleState::default(),
                        multiview_mask: None,
                        cache: None,
                    });

            self.pipelines.insert(key, pipeline);
        }

        key
    }

    fn ensure_bind_group(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, read: &RenderTarget) {
        let view = read.view();
        // The buffer is created on first sync and keeps its identity after
        // that, so only the input view can invalidate an existing bind group.
        let buffer = self.uniforms.sync(device, queue);

        let stale = !matches!(&self.bind_group, Some((id, _)) if *id == view.id());
        if stale {
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Output BindGroup"),
                layout: &self.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffer.as_entire_binding(),
                    },
                ],
            });
            self.bind_group = Some((view.id(), bind_group));
        }
    }
}

impl EffectPass for OutputPass {
    fn name(&self) -> &str {
        "Output Pass"
    }

    fn options(&self) -> &PassOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut PassOptions {
        &mut self.options
    }

    fn render(
        &mut self,
        ctx: &mut FrameContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        write: &RenderTarget,
        read: &RenderTarget,
    ) {
        if (self.uniforms.read().exposure - ctx.frame.exposure).abs() > f32::EPSILON {
            self.uniforms.write(|u| u.exposure = ctx.frame.exposure);
        }

        // The uniform buffer is created on first sync, so the bind group
        // must be ensured before the render pass borrows the encoder.
        self.ensure_bind_group(ctx.device, ctx.queue, read);

        let to_screen = self.options.render_to_screen && ctx.screen.is_some();
        let format = if to_screen {
            ctx.screen_format
        } else {
            write.format()
        };

        // Clear only applies to off-screen targets; the screen is composed
        // over whatever was already presented there this frame.
        let load = if !to_screen && self.options.clear && ctx.frame.auto_clear_color {
            wgpu::LoadOp::Clear(ctx.frame.clear_color)
        } else {
            wgpu::LoadOp::Load
        };

        let key = self.ensure_pipeline(ctx, format);
        let Some(pipeline) = self.pipelines.get(&key) else {
            return;
        };
        let Some((_, bind_group)) = &self.bind_group else {
            return;
        };

        let target_view: &wgpu::TextureView = match ctx.screen {
            Some(view) if to_screen => view,
            _ => write.view(),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Output Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        self.quad.draw(&mut pass);
    }

    fn dispose(&mut self) {
        self.pipelines.clear();
        self.bind_group = None;
        self.uniforms.dispose();
        self.quad.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defines_rederived_per_call() {
        let mut frame = FrameSettings::default();
        frame.tone_mapping = ToneMappingMode::AcesFilmic;
        let first = output_shader_defines(&frame);
        assert_eq!(first.get("TONE_MAPPING_MODE"), Some("ACES_FILMIC"));

        frame.tone_mapping = ToneMappingMode::None;
        let second = output_shader_defines(&frame);
        assert_eq!(second.get("TONE_MAPPING_MODE"), None);
    }

    #[test]
    fn srgb_define_follows_color_space() {
        let mut frame = FrameSettings::default();
        assert!(output_shader_defines(&frame).contains("SRGB_TRANSFER"));

        frame.output_color_space = OutputColorSpace::Linear;
        assert!(!output_shader_defines(&frame).contains("SRGB_TRANSFER"));
    }

    #[test]
    fn uniforms_are_16_bytes() {
        assert_eq!(std::mem::size_of::<OutputUniforms>(), 16);
    }
}
