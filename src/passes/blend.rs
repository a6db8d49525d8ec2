//! Additive Blend Pass
//!
//! Composites an externally rendered overlay (typically a blurred bloom
//! buffer) over the chain's current image:
//!
//! ```text
//! result = base + overlay * strength
//! ```
//!
//! The overlay view is handed in per frame via [`BlendPass::set_overlay`]
//! and consumed by the next render call. A frame without an overlay is a
//! plain copy of `read` into `write` — the pass warns and binds a zero
//! overlay rather than sampling a stale texture, so the chain still sees
//! the base image.

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;

use crate::defines::ShaderDefines;
use crate::fullscreen::FullscreenQuad;
use crate::pass::{EffectPass, FrameContext, PassOptions};
use crate::target::RenderTarget;
use crate::tracked::Tracked;
use crate::uniform::UniformBuffer;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct BlendUniforms {
    strength: f32,
    _pad: [u32; 3],
}

impl Default for BlendUniforms {
    fn default() -> Self {
        Self {
            strength: 1.0,
            _pad: [0; 3],
        }
    }
}

/// Additive two-input compositor pass.
pub struct BlendPass {
    options: PassOptions,

    /// Bind group layout: [base texture, sampler, overlay texture, uniform]
    layout: Tracked<wgpu::BindGroupLayout>,
    sampler: Tracked<wgpu::Sampler>,
    quad: FullscreenQuad,
    uniforms: UniformBuffer<BlendUniforms>,

    /// Overlay for the next render call; cleared after use.
    overlay: Option<Tracked<wgpu::TextureView>>,
    /// 1x1 zero texture bound when no overlay was supplied for a frame,
    /// degrading the draw to a plain copy of the base image.
    fallback_overlay: Tracked<wgpu::TextureView>,

    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    /// ((base view id, overlay view id), bind group)
    bind_group: Option<((u64, u64), wgpu::BindGroup)>,
}

impl BlendPass {
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
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
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
            label: Some("Blend BindGroup Layout"),
            entries: &entries,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Blend Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        // wgpu zero-initializes textures on first use, so this reads as
        // transparent black without an explicit upload.
        let fallback = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Blend Fallback Overlay"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let fallback_overlay =
            Tracked::new(fallback.create_view(&wgpu::TextureViewDescriptor::default()));

        Self {
            options: PassOptions::default(),
            layout: Tracked::new(layout),
            sampler: Tracked::new(sampler),
            quad: FullscreenQuad::new(device),
            uniforms: UniformBuffer::new(BlendUniforms::default(), "Blend Uniforms"),
            overlay: None,
            fallback_overlay,
            pipelines: FxHashMap::default(),
            bind_group: None,
        }
    }

    /// Sets the overlay sampled by the next render call.
    pub fn set_overlay(&mut self, view: &Tracked<wgpu::TextureView>) {
        self.overlay = Some(view.clone());
    }

    /// Sets the overlay intensity multiplier.
    pub fn set_strength(&mut self, strength: f32) {
        if (self.uniforms.read().strength - strength).abs() > f32::EPSILON {
            self.uniforms.write(|u| u.strength = strength);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &mut FrameContext<'_>, format: wgpu::TextureFormat) {
        if self.pipelines.contains_key(&format) {
            return;
        }

        log::debug!("Compiling blend pipeline for {format:?}");

        let (module, _hash) =
            ctx.shaders
                .get_or_compile(ctx.device, "blend", &ShaderDefines::new());

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Blend Pipeline Layout"),
                bind_group_layouts: &[Some(&self.layout)],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Blend Pipeline"),
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

        self.pipelines.insert(format, pipeline);
    }

    fn ensure_bind_group(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        read: &RenderTarget,
        overlay: &Tracked<wgpu::TextureView>,
    ) {
        let base = read.view();
        let ids = (base.id(), overlay.id());
        let buffer = self.uniforms.sync(device, queue);

        if matches!(&self.bind_group, Some((cached, _)) if *cached == ids) {
            return;
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blend BindGroup"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(base),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(overlay),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: buffer.as_entire_binding(),
                },
            ],
        });
        self.bind_group = Some((ids, bind_group));
    }
}

impl EffectPass for BlendPass {
    fn name(&self) -> &str {
        "Blend Pass"
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
        let overlay = self.overlay.take().unwrap_or_else(|| {
            log::warn!("BlendPass: no overlay set for this frame, copying base through");
            self.fallback_overlay.clone()
        });

        self.ensure_bind_group(ctx.device, ctx.queue, read, &overlay);

        let to_screen = self.options.render_to_screen && ctx.screen.is_some();
        let format = if to_screen {
            ctx.screen_format
        } else {
            write.format()
        };
        self.ensure_pipeline(ctx, format);

        let load = if !to_screen && self.options.clear && ctx.frame.auto_clear_color {
            wgpu::LoadOp::Clear(ctx.frame.clear_color)
        } else {
            wgpu::LoadOp::Load
        };

        let Some(pipeline) = self.pipelines.get(&format) else {
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
            label: Some("Blend Pass"),
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
        self.overlay = None;
        self.uniforms.dispose();
        self.quad.dispose();
    }
}
