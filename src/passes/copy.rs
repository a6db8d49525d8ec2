//! Copy Pass
//!
//! Pass-through blit of the read target into the write target (or screen).
//! Useful as a chain terminator when no tone mapping is wanted, and as the
//! cheapest way to move an intermediate image into a differently-formatted
//! target.

use rustc_hash::FxHashMap;

use crate::defines::ShaderDefines;
use crate::fullscreen::FullscreenQuad;
use crate::pass::{EffectPass, FrameContext, PassOptions};
use crate::target::RenderTarget;
use crate::tracked::Tracked;

/// Fullscreen blit pass. One pipeline per output format.
pub struct CopyPass {
    options: PassOptions,

    /// Bind group layout: [texture_2d, sampler]
    layout: Tracked<wgpu::BindGroupLayout>,
    sampler: Tracked<wgpu::Sampler>,
    quad: FullscreenQuad,

    pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    /// (input view id, bind group)
    bind_group: Option<(u64, wgpu::BindGroup)>,
}

impl CopyPass {
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
        ];

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Copy BindGroup Layout"),
            entries: &entries,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Copy Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        Self {
            options: PassOptions::default(),
            layout: Tracked::new(layout),
            sampler: Tracked::new(sampler),
            quad: FullscreenQuad::new(device),
            pipelines: FxHashMap::default(),
            bind_group: None,
        }
    }

    fn ensure_pipeline(&mut self, ctx: &mut FrameContext<'_>, format: wgpu::TextureFormat) {
        if self.pipelines.contains_key(&format) {
            return;
        }

        log::debug!("Compiling copy pipeline for {format:?}");

        let (module, _hash) =
            ctx.shaders
                .get_or_compile(ctx.device, "copy", &ShaderDefines::new());

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Copy Pipeline Layout"),
                bind_group_layouts: &[Some(&self.layout)],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Copy Pipeline"),
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

    fn ensure_bind_group(&mut self, device: &wgpu::Device, read: &RenderTarget) {
        let view = read.view();
        if matches!(&self.bind_group, Some((id, _)) if *id == view.id()) {
            return;
        }

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Copy BindGroup"),
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
            ],
        });
        self.bind_group = Some((view.id(), bind_group));
    }
}

impl EffectPass for CopyPass {
    fn name(&self) -> &str {
        "Copy Pass"
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
        self.ensure_bind_group(ctx.device, read);

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
            label: Some("Copy Pass"),
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
        self.quad.dispose();
    }
}
