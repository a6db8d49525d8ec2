#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod composer;
pub mod context;
pub mod defines;
pub mod errors;
pub mod fullscreen;
pub mod pass;
pub mod passes;
pub mod pipeline;
pub mod target;
pub mod tone_mapping;
pub mod tracked;
pub mod uniform;

pub use composer::EffectComposer;
pub use context::GpuContext;
pub use defines::ShaderDefines;
pub use errors::{AfterglowError, Result};
pub use fullscreen::FullscreenQuad;
pub use pass::{EffectPass, FrameContext, PassOptions};
pub use passes::{BlendPass, CopyPass, OutputPass, output_shader_defines};
pub use pipeline::ShaderManager;
pub use target::RenderTarget;
pub use tone_mapping::{FrameSettings, OutputColorSpace, ToneMappingMode};
pub use tracked::Tracked;
pub use uniform::UniformBuffer;

/// Default color format for intermediate HDR render targets.
///
/// Chosen over `Rgba32Float` for bandwidth and over `Rg11b10Ufloat` for
/// alpha support and universal filterability.
pub const HDR_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
