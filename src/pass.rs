//! Effect Pass Contract
//!
//! [`EffectPass`] is the abstract render step executed by the
//! [`EffectComposer`](crate::EffectComposer). Every pass receives the current
//! ping-pong pair per call — `read` is the previous pass's output, `write` is
//! where this pass should render (unless its `render_to_screen` flag routes
//! it to the screen view instead).
//!
//! The contract is enforced at compile time: a type without a `render`
//! implementation is not a pass. (The runtime "must be overridden" error of
//! classic pass hierarchies has no Rust counterpart.)

use crate::pipeline::ShaderManager;
use crate::target::RenderTarget;
use crate::tone_mapping::FrameSettings;
use crate::tracked::Tracked;

/// Scheduling flags read by the composition driver.
///
/// The driver — not the pass — interprets these: `needs_swap` controls
/// ping-pong buffer rotation after the pass ran, `enabled` skips the pass
/// entirely. `clear` and `render_to_screen` are read back by the pass itself
/// inside `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOptions {
    /// Whether the composer executes this pass at all.
    pub enabled: bool,
    /// Whether the composer swaps the ping-pong pair after this pass.
    pub needs_swap: bool,
    /// Whether the pass clears its write target before drawing (subject to
    /// the per-channel auto-clear flags in [`FrameSettings`]).
    pub clear: bool,
    /// Whether the pass draws to the screen view instead of `write`.
    pub render_to_screen: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            needs_swap: true,
            clear: false,
            render_to_screen: false,
        }
    }
}

impl PassOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything a pass may borrow for one render call.
///
/// Frame configuration travels here explicitly instead of on a global
/// renderer object, so a pass re-derives its shader variant from
/// `frame` on every call.
pub struct FrameContext<'a> {
    /// Device for resource/pipeline creation.
    pub device: &'a wgpu::Device,
    /// Queue for uniform uploads.
    pub queue: &'a wgpu::Queue,
    /// Shared shader template engine + module cache.
    pub shaders: &'a mut ShaderManager,
    /// Per-frame configuration (tone mapping, exposure, clear behavior).
    pub frame: &'a FrameSettings,
    /// The screen view targeted by passes with `render_to_screen` set.
    /// `None` for purely off-screen composition.
    pub screen: Option<&'a Tracked<wgpu::TextureView>>,
    /// Color format of the screen view (for pipeline creation).
    pub screen_format: wgpu::TextureFormat,
}

impl<'a> FrameContext<'a> {
    /// Creates an off-screen frame context (no screen target).
    pub fn new(
        gpu: &'a crate::context::GpuContext,
        shaders: &'a mut ShaderManager,
        frame: &'a FrameSettings,
    ) -> Self {
        Self {
            device: &gpu.device,
            queue: &gpu.queue,
            shaders,
            frame,
            screen: None,
            screen_format: wgpu::TextureFormat::Bgra8UnormSrgb,
        }
    }

    /// Attaches a screen view for passes with `render_to_screen` set.
    #[must_use]
    pub fn with_screen(
        mut self,
        view: &'a Tracked<wgpu::TextureView>,
        format: wgpu::TextureFormat,
    ) -> Self {
        self.screen = Some(view);
        self.screen_format = format;
        self
    }
}

/// An abstract render step in the post-processing chain.
pub trait EffectPass {
    /// Pass name, for labels and diagnostics.
    fn name(&self) -> &str;

    /// Scheduling flags read by the composer.
    fn options(&self) -> &PassOptions;

    /// Mutable access to the scheduling flags.
    fn options_mut(&mut self) -> &mut PassOptions;

    /// Records this pass's GPU work.
    ///
    /// `read` is the previous pass's output and must not be written;
    /// `write` is this pass's target unless `render_to_screen` routes the
    /// output to `ctx.screen`. Both are borrowed for this call only.
    fn render(
        &mut self,
        ctx: &mut FrameContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        write: &RenderTarget,
        read: &RenderTarget,
    );

    /// Called when the composition resolution changes. Default: no-op —
    /// the built-in passes carry no resolution-dependent resources.
    fn set_size(&mut self, _width: u32, _height: u32) {}

    /// Releases GPU resources. Default: no-op. Rendering after `dispose`
    /// is undefined.
    fn dispose(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_classic_pass() {
        let options = PassOptions::default();
        assert!(options.enabled);
        assert!(options.needs_swap);
        assert!(!options.clear);
        assert!(!options.render_to_screen);
    }
}
