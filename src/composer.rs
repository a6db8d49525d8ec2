//! Effect Composer
//!
//! Drives an ordered chain of [`EffectPass`]es over a ping-pong pair of
//! HDR render targets. Each pass reads the previous pass's output and
//! writes the next intermediate (or the screen, for the terminal pass).
//!
//! # Buffer Rotation
//!
//! ```text
//! frame start:      write = A, read = B      (deterministic reset)
//! pass 0 renders →  A                        (reads B)
//! swap              write = B, read = A
//! pass 1 renders →  B                        (reads A)
//! ...
//! ```
//!
//! A pass with `needs_swap = false` leaves the pair in place, so a later
//! pass still reads the same accumulated image.

use crate::context::GpuContext;
use crate::errors::Result;
use crate::pass::{EffectPass, FrameContext};
use crate::target::RenderTarget;
use crate::HDR_TEXTURE_FORMAT;

/// Which of the two targets is currently written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PingPong {
    write_is_a: bool,
}

impl PingPong {
    const fn new() -> Self {
        Self { write_is_a: true }
    }

    fn reset(&mut self) {
        self.write_is_a = true;
    }

    fn swap(&mut self) {
        self.write_is_a = !self.write_is_a;
    }

    fn write_index(self) -> usize {
        usize::from(!self.write_is_a)
    }

    fn read_index(self) -> usize {
        usize::from(self.write_is_a)
    }
}

/// Ordered post-processing chain over a ping-pong target pair.
pub struct EffectComposer {
    passes: Vec<Box<dyn EffectPass>>,
    /// [A, B]; `flip` decides which is written
    targets: [RenderTarget; 2],
    flip: PingPong,
}

impl EffectComposer {
    /// Creates a composer with two HDR intermediates of the given size.
    ///
    /// # Errors
    ///
    /// Fails when either dimension is zero.
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            passes: Vec::new(),
            targets: [
                RenderTarget::new(
                    device,
                    width,
                    height,
                    HDR_TEXTURE_FORMAT,
                    "Composer Target A",
                )?,
                RenderTarget::new(
                    device,
                    width,
                    height,
                    HDR_TEXTURE_FORMAT,
                    "Composer Target B",
                )?,
            ],
            flip: PingPong::new(),
        })
    }

    /// Appends a pass to the end of the chain.
    pub fn add_pass(&mut self, pass: Box<dyn EffectPass>) {
        self.passes.push(pass);
    }

    /// Inserts a pass at `index`, shifting later passes back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, like [`Vec::insert`].
    pub fn insert_pass(&mut self, index: usize, pass: Box<dyn EffectPass>) {
        self.passes.insert(index, pass);
    }

    /// Number of passes in the chain.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// The target the next pass will write.
    #[must_use]
    pub fn write_target(&self) -> &RenderTarget {
        &self.targets[self.flip.write_index()]
    }

    /// The target the next pass will read.
    #[must_use]
    pub fn read_target(&self) -> &RenderTarget {
        &self.targets[self.flip.read_index()]
    }

    /// Runs every enabled pass in order and submits one command buffer.
    ///
    /// The rotation is reset at the start of each call, so a frame always
    /// begins writing target A — pass output placement is deterministic
    /// regardless of how the previous frame ended.
    pub fn render(&mut self, gpu: &GpuContext, ctx: &mut FrameContext<'_>) {
        self.flip.reset();

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Composer Encoder"),
            });

        for pass in &mut self.passes {
            if !pass.options().enabled {
                continue;
            }

            let [a, b] = &self.targets;
            let (write, read) = if self.flip.write_is_a { (a, b) } else { (b, a) };

            pass.render(ctx, &mut encoder, write, read);

            if pass.options().needs_swap {
                self.flip.swap();
            }
        }

        gpu.queue.submit(Some(encoder.finish()));
    }

    /// Resizes both intermediates and notifies every pass. Degenerate
    /// dimensions are ignored with a warning, matching [`RenderTarget::resize`].
    pub fn set_size(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        for target in &mut self.targets {
            target.resize(device, width, height);
        }
        for pass in &mut self.passes {
            pass.set_size(width, height);
        }
    }

    /// Releases GPU resources held by the chain and the target pair.
    pub fn dispose(&mut self) {
        for pass in &mut self.passes {
            pass.dispose();
        }
        for target in &mut self.targets {
            target.dispose();
        }
    }
}
