//! Off-screen Render Targets
//!
//! A [`RenderTarget`] is an owned color buffer that a pass can render into
//! and a later pass can sample from. The [`EffectComposer`](crate::EffectComposer)
//! owns a ping-pong pair of these; passes only ever borrow them per call.

use glam::UVec2;

use crate::errors::{AfterglowError, Result};
use crate::tracked::Tracked;

/// An off-screen color buffer with a sampleable view.
///
/// The texture always carries `RENDER_ATTACHMENT | TEXTURE_BINDING` usage so
/// it can serve as both a pass output and a pass input. [`RenderTarget::resize`]
/// recreates the texture; the view is [`Tracked`], so its identity changes on
/// resize and downstream bind-group caches miss as intended.
#[derive(Debug)]
pub struct RenderTarget {
    texture: wgpu::Texture,
    view: Tracked<wgpu::TextureView>,
    size: UVec2,
    format: wgpu::TextureFormat,
    label: &'static str,
}

impl RenderTarget {
    /// Creates a new render target.
    ///
    /// Returns [`AfterglowError::InvalidTargetSize`] for zero dimensions.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &'static str,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AfterglowError::InvalidTargetSize { width, height });
        }

        let texture = Self::create_texture(device, width, height, format, label);
        let view = Tracked::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));

        Ok(Self {
            texture,
            view,
            size: UVec2::new(width, height),
            format,
            label,
        })
    }

    fn create_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &'static str,
    ) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    /// Recreates the underlying texture at a new resolution.
    ///
    /// The old contents are discarded. The view identity changes, which
    /// invalidates any bind group cached against it.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!(
                "Ignoring degenerate resize of '{}' to {width}x{height}",
                self.label
            );
            return;
        }
        if self.size == UVec2::new(width, height) {
            return;
        }

        self.texture.destroy();
        self.texture = Self::create_texture(device, width, height, self.format, self.label);
        self.view
            .replace(self.texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.size = UVec2::new(width, height);
    }

    /// Sampleable view of the color buffer (with stable identity).
    #[inline]
    #[must_use]
    pub fn view(&self) -> &Tracked<wgpu::TextureView> {
        &self.view
    }

    /// The underlying texture (for copies / readback).
    #[inline]
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Current size in pixels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Color format of the buffer.
    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Releases the GPU texture. The target must not be rendered afterwards.
    pub fn dispose(&self) {
        self.texture.destroy();
    }
}
