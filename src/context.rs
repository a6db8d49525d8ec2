//! wgpu Context
//!
//! The [`GpuContext`] holds the core GPU handles: device and queue. It is
//! deliberately surface-free — presentation belongs to the embedding
//! application, which hands the compositor a screen `TextureView` per frame.

use crate::errors::{AfterglowError, Result};

/// Core wgpu context holding GPU handles.
///
/// This struct owns the fundamental wgpu resources needed for rendering:
/// - `device`: GPU device for resource creation
/// - `queue`: Command submission queue
///
/// All passes and the [`EffectComposer`](crate::EffectComposer) borrow these
/// handles per call; the context itself carries no per-frame state.
pub struct GpuContext {
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Creates a headless context on the first compatible adapter.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| AfterglowError::AdapterRequestFailed(e.to_string()))?;

        log::debug!("Using adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Afterglow Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self { device, queue })
    }

    /// Blocking variant of [`GpuContext::new`] for synchronous entry points.
    pub fn new_blocking() -> Result<Self> {
        pollster::block_on(Self::new())
    }

    /// Wraps externally created handles (e.g. from an application that owns
    /// its own surface/swapchain setup).
    #[must_use]
    pub fn from_raw(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }
}
