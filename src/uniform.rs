//! Version-Tracked Uniform Buffers
//!
//! [`UniformBuffer<T>`] keeps a CPU-side copy of a `Pod` uniform struct next
//! to its GPU buffer and uploads only when the data actually changed. Each
//! pass owns its uniforms exclusively, so no locking is involved — mutation
//! goes through [`UniformBuffer::write`], which bumps an internal version.

use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// A CPU-shadowed GPU uniform buffer with change tracking.
///
/// The GPU buffer is created lazily on first [`sync`](UniformBuffer::sync);
/// subsequent syncs issue a `write_buffer` only when the version advanced.
#[derive(Debug)]
pub struct UniformBuffer<T: Pod> {
    data: T,
    version: u64,
    synced_version: u64,
    buffer: Option<wgpu::Buffer>,
    label: &'static str,
}

impl<T: Pod> UniformBuffer<T> {
    /// Creates a new uniform buffer with the given initial data.
    pub fn new(data: T, label: &'static str) -> Self {
        Self {
            data,
            version: 1,
            synced_version: 0,
            buffer: None,
            label,
        }
    }

    /// Read access to the CPU-side data.
    #[inline]
    pub fn read(&self) -> &T {
        &self.data
    }

    /// Mutates the CPU-side data and marks it dirty.
    pub fn write(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.data);
        self.version += 1;
    }

    /// Current data version (bumped on every [`write`](UniformBuffer::write)).
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the GPU copy is out of date.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.version != self.synced_version
    }

    /// Ensures the GPU buffer exists and holds the current data, returning it.
    pub fn sync(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> &wgpu::Buffer {
        if self.buffer.is_none() {
            self.buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(self.label),
                contents: bytemuck::bytes_of(&self.data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }));
            self.synced_version = self.version;
        } else if self.is_dirty() {
            let buffer = self.buffer.as_ref().unwrap();
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&self.data));
            self.synced_version = self.version;
        }

        self.buffer.as_ref().unwrap()
    }

    /// Releases the GPU buffer; a later [`sync`](UniformBuffer::sync) would
    /// recreate it.
    pub fn dispose(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            buffer.destroy();
        }
        self.synced_version = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_bumps_version() {
        let mut buf = UniformBuffer::new(0.5f32, "Test Uniform");
        let v0 = buf.version();
        buf.write(|v| *v = 1.0);
        assert!(buf.version() > v0);
        assert!((*buf.read() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn starts_dirty_until_synced() {
        let buf = UniformBuffer::new([0u32; 4], "Test Uniform");
        assert!(buf.is_dirty());
    }
}
