//! 带唯一 ID 的资源包装器
//!
//! wgpu 资源本身没有稳定的身份标识，BindGroup 缓存需要一个廉价的
//! 失效判断依据。`Tracked<T>` 给每个资源分配进程内唯一 ID。

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

// 全局唯一 ID 生成器
static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A GPU resource paired with a process-unique id.
///
/// Passes cache bind groups keyed by the ids of the resources they bind;
/// comparing ids is how a pass detects that its input view changed (for
/// example after a ping-pong swap or a resize).
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    inner: T,
    id: u64,
}

impl<T> Tracked<T> {
    /// Wraps a resource and assigns it a fresh id.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            id: next_id(),
        }
    }

    /// Unique id, usable as a bind-group cache key component.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Swaps in a new resource **and assigns a fresh id**, so any cache
    /// keyed on the old id misses. Used when a render target is resized.
    pub fn replace(&mut self, inner: T) {
        self.inner = inner;
        self.id = next_id();
    }

    /// Unwraps the inner resource.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

// 方便直接访问内部方法 (如 view.format())
impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Tracked::new(1u32);
        let b = Tracked::new(1u32);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn replace_changes_identity() {
        let mut a = Tracked::new(5u32);
        let old_id = a.id();
        a.replace(6);
        assert_ne!(a.id(), old_id);
        assert_eq!(*a, 6);
    }
}
