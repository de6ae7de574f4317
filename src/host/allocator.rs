use rustc_hash::FxHashMap;

use super::BufferId;
use crate::capture::BufferDesc;

/// Backing storage for render buffers.
///
/// [`HeadlessHost`](super::headless::HeadlessHost) delegates
/// [`CaptureBackend::allocate_buffer`](super::CaptureBackend::allocate_buffer)
/// to an allocator, so the same host can run with bookkeeping-only buffers
/// ([`CpuBufferAllocator`]) or real GPU textures
/// ([`GpuBufferAllocator`](crate::gpu::GpuBufferAllocator)).
pub trait BufferAllocator {
    /// Allocate a buffer described by `desc`.
    fn allocate(&mut self, desc: &BufferDesc) -> Option<BufferId>;

    /// Free a buffer. Returns `false` for unknown ids.
    fn release(&mut self, id: BufferId) -> bool;

    /// Whether `id` refers to a live buffer.
    fn is_alive(&self, id: BufferId) -> bool;

    /// Descriptor of a live buffer.
    fn desc(&self, id: BufferId) -> Option<&BufferDesc>;

    /// Number of live buffers.
    fn live_count(&self) -> usize;
}

/// Allocator that only records descriptors.
#[derive(Debug, Default)]
pub struct CpuBufferAllocator {
    next_id: u64,
    buffers: FxHashMap<BufferId, BufferDesc>,
    /// Upper bound on live bytes (`None` = unlimited).
    byte_budget: Option<u64>,
}

impl CpuBufferAllocator {
    /// Allocator without a memory budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator that refuses allocations beyond `bytes` of live buffers.
    #[must_use]
    pub fn with_byte_budget(bytes: u64) -> Self {
        Self {
            byte_budget: Some(bytes),
            ..Self::default()
        }
    }

    /// Total bytes held by live buffers.
    #[must_use]
    pub fn live_bytes(&self) -> u64 {
        self.buffers.values().map(BufferDesc::byte_size).sum()
    }
}

impl BufferAllocator for CpuBufferAllocator {
    fn allocate(&mut self, desc: &BufferDesc) -> Option<BufferId> {
        if desc.width == 0 || desc.height == 0 {
            return None;
        }
        if let Some(budget) = self.byte_budget {
            if self.live_bytes() + desc.byte_size() > budget {
                return None;
            }
        }
        self.next_id += 1;
        let id = BufferId::from_raw(self.next_id);
        let _ = self.buffers.insert(id, desc.clone());
        Some(id)
    }

    fn release(&mut self, id: BufferId) -> bool {
        self.buffers.remove(&id).is_some()
    }

    fn is_alive(&self, id: BufferId) -> bool {
        self.buffers.contains_key(&id)
    }

    fn desc(&self, id: BufferId) -> Option<&BufferDesc> {
        self.buffers.get(&id)
    }

    fn live_count(&self) -> usize {
        self.buffers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PixelFormat;

    #[test]
    fn allocates_unique_ids() {
        let mut alloc = CpuBufferAllocator::new();
        let desc = BufferDesc::new(4, 4, PixelFormat::Rgba8);
        let a = alloc.allocate(&desc).unwrap();
        let b = alloc.allocate(&desc).unwrap();
        assert_ne!(a, b);
        assert_eq!(alloc.live_count(), 2);
        assert!(alloc.release(a));
        assert!(!alloc.is_alive(a));
        assert!(alloc.is_alive(b));
        assert!(!alloc.release(a));
    }

    #[test]
    fn rejects_empty_and_over_budget() {
        let mut alloc = CpuBufferAllocator::with_byte_budget(64);
        assert!(alloc
            .allocate(&BufferDesc::new(0, 4, PixelFormat::R8))
            .is_none());
        // 4x4 RGBA8 = 64 bytes fits exactly; the next one does not.
        assert!(alloc
            .allocate(&BufferDesc::new(4, 4, PixelFormat::Rgba8))
            .is_some());
        assert!(alloc
            .allocate(&BufferDesc::new(1, 1, PixelFormat::R8))
            .is_none());
        assert_eq!(alloc.live_bytes(), 64);
    }
}
