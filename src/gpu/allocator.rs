use rustc_hash::FxHashMap;

use super::context::GpuContext;
use super::texture::RenderTarget;
use crate::capture::BufferDesc;
use crate::host::{BufferAllocator, BufferId};

/// [`BufferAllocator`] backed by wgpu render-target textures.
pub struct GpuBufferAllocator {
    context: GpuContext,
    next_id: u64,
    targets: FxHashMap<BufferId, RenderTarget>,
}

impl GpuBufferAllocator {
    /// Allocator creating textures on `context`'s device.
    #[must_use]
    pub fn new(context: GpuContext) -> Self {
        Self {
            context,
            next_id: 0,
            targets: FxHashMap::default(),
        }
    }
}

impl BufferAllocator for GpuBufferAllocator {
    fn allocate(&mut self, desc: &BufferDesc) -> Option<BufferId> {
        let max = self.context.device.limits().max_texture_dimension_2d;
        if desc.width == 0
            || desc.height == 0
            || desc.width > max
            || desc.height > max
        {
            log::warn!(
                "render target {}x{} outside device limits (max {max})",
                desc.width,
                desc.height
            );
            return None;
        }
        self.next_id += 1;
        let id = BufferId::from_raw(self.next_id);
        let target =
            RenderTarget::new(&self.context.device, &format!("RenderTarget {id}"), desc);
        let _ = self.targets.insert(id, target);
        Some(id)
    }

    fn release(&mut self, id: BufferId) -> bool {
        match self.targets.remove(&id) {
            Some(target) => {
                target.texture.destroy();
                true
            }
            None => false,
        }
    }

    fn is_alive(&self, id: BufferId) -> bool {
        self.targets.contains_key(&id)
    }

    fn desc(&self, id: BufferId) -> Option<&BufferDesc> {
        self.targets.get(&id).map(|t| &t.desc)
    }

    fn live_count(&self) -> usize {
        self.targets.len()
    }
}
