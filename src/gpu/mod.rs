//! GPU resource management for capture buffers.
//!
//! Provides a surface-less wgpu device context and an allocator that backs
//! render buffers with real off-screen textures.

mod allocator;
/// Surface-less wgpu device and queue initialization.
pub mod context;
/// Render-target texture creation.
pub mod texture;

pub use allocator::GpuBufferAllocator;
pub use context::{GpuContext, GpuContextError};
pub use texture::RenderTarget;
