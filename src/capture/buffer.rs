use serde::{Deserialize, Serialize};

use super::{CaptureChannel, PixelFormat};
use crate::host::{ActorId, BufferId, ComponentId};

/// Allocation request for an off-screen render buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl BufferDesc {
    /// Descriptor for a `width`×`height` buffer of `format`.
    #[must_use]
    pub const fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Size of the pixel storage in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        u64::from(self.width)
            * u64::from(self.height)
            * u64::from(self.format.bytes_per_pixel())
    }
}

/// A render buffer created by the orchestrator for one camera and channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBuffer {
    /// Host buffer handle.
    pub id: BufferId,
    /// Size and pixel layout.
    pub desc: BufferDesc,
    /// Semantic channel.
    pub channel: CaptureChannel,
    /// 1-based position of the camera in the detection pass.
    pub camera_index: usize,
    /// Camera rig that owns the bound component.
    pub actor: ActorId,
    /// Capture component the buffer was bound to (weak).
    pub bound_component: Option<ComponentId>,
}

impl RenderBuffer {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Pixel layout.
    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }
}
