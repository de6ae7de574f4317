//! Multi-channel render buffers for camera rigs.
//!
//! [`CaptureBufferOrchestrator`] finds camera rigs in the world, creates one
//! [`RenderBuffer`] per enabled [`CaptureChannel`], binds each buffer to a
//! capture component and keeps on-demand captures refreshed. Buffers can be
//! persisted as named assets through an optional
//! [`AssetStore`](crate::host::AssetStore).

mod buffer;
mod channel;
mod config;
mod orchestrator;
pub mod persist;

pub use buffer::{BufferDesc, RenderBuffer};
pub use channel::{CaptureChannel, CaptureSource, PixelFormat};
pub use config::CaptureConfig;
pub use orchestrator::{
    CaptureBufferOrchestrator, ChannelCounts, OrchestratorState, TimerOutcome,
};
pub use persist::{asset_name, AssetPath, FsAssetStore, PersistSummary};
