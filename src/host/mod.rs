//! Capabilities the core borrows from the host engine.
//!
//! The spawner and the orchestrator never reach into global engine state.
//! Every operation receives the host explicitly through one of the traits
//! below, and every handle it gets back is a weak reference: a relation plus
//! a lookup, never ownership. Hosts may destroy actors and components at any
//! time, so callers check liveness before each use.
//!
//! [`headless::HeadlessHost`] is a complete in-memory implementation used by
//! the test-suite and the `synthcap` tool.

mod allocator;
mod handle;
pub mod headless;
pub mod timer;

use std::time::Duration;

pub use allocator::{BufferAllocator, CpuBufferAllocator};
pub use handle::{ActorClass, ActorId, BufferId, ComponentId, Pose, TimerHandle};

use crate::capture::{
    AssetPath, BufferDesc, CaptureConfig, CaptureSource, RenderBuffer,
};
use crate::error::SynthcapError;

/// Actor instantiation, enumeration and component discovery.
pub trait World {
    /// Whether the world is running and accepts spawn/enumeration calls.
    fn is_active(&self) -> bool;

    /// Instantiate `class` at `pose`. `None` when the host rejects the spawn
    /// (unknown class, collision handling, world shutting down).
    fn spawn(
        &mut self,
        class: &ActorClass,
        pose: Pose,
        name: &str,
    ) -> Option<ActorId>;

    /// All live actors of `class`, in host enumeration order.
    fn find_all_of_class(&self, class: &ActorClass) -> Vec<ActorId>;

    /// Whether `actor` still refers to a live actor.
    fn is_actor_alive(&self, actor: ActorId) -> bool;

    /// Current pose of a live actor.
    fn actor_pose(&self, actor: ActorId) -> Option<Pose>;

    /// Capture components on `actor`, in discovery order. Empty for dead
    /// actors.
    fn capture_components(&self, actor: ActorId) -> Vec<ComponentId>;

    /// Create a new capture component and attach it to `actor`.
    fn attach_capture_component(
        &mut self,
        actor: ActorId,
    ) -> Option<ComponentId>;

    /// Whether `component` still refers to a live capture component.
    fn is_component_alive(&self, component: ComponentId) -> bool;
}

/// Render-buffer allocation and scene-capture control.
pub trait CaptureBackend {
    /// Allocate an off-screen render buffer.
    fn allocate_buffer(&mut self, desc: &BufferDesc) -> Option<BufferId>;

    /// Bind `buffer` as the output of `component`, replacing any previous
    /// binding. The previously bound buffer is left alive.
    fn bind(&mut self, component: ComponentId, buffer: BufferId) -> bool;

    /// Select what the component renders into its buffer.
    fn set_capture_source(
        &mut self,
        component: ComponentId,
        source: CaptureSource,
    );

    /// Apply capture-quality settings and activate the component.
    fn apply_config(&mut self, component: ComponentId, config: &CaptureConfig);

    /// Whether the component already captures on every frame.
    fn captures_every_frame(&self, component: ComponentId) -> bool;

    /// Buffer currently bound to the component.
    fn bound_buffer(&self, component: ComponentId) -> Option<BufferId>;

    /// Render one capture now. Returns `false` if nothing was captured.
    fn trigger_capture(&mut self, component: ComponentId) -> bool;
}

/// Deferred callbacks against the host's frame loop.
///
/// Firing is reported back to the owner of the handle (see
/// [`CaptureBufferOrchestrator::on_timer`](crate::capture::CaptureBufferOrchestrator::on_timer)).
pub trait Scheduler {
    /// Schedule a timer firing after `delay`, re-arming every `delay` when
    /// `repeat` is set.
    fn schedule_after(&mut self, delay: Duration, repeat: bool) -> TimerHandle;

    /// Cancel a timer. Returns `false` if it was not pending.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// Addressable asset storage, present only in tooling contexts.
pub trait AssetStore {
    /// Persist a render buffer under `path`.
    fn persist(
        &mut self,
        buffer: &RenderBuffer,
        path: &AssetPath,
    ) -> Result<(), SynthcapError>;
}
