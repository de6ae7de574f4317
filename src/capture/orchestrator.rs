//! Render buffer creation, binding and capture refresh for camera rigs.

use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};

use super::persist::{AssetPath, PersistSummary};
use super::{BufferDesc, CaptureChannel, CaptureConfig, RenderBuffer};
use crate::host::{
    ActorClass, ActorId, AssetStore, CaptureBackend, ComponentId, Scheduler,
    TimerHandle, World,
};
use crate::options::CaptureOptions;

/// Lifecycle of a [`CaptureBufferOrchestrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// No detection pass has completed yet.
    Uninitialized,
    /// A detection pass is running.
    Detecting,
    /// Buffers are bound; periodic updates were never started.
    Configured,
    /// Buffers are bound and periodic capture refresh is scheduled.
    PeriodicActive,
    /// Buffers are bound and periodic capture refresh was stopped.
    PeriodicStopped,
}

/// What a fired timer handle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Ran a detection pass that created this many buffers.
    Detected(usize),
    /// Triggered this many on-demand captures.
    ForcedUpdate(usize),
    /// The handle does not belong to this orchestrator.
    Ignored,
}

/// Number of buffers per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelCounts {
    /// RGB buffers.
    pub rgb: usize,
    /// Raw depth buffers.
    pub raw_depth: usize,
    /// Normalized depth buffers.
    pub normalized_depth: usize,
    /// Normal buffers.
    pub normal: usize,
}

impl ChannelCounts {
    /// Sum over all channels.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.rgb + self.raw_depth + self.normalized_depth + self.normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Detecting,
    Configured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Periodic {
    Idle,
    Active(TimerHandle),
    Stopped,
}

/// Discovers camera rigs of a target class, gives each one a render buffer
/// per enabled channel and keeps on-demand captures fresh.
///
/// Per camera, channels are processed in [`CaptureChannel::ALL`] order. RGB,
/// raw depth and normal bind to the camera's capture components by position
/// (slots 0, 1 and 2 of the components the host reports, excluding ones this
/// orchestrator attached itself). Normalized depth always gets a dedicated
/// component, attached on first detection and reused afterwards.
///
/// The orchestrator holds weak handles only. Re-running detection discards
/// the previous buffer list without freeing it; whatever retains those
/// buffers (the host, an asset store) keeps them alive.
pub struct CaptureBufferOrchestrator {
    options: CaptureOptions,
    target_class: Option<ActorClass>,
    phase: Phase,
    periodic: Periodic,
    pending_detection: Option<TimerHandle>,
    pending_force_update: Option<TimerHandle>,
    buffers: Vec<RenderBuffer>,
    /// Normalized-depth components attached per camera.
    attached_depth: FxHashMap<ActorId, ComponentId>,
    asset_store: Option<Box<dyn AssetStore>>,
}

impl CaptureBufferOrchestrator {
    /// Orchestrator with no target class and no asset store.
    #[must_use]
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            options,
            target_class: None,
            phase: Phase::Uninitialized,
            periodic: Periodic::Idle,
            pending_detection: None,
            pending_force_update: None,
            buffers: Vec::new(),
            attached_depth: FxHashMap::default(),
            asset_store: None,
        }
    }

    /// Builder-style [`set_target_class`](Self::set_target_class).
    #[must_use]
    pub fn with_target_class(mut self, class: ActorClass) -> Self {
        self.target_class = Some(class);
        self
    }

    /// Builder-style [`set_asset_store`](Self::set_asset_store).
    #[must_use]
    pub fn with_asset_store(mut self, store: Box<dyn AssetStore>) -> Self {
        self.asset_store = Some(store);
        self
    }

    /// Class of camera rigs to detect.
    pub fn set_target_class(&mut self, class: Option<ActorClass>) {
        self.target_class = class;
    }

    /// Install or remove the asset store used by
    /// [`persist_buffers`](Self::persist_buffers).
    pub fn set_asset_store(&mut self, store: Option<Box<dyn AssetStore>>) {
        self.asset_store = store;
    }

    /// Change the periodic refresh interval. Takes effect on the next
    /// [`start_periodic_updates`](Self::start_periodic_updates).
    pub fn set_update_interval(&mut self, secs: f32) {
        self.options.update_interval_secs = secs;
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Target class filter, if set.
    #[must_use]
    pub fn target_class(&self) -> Option<&ActorClass> {
        self.target_class.as_ref()
    }

    /// Settings applied to every capture component.
    #[must_use]
    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig::from_options(&self.options)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> OrchestratorState {
        match (self.phase, self.periodic) {
            (Phase::Uninitialized, _) => OrchestratorState::Uninitialized,
            (Phase::Detecting, _) => OrchestratorState::Detecting,
            (Phase::Configured, Periodic::Idle) => {
                OrchestratorState::Configured
            }
            (Phase::Configured, Periodic::Active(_)) => {
                OrchestratorState::PeriodicActive
            }
            (Phase::Configured, Periodic::Stopped) => {
                OrchestratorState::PeriodicStopped
            }
        }
    }

    /// Whether a periodic refresh is scheduled.
    #[must_use]
    pub fn is_periodic_active(&self) -> bool {
        matches!(self.periodic, Periodic::Active(_))
    }

    /// Buffers created by the latest detection pass.
    #[must_use]
    pub fn buffers(&self) -> &[RenderBuffer] {
        &self.buffers
    }

    /// Buffers of one channel, in camera order.
    pub fn buffers_for(
        &self,
        channel: CaptureChannel,
    ) -> impl Iterator<Item = &RenderBuffer> + '_ {
        self.buffers.iter().filter(move |b| b.channel == channel)
    }

    /// Buffer count per channel.
    #[must_use]
    pub fn channel_counts(&self) -> ChannelCounts {
        let mut counts = ChannelCounts::default();
        for buffer in &self.buffers {
            match buffer.channel {
                CaptureChannel::Rgb => counts.rgb += 1,
                CaptureChannel::RawDepth => counts.raw_depth += 1,
                CaptureChannel::NormalizedDepth => {
                    counts.normalized_depth += 1;
                }
                CaptureChannel::Normal => counts.normal += 1,
            }
        }
        counts
    }

    /// Live instances of the target class, in host order.
    pub fn target_instances<W: World + ?Sized>(&self, world: &W) -> Vec<ActorId> {
        let Some(class) = &self.target_class else {
            return Vec::new();
        };
        if !world.is_active() {
            return Vec::new();
        }
        world
            .find_all_of_class(class)
            .into_iter()
            .filter(|&actor| world.is_actor_alive(actor))
            .collect()
    }

    // -- Scheduling ------------------------------------------------------

    /// Schedule the first detection pass after the configured initial delay
    /// and start periodic refresh when every-frame capture is forced and an
    /// interval is set. A non-positive delay detects immediately.
    pub fn begin_play<H>(&mut self, host: &mut H)
    where
        H: World + CaptureBackend + Scheduler + ?Sized,
    {
        if !host.is_active() {
            log::error!("world is not active; capture setup not scheduled");
            return;
        }

        if let Some(old) = self.pending_detection.take() {
            let _ = host.cancel(old);
        }
        let delay_secs = self.options.initial_detection_delay_secs;
        if delay_secs > 0.0 {
            if let Some(delay) = positive_secs(delay_secs) {
                self.pending_detection = Some(host.schedule_after(delay, false));
                log::info!(
                    "render buffer detection scheduled in {:.2}s",
                    delay.as_secs_f32()
                );
            } else {
                log::error!(
                    "initial detection delay {delay_secs}s is out of range; \
                     detection not scheduled"
                );
            }
        } else {
            let _ = self.detect_and_configure(host);
            let _ = self.schedule_post_configure_capture(host);
        }

        if self.options.force_every_frame
            && self.options.update_interval_secs > 0.0
        {
            let _ = self.start_periodic_updates(host);
        }
    }

    /// Dispatch a fired timer. Hosts call this for every handle their
    /// scheduler reports; foreign handles are ignored.
    pub fn on_timer<H>(&mut self, host: &mut H, handle: TimerHandle) -> TimerOutcome
    where
        H: World + CaptureBackend + Scheduler + ?Sized,
    {
        if self.pending_detection == Some(handle) {
            self.pending_detection = None;
            let created = self.detect_and_configure(host);
            let _ = self.schedule_post_configure_capture(host);
            return TimerOutcome::Detected(created);
        }
        if self.pending_force_update == Some(handle) {
            self.pending_force_update = None;
            return TimerOutcome::ForcedUpdate(self.force_update_all(host));
        }
        if self.periodic == Periodic::Active(handle) {
            return TimerOutcome::ForcedUpdate(self.force_update_all(host));
        }
        TimerOutcome::Ignored
    }

    /// Schedule one forced capture after the post-configure delay so
    /// on-demand components show content right after detection. Replaces a
    /// pending one; `None` when the delay is disabled.
    pub fn schedule_post_configure_capture<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
    ) -> Option<TimerHandle> {
        let delay =
            positive_secs(self.options.post_configure_capture_delay_secs)?;
        if let Some(old) = self.pending_force_update.take() {
            let _ = scheduler.cancel(old);
        }
        let handle = scheduler.schedule_after(delay, false);
        self.pending_force_update = Some(handle);
        Some(handle)
    }

    /// Schedule [`force_update_all`](Self::force_update_all) every update
    /// interval, replacing any running schedule. Returns `false` when the
    /// interval is not positive.
    pub fn start_periodic_updates<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
    ) -> bool {
        let Some(interval) = positive_secs(self.options.update_interval_secs)
        else {
            log::warn!(
                "periodic updates need a positive interval that fits a \
                 timer (got {})",
                self.options.update_interval_secs
            );
            return false;
        };

        if let Periodic::Active(old) = self.periodic {
            let _ = scheduler.cancel(old);
        }
        self.periodic = Periodic::Active(scheduler.schedule_after(interval, true));
        log::info!(
            "started periodic render target updates every {:.2}s",
            interval.as_secs_f32()
        );
        true
    }

    /// Cancel periodic refresh. Returns `false` if none was running.
    pub fn stop_periodic_updates<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
    ) -> bool {
        let Periodic::Active(handle) = self.periodic else {
            return false;
        };
        let _ = scheduler.cancel(handle);
        self.periodic = Periodic::Stopped;
        log::info!("stopped periodic render target updates");
        true
    }

    // -- Detection -------------------------------------------------------

    /// Discover target cameras, create and bind one buffer per enabled
    /// channel, then apply the capture configuration to every component.
    /// Returns the number of buffers created and bound; 0 when the target
    /// class is unset or the world is inactive.
    pub fn detect_and_configure<H>(&mut self, host: &mut H) -> usize
    where
        H: World + CaptureBackend + ?Sized,
    {
        let Some(class) = self.target_class.clone() else {
            log::error!("no target class set; render buffer detection skipped");
            return 0;
        };
        if !host.is_active() {
            log::error!("world is not active; render buffer detection skipped");
            return 0;
        }

        log::info!("detecting '{class}' instances for render buffers");
        self.phase = Phase::Detecting;

        let discarded = std::mem::take(&mut self.buffers);
        if !discarded.is_empty() {
            log::debug!(
                "discarding {} buffers from the previous detection",
                discarded.len()
            );
        }
        self.attached_depth
            .retain(|_, component| host.is_component_alive(*component));

        let cameras = host.find_all_of_class(&class);
        for (i, &actor) in cameras.iter().enumerate() {
            let camera_index = i + 1;
            if !host.is_actor_alive(actor) {
                log::warn!("camera {camera_index} ({actor}) is gone, skipping");
                continue;
            }
            self.create_buffers_for(host, actor, camera_index);
        }

        let configured = self.configure_capture_settings(host);
        self.phase = Phase::Configured;

        let counts = self.channel_counts();
        log::info!(
            "detection complete: {} RGB, {} raw depth, {} ML depth, {} normal \
             buffers for {} cameras ({configured} components configured)",
            counts.rgb,
            counts.raw_depth,
            counts.normalized_depth,
            counts.normal,
            cameras.len(),
        );
        self.buffers.len()
    }

    fn create_buffers_for<H>(
        &mut self,
        host: &mut H,
        actor: ActorId,
        camera_index: usize,
    ) where
        H: World + CaptureBackend + ?Sized,
    {
        let discovered: Vec<ComponentId> = host
            .capture_components(actor)
            .into_iter()
            .filter(|c| !self.is_attached_depth(*c))
            .collect();

        for channel in CaptureChannel::ALL {
            if !channel.is_enabled(&self.options.channels) {
                continue;
            }

            let component = match channel.capture_slot() {
                Some(slot) => {
                    let Some(&component) = discovered.get(slot) else {
                        log::debug!(
                            "camera {camera_index}: no capture slot {slot}, \
                             {channel:?} skipped"
                        );
                        continue;
                    };
                    component
                }
                None => {
                    let Some(component) =
                        self.normalized_depth_component(host, actor)
                    else {
                        log::warn!(
                            "camera {camera_index}: could not attach a \
                             normalized depth capture"
                        );
                        continue;
                    };
                    component
                }
            };

            if let Some(buffer) = self.create_and_bind(
                host,
                actor,
                camera_index,
                channel,
                component,
            ) {
                self.buffers.push(buffer);
            }
        }
    }

    fn is_attached_depth(&self, component: ComponentId) -> bool {
        self.attached_depth.values().any(|&c| c == component)
    }

    fn normalized_depth_component<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        actor: ActorId,
    ) -> Option<ComponentId> {
        if let Some(&component) = self.attached_depth.get(&actor) {
            if world.is_component_alive(component) {
                return Some(component);
            }
        }
        let component = world.attach_capture_component(actor)?;
        let _ = self.attached_depth.insert(actor, component);
        Some(component)
    }

    fn create_and_bind<H>(
        &self,
        host: &mut H,
        actor: ActorId,
        camera_index: usize,
        channel: CaptureChannel,
        component: ComponentId,
    ) -> Option<RenderBuffer>
    where
        H: World + CaptureBackend + ?Sized,
    {
        if !host.is_component_alive(component) {
            log::warn!(
                "camera {camera_index}: {component} is gone, {channel:?} skipped"
            );
            return None;
        }

        let desc = BufferDesc::new(
            self.options.width,
            self.options.height,
            channel.pixel_format(),
        );
        let Some(id) = host.allocate_buffer(&desc) else {
            log::warn!(
                "camera {camera_index}: {channel:?} buffer allocation failed"
            );
            return None;
        };
        if !host.bind(component, id) {
            log::warn!("camera {camera_index}: could not bind {id} to {component}");
            return None;
        }
        host.set_capture_source(
            component,
            channel.capture_source(self.options.max_depth_distance()),
        );
        host.apply_config(component, &self.capture_config());

        log::debug!("camera {camera_index}: {channel:?} {id} bound to {component}");
        Some(RenderBuffer {
            id,
            desc,
            channel,
            camera_index,
            actor,
            bound_component: Some(component),
        })
    }

    // -- Capture control -------------------------------------------------

    /// Apply [`capture_config`](Self::capture_config) to every live capture
    /// component on every live target instance. Returns the number of
    /// components configured.
    pub fn configure_capture_settings<H>(&self, host: &mut H) -> usize
    where
        H: World + CaptureBackend + ?Sized,
    {
        let config = self.capture_config();
        let mut configured = 0;
        for actor in self.target_instances(host) {
            for component in host.capture_components(actor) {
                if host.is_component_alive(component) {
                    host.apply_config(component, &config);
                    configured += 1;
                }
            }
        }
        log::debug!(
            "configured {configured} capture components (every frame: {})",
            config.every_frame_capture
        );
        configured
    }

    /// Trigger one capture on every bound component that is not already
    /// capturing every frame. Returns the number of captures triggered.
    pub fn force_update_all<H>(&self, host: &mut H) -> usize
    where
        H: World + CaptureBackend + ?Sized,
    {
        let mut seen = FxHashSet::default();
        let mut triggered = 0;
        for actor in self.target_instances(host) {
            for component in host.capture_components(actor) {
                if !seen.insert(component)
                    || !host.is_component_alive(component)
                    || host.bound_buffer(component).is_none()
                    || host.captures_every_frame(component)
                {
                    continue;
                }
                if host.trigger_capture(component) {
                    triggered += 1;
                }
            }
        }
        log::debug!("force updated {triggered} capture components");
        triggered
    }

    // -- Persistence -----------------------------------------------------

    /// Write every current buffer to the asset store as
    /// `RenderTargets/RT_<channel>_Camera_<n>`. Without a store nothing is
    /// written. Failures are counted, in-memory buffers are kept either way.
    pub fn persist_buffers(&mut self) -> PersistSummary {
        let mut summary = PersistSummary::default();
        let Some(store) = self.asset_store.as_mut() else {
            log::warn!("no asset store available; buffers stay in memory only");
            return summary;
        };

        for buffer in &self.buffers {
            let path =
                AssetPath::render_target(buffer.channel, buffer.camera_index);
            match store.persist(buffer, &path) {
                Ok(()) => summary.persisted += 1,
                Err(e) => {
                    log::warn!("{e}");
                    summary.failed += 1;
                }
            }
        }
        log::info!(
            "persisted {} render targets ({} failed)",
            summary.persisted,
            summary.failed
        );
        summary
    }
}

/// Non-zero duration for a positive number of seconds. `None` for zero,
/// negative or NaN input and for values a `Duration` cannot hold or rounds
/// down to zero.
fn positive_secs(secs: f32) -> Option<Duration> {
    if secs.is_nan() || secs <= 0.0 {
        return None;
    }
    let delay = Duration::try_from_secs_f32(secs)
        .ok()
        .filter(|d| !d.is_zero());
    if delay.is_none() {
        log::warn!("{secs}s is outside the range a timer can represent");
    }
    delay
}
