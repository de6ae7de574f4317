//! In-memory host world for tooling and tests.
//!
//! [`HeadlessHost`] keeps actors and capture components in generational
//! slot arrays, delegates buffer storage to a [`BufferAllocator`] and runs
//! timers on a virtual clock ([`TimerQueue`]). Nothing is rendered: a
//! triggered capture only bumps the component's capture counter.

use std::time::Duration;

use glam::Vec3;
use rustc_hash::FxHashMap;

use super::timer::TimerQueue;
use super::{
    ActorClass, ActorId, BufferAllocator, BufferId, CaptureBackend,
    ComponentId, CpuBufferAllocator, Pose, Scheduler, TimerHandle, World,
};
use crate::capture::{BufferDesc, CaptureConfig, CaptureSource};

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational slot storage; freed slots are reused with a bumped
/// generation.
#[derive(Debug)]
struct Slots<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, value: T) -> (u32, u32) {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return (index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        (index, 0)
    }

    fn get(&self, index: u32, generation: u32) -> Option<&T> {
        self.slots
            .get(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_ref())
    }

    fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut T> {
        self.slots
            .get_mut(index as usize)
            .filter(|s| s.generation == generation)
            .and_then(|s| s.value.as_mut())
    }

    fn remove(&mut self, index: u32, generation: u32) -> Option<T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(value)
    }

    fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value.as_ref().map(|v| (i as u32, s.generation, v))
        })
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }
}

#[derive(Debug)]
struct ActorEntry {
    class: ActorClass,
    pose: Pose,
    name: String,
    components: Vec<ComponentId>,
}

/// Observable state of a headless capture component.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureState {
    /// Actor the component is attached to.
    pub owner: ActorId,
    /// What the component renders.
    pub source: CaptureSource,
    /// Last applied capture settings.
    pub config: CaptureConfig,
    /// Output buffer.
    pub bound: Option<BufferId>,
    /// Set once settings have been applied.
    pub active: bool,
    /// Captures triggered through [`CaptureBackend::trigger_capture`].
    pub capture_count: u32,
}

impl CaptureState {
    fn new(owner: ActorId) -> Self {
        Self {
            owner,
            source: CaptureSource::default(),
            config: CaptureConfig::default(),
            bound: None,
            active: false,
            capture_count: 0,
        }
    }
}

/// Self-contained world, capture backend and scheduler.
pub struct HeadlessHost {
    active: bool,
    actors: Slots<ActorEntry>,
    components: Slots<CaptureState>,
    /// Spawnable classes and the capture components each instance gets.
    templates: FxHashMap<ActorClass, usize>,
    /// Spheres (center, radius) where spawning is rejected.
    blocked: Vec<(Vec3, f32)>,
    allocator: Box<dyn BufferAllocator>,
    timers: TimerQueue,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Active host with a bookkeeping-only buffer allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(Box::new(CpuBufferAllocator::new()))
    }

    /// Active host storing buffers in `allocator`.
    #[must_use]
    pub fn with_allocator(allocator: Box<dyn BufferAllocator>) -> Self {
        Self {
            active: true,
            actors: Slots::default(),
            components: Slots::default(),
            templates: FxHashMap::default(),
            blocked: Vec::new(),
            allocator,
            timers: TimerQueue::new(),
        }
    }

    /// Start or shut down the world. An inactive world rejects spawns and
    /// enumerates nothing.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Make `class` spawnable; each instance gets `capture_components`
    /// capture components.
    pub fn register_template(
        &mut self,
        class: ActorClass,
        capture_components: usize,
    ) {
        let _ = self.templates.insert(class, capture_components);
    }

    /// Reject spawns whose position lies within `radius` of `center`.
    pub fn block_region(&mut self, center: Vec3, radius: f32) {
        self.blocked.push((center, radius));
    }

    /// Place an actor directly, bypassing templates and blocked regions.
    pub fn add_actor(
        &mut self,
        class: ActorClass,
        pose: Pose,
        name: &str,
        capture_components: usize,
    ) -> ActorId {
        let (index, generation) = self.actors.insert(ActorEntry {
            class,
            pose,
            name: name.to_owned(),
            components: Vec::new(),
        });
        let actor = ActorId::new(index, generation);
        for _ in 0..capture_components {
            let _ = self.add_component(actor);
        }
        actor
    }

    fn add_component(&mut self, actor: ActorId) -> Option<ComponentId> {
        // Check the owner before allocating a slot.
        if !self.is_actor_alive(actor) {
            return None;
        }
        let (index, generation) =
            self.components.insert(CaptureState::new(actor));
        let component = ComponentId::new(index, generation);
        let entry = self.actors.get_mut(actor.index(), actor.generation())?;
        entry.components.push(component);
        Some(component)
    }

    /// Destroy an actor and its components. Returns `false` if it was
    /// already gone.
    pub fn destroy_actor(&mut self, actor: ActorId) -> bool {
        let Some(entry) = self.actors.remove(actor.index(), actor.generation())
        else {
            return false;
        };
        for component in entry.components {
            let _ = self
                .components
                .remove(component.index(), component.generation());
        }
        true
    }

    /// Destroy a single capture component.
    pub fn destroy_component(&mut self, component: ComponentId) -> bool {
        let Some(state) = self
            .components
            .remove(component.index(), component.generation())
        else {
            return false;
        };
        let owner = state.owner;
        if let Some(entry) =
            self.actors.get_mut(owner.index(), owner.generation())
        {
            entry.components.retain(|&c| c != component);
        }
        true
    }

    /// Name given at spawn time.
    #[must_use]
    pub fn actor_name(&self, actor: ActorId) -> Option<&str> {
        self.actors
            .get(actor.index(), actor.generation())
            .map(|e| e.name.as_str())
    }

    /// Number of live actors.
    #[must_use]
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// State of a live capture component.
    #[must_use]
    pub fn capture_state(&self, component: ComponentId) -> Option<&CaptureState> {
        self.components.get(component.index(), component.generation())
    }

    /// Override a component's every-frame flag.
    pub fn set_capture_every_frame(&mut self, component: ComponentId, on: bool) {
        if let Some(state) = self
            .components
            .get_mut(component.index(), component.generation())
        {
            state.config.every_frame_capture = on;
        }
    }

    /// Buffer storage.
    #[must_use]
    pub fn allocator(&self) -> &dyn BufferAllocator {
        self.allocator.as_ref()
    }

    /// Free a buffer. Components bound to it stop counting as bound.
    pub fn release_buffer(&mut self, buffer: BufferId) -> bool {
        self.allocator.release(buffer)
    }

    /// Virtual clock and pending timers.
    #[must_use]
    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Advance the virtual clock, returning the timers that fired.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerHandle> {
        self.timers.advance(dt)
    }

    fn is_blocked(&self, position: Vec3) -> bool {
        self.blocked
            .iter()
            .any(|&(center, radius)| center.distance(position) <= radius)
    }
}

impl World for HeadlessHost {
    fn is_active(&self) -> bool {
        self.active
    }

    fn spawn(
        &mut self,
        class: &ActorClass,
        pose: Pose,
        name: &str,
    ) -> Option<ActorId> {
        if !self.active {
            return None;
        }
        let Some(&capture_components) = self.templates.get(class) else {
            log::debug!("'{class}' is not a registered template");
            return None;
        };
        if self.is_blocked(pose.position) {
            log::debug!("spawn of '{name}' blocked at {}", pose.position);
            return None;
        }
        Some(self.add_actor(class.clone(), pose, name, capture_components))
    }

    fn find_all_of_class(&self, class: &ActorClass) -> Vec<ActorId> {
        if !self.active {
            return Vec::new();
        }
        self.actors
            .iter()
            .filter(|(_, _, e)| &e.class == class)
            .map(|(index, generation, _)| ActorId::new(index, generation))
            .collect()
    }

    fn is_actor_alive(&self, actor: ActorId) -> bool {
        self.actors.get(actor.index(), actor.generation()).is_some()
    }

    fn actor_pose(&self, actor: ActorId) -> Option<Pose> {
        self.actors
            .get(actor.index(), actor.generation())
            .map(|e| e.pose)
    }

    fn capture_components(&self, actor: ActorId) -> Vec<ComponentId> {
        self.actors
            .get(actor.index(), actor.generation())
            .map(|e| e.components.clone())
            .unwrap_or_default()
    }

    fn attach_capture_component(
        &mut self,
        actor: ActorId,
    ) -> Option<ComponentId> {
        self.add_component(actor)
    }

    fn is_component_alive(&self, component: ComponentId) -> bool {
        self.capture_state(component).is_some()
    }
}

impl CaptureBackend for HeadlessHost {
    fn allocate_buffer(&mut self, desc: &BufferDesc) -> Option<BufferId> {
        self.allocator.allocate(desc)
    }

    fn bind(&mut self, component: ComponentId, buffer: BufferId) -> bool {
        if !self.allocator.is_alive(buffer) {
            return false;
        }
        match self
            .components
            .get_mut(component.index(), component.generation())
        {
            Some(state) => {
                state.bound = Some(buffer);
                true
            }
            None => false,
        }
    }

    fn set_capture_source(
        &mut self,
        component: ComponentId,
        source: CaptureSource,
    ) {
        if let Some(state) = self
            .components
            .get_mut(component.index(), component.generation())
        {
            state.source = source;
        }
    }

    fn apply_config(&mut self, component: ComponentId, config: &CaptureConfig) {
        if let Some(state) = self
            .components
            .get_mut(component.index(), component.generation())
        {
            state.config = *config;
            state.active = true;
        }
    }

    fn captures_every_frame(&self, component: ComponentId) -> bool {
        self.capture_state(component)
            .is_some_and(|s| s.config.every_frame_capture)
    }

    fn bound_buffer(&self, component: ComponentId) -> Option<BufferId> {
        self.capture_state(component)
            .and_then(|s| s.bound)
            .filter(|&b| self.allocator.is_alive(b))
    }

    fn trigger_capture(&mut self, component: ComponentId) -> bool {
        let Some(buffer) = self.bound_buffer(component) else {
            return false;
        };
        match self
            .components
            .get_mut(component.index(), component.generation())
        {
            Some(state) if state.active && state.bound == Some(buffer) => {
                state.capture_count += 1;
                true
            }
            _ => false,
        }
    }
}

impl Scheduler for HeadlessHost {
    fn schedule_after(&mut self, delay: Duration, repeat: bool) -> TimerHandle {
        self.timers.schedule(delay, repeat)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.cancel(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PixelFormat;

    fn rig() -> ActorClass {
        ActorClass::new("CameraRig")
    }

    #[test]
    fn spawn_requires_template_and_free_space() {
        let mut host = HeadlessHost::new();
        assert!(host.spawn(&rig(), Pose::default(), "a").is_none());

        host.register_template(rig(), 2);
        host.block_region(Vec3::new(100.0, 0.0, 0.0), 10.0);
        let ok = host.spawn(&rig(), Pose::default(), "a").unwrap();
        assert_eq!(host.capture_components(ok).len(), 2);
        assert!(host
            .spawn(&rig(), Pose::at(Vec3::new(105.0, 0.0, 0.0)), "b")
            .is_none());
        assert_eq!(host.actor_name(ok), Some("a"));
    }

    #[test]
    fn destroyed_handles_stay_dead_after_slot_reuse() {
        let mut host = HeadlessHost::new();
        let first = host.add_actor(rig(), Pose::default(), "first", 1);
        let component = host.capture_components(first)[0];
        assert!(host.destroy_actor(first));
        assert!(!host.is_actor_alive(first));
        assert!(!host.is_component_alive(component));

        let second = host.add_actor(rig(), Pose::default(), "second", 1);
        assert_eq!(second.index(), first.index());
        assert!(!host.is_actor_alive(first));
        assert!(host.is_actor_alive(second));
        assert!(!host.destroy_actor(first));
    }

    #[test]
    fn inactive_world_enumerates_nothing() {
        let mut host = HeadlessHost::new();
        let _ = host.add_actor(rig(), Pose::default(), "a", 0);
        host.set_active(false);
        assert!(host.find_all_of_class(&rig()).is_empty());
    }

    #[test]
    fn capture_needs_active_component_and_live_buffer() {
        let mut host = HeadlessHost::new();
        let actor = host.add_actor(rig(), Pose::default(), "a", 1);
        let component = host.capture_components(actor)[0];
        let buffer = host
            .allocate_buffer(&BufferDesc::new(8, 8, PixelFormat::Rgba8))
            .unwrap();

        assert!(!host.trigger_capture(component));
        assert!(host.bind(component, buffer));
        assert!(!host.trigger_capture(component));

        host.apply_config(component, &CaptureConfig::default());
        assert!(host.trigger_capture(component));
        assert_eq!(host.capture_state(component).unwrap().capture_count, 1);

        assert!(host.release_buffer(buffer));
        assert!(host.bound_buffer(component).is_none());
        assert!(!host.trigger_capture(component));
    }

    #[test]
    fn destroying_component_detaches_it() {
        let mut host = HeadlessHost::new();
        let actor = host.add_actor(rig(), Pose::default(), "a", 2);
        let components = host.capture_components(actor);
        assert!(host.destroy_component(components[0]));
        assert_eq!(host.capture_components(actor), vec![components[1]]);
    }
}
