//! Linear camera-array spawning.

use glam::Vec3;

use crate::host::{ActorClass, ActorId, Pose, World};
use crate::options::SpawnOptions;

/// What to spawn and how far apart.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// Number of instances.
    pub count: u32,
    /// Offset between consecutive instances.
    pub offset: Vec3,
    /// Template to instantiate; nothing is spawned without one.
    pub prototype: Option<ActorClass>,
}

/// A camera rig spawned by [`CameraArraySpawner::spawn_array`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedInstance {
    /// Weak handle to the spawned actor.
    pub handle: ActorId,
    /// 0-based position in the array.
    pub index: usize,
    /// Position the instance was spawned at.
    pub position: Vec3,
    /// Unique name passed to the host.
    pub name: String,
}

/// Spawns camera rigs along a line starting at its own position.
///
/// Instance `i` is placed at `origin + offset * i`, where `origin` is the
/// spawner's position when [`spawn_array`](Self::spawn_array) is called.
/// Failed spawns leave a gap; later instances keep their own placement.
#[derive(Debug, Clone)]
pub struct CameraArraySpawner {
    position: Vec3,
    name_prefix: String,
    spawned: Vec<SpawnedInstance>,
}

impl CameraArraySpawner {
    /// Spawner located at `position`.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            name_prefix: SpawnOptions::default().name_prefix,
            spawned: Vec::new(),
        }
    }

    /// Spawner located at `position` using the name prefix from `options`.
    #[must_use]
    pub fn from_options(options: &SpawnOptions, position: Vec3) -> Self {
        Self {
            name_prefix: options.name_prefix.clone(),
            ..Self::new(position)
        }
    }

    /// Spawn request for `prototype` with count and offset from `options`.
    #[must_use]
    pub fn request(
        options: &SpawnOptions,
        prototype: Option<ActorClass>,
    ) -> SpawnRequest {
        SpawnRequest {
            count: options.count,
            offset: options.offset_vec(),
            prototype,
        }
    }

    /// Spawner position (origin of the next array).
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the spawner.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Spawn `request.count` instances and track the successful ones,
    /// replacing previously tracked instances. Returns a copy of the new
    /// tracking list; empty if there is no prototype or the world is not
    /// active.
    pub fn spawn_array<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        request: &SpawnRequest,
    ) -> Vec<SpawnedInstance> {
        let Some(prototype) = &request.prototype else {
            log::error!("no camera rig prototype assigned; nothing spawned");
            return Vec::new();
        };
        if !world.is_active() {
            log::error!("world is not active; nothing spawned");
            return Vec::new();
        }

        self.spawned.clear();
        let origin = self.position;
        log::info!(
            "spawning {} '{prototype}' rigs from {origin} with offset {}",
            request.count,
            request.offset
        );

        for i in 0..request.count as usize {
            let position = origin + request.offset * i as f32;
            let name = format!("{}_{}", self.name_prefix, i + 1);

            match world.spawn(prototype, Pose::at(position), &name) {
                Some(handle) => {
                    log::debug!("spawned {name} ({handle}) at {position}");
                    self.spawned.push(SpawnedInstance {
                        handle,
                        index: i,
                        position,
                        name,
                    });
                }
                None => {
                    log::warn!("could not spawn {name} at {position}");
                }
            }
        }

        log::info!(
            "spawn complete: {}/{} rigs",
            self.spawned.len(),
            request.count
        );
        self.spawned.clone()
    }

    /// Tracked instance at `index`, or `None` outside the tracked range.
    #[must_use]
    pub fn get_instance(&self, index: usize) -> Option<SpawnedInstance> {
        let instance = self.spawned.get(index).cloned();
        if instance.is_none() {
            log::warn!(
                "invalid camera index {index} ({} tracked)",
                self.spawned.len()
            );
        }
        instance
    }

    /// Snapshot of all tracked instances.
    #[must_use]
    pub fn get_all_instances(&self) -> Vec<SpawnedInstance> {
        self.spawned.clone()
    }

    /// Tracked instances that are still alive in `world`.
    pub fn live_instances<W: World + ?Sized>(
        &self,
        world: &W,
    ) -> Vec<SpawnedInstance> {
        self.spawned
            .iter()
            .filter(|s| world.is_actor_alive(s.handle))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::HeadlessHost;

    fn rig() -> ActorClass {
        ActorClass::new("CameraRig")
    }

    fn host() -> HeadlessHost {
        let mut host = HeadlessHost::new();
        host.register_template(rig(), 2);
        host
    }

    fn request(count: u32, offset: Vec3) -> SpawnRequest {
        SpawnRequest {
            count,
            offset,
            prototype: Some(rig()),
        }
    }

    #[test]
    fn places_instances_along_offset() {
        let mut host = host();
        let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
        let spawned = spawner
            .spawn_array(&mut host, &request(3, Vec3::new(100.0, 0.0, 0.0)));

        let positions: Vec<Vec3> =
            spawned.iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![
                Vec3::ZERO,
                Vec3::new(100.0, 0.0, 0.0),
                Vec3::new(200.0, 0.0, 0.0)
            ]
        );
        for s in &spawned {
            assert_eq!(host.actor_pose(s.handle).unwrap().position, s.position);
        }
        assert_eq!(spawner.get_all_instances().len(), 3);
        assert_eq!(spawned[1].name, "CameraRig_2");
    }

    #[test]
    fn origin_is_spawner_position_at_call_time() {
        let mut host = host();
        let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
        spawner.set_position(Vec3::new(10.0, 20.0, 30.0));
        let spawned =
            spawner.spawn_array(&mut host, &request(2, Vec3::new(0.0, 5.0, 0.0)));
        assert_eq!(spawned[0].position, Vec3::new(10.0, 20.0, 30.0));
        assert_eq!(spawned[1].position, Vec3::new(10.0, 25.0, 30.0));
    }

    #[test]
    fn zero_offset_stacks_instances() {
        let mut host = host();
        let mut spawner = CameraArraySpawner::new(Vec3::ONE);
        let spawned = spawner.spawn_array(&mut host, &request(4, Vec3::ZERO));
        assert_eq!(spawned.len(), 4);
        assert!(spawned.iter().all(|s| s.position == Vec3::ONE));
    }

    #[test]
    fn failed_spawn_keeps_later_placements() {
        let mut host = host();
        host.block_region(Vec3::new(100.0, 0.0, 0.0), 1.0);
        let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
        let spawned = spawner
            .spawn_array(&mut host, &request(3, Vec3::new(100.0, 0.0, 0.0)));

        assert_eq!(spawned.len(), 2);
        assert_eq!(spawned[0].index, 0);
        assert_eq!(spawned[1].index, 2);
        assert_eq!(spawned[1].position, Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(spawned[1].name, "CameraRig_3");
    }

    #[test]
    fn respawn_replaces_tracking_list() {
        let mut host = host();
        let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
        let _ = spawner.spawn_array(&mut host, &request(5, Vec3::X));
        let second = spawner.spawn_array(&mut host, &request(2, Vec3::X));
        assert_eq!(second.len(), 2);
        assert_eq!(spawner.get_all_instances(), second);
        assert_eq!(host.actor_count(), 7);
    }

    #[test]
    fn missing_prototype_or_world_spawns_nothing() {
        let mut host = host();
        let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
        let _ = spawner.spawn_array(&mut host, &request(2, Vec3::X));

        let no_proto = SpawnRequest {
            prototype: None,
            ..request(3, Vec3::X)
        };
        assert!(spawner.spawn_array(&mut host, &no_proto).is_empty());
        // Tracking list from the previous call is untouched.
        assert_eq!(spawner.get_all_instances().len(), 2);

        host.set_active(false);
        assert!(spawner.spawn_array(&mut host, &request(3, Vec3::X)).is_empty());
        assert_eq!(host.actor_count(), 2);
    }

    #[test]
    fn get_instance_bounds() {
        let mut host = host();
        let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
        assert!(spawner.get_instance(0).is_none());
        let _ = spawner.spawn_array(&mut host, &request(3, Vec3::X));
        assert_eq!(spawner.get_instance(2).unwrap().index, 2);
        assert!(spawner.get_instance(3).is_none());
        assert!(spawner.get_instance(usize::MAX).is_none());
    }

    #[test]
    fn live_instances_skip_destroyed() {
        let mut host = host();
        let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
        let spawned = spawner.spawn_array(&mut host, &request(3, Vec3::X));
        assert!(host.destroy_actor(spawned[1].handle));

        let live = spawner.live_instances(&host);
        assert_eq!(live.len(), 2);
        assert_eq!(live[1].index, 2);
        // The tracking list itself keeps the stale entry.
        assert_eq!(spawner.get_all_instances().len(), 3);
    }

    #[test]
    fn request_from_options() {
        let options = SpawnOptions::default();
        let req = CameraArraySpawner::request(&options, Some(rig()));
        assert_eq!(req.count, 5);
        assert_eq!(req.offset, Vec3::new(400.0, 0.0, 0.0));
    }
}
