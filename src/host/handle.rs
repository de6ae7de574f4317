use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

macro_rules! generational_handle {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        ///
        /// Equality covers both the slot index and its generation, so a
        /// handle to a destroyed object never matches the slot's next
        /// occupant.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Handle from a slot index and generation.
            #[must_use]
            pub const fn new(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            /// Slot index in the host's storage.
            #[must_use]
            pub const fn index(self) -> u32 {
                self.index
            }

            /// Generation of the slot when the handle was issued.
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}v{}", $tag, self.index, self.generation)
            }
        }
    };
}

generational_handle!(
    /// Weak reference to an actor in the host world.
    ActorId,
    "actor"
);

generational_handle!(
    /// Weak reference to a capture component attached to an actor.
    ComponentId,
    "capture"
);

/// Render buffer handle issued by a [`BufferAllocator`](super::BufferAllocator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    /// Handle from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Handle from its raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Spawnable template and enumeration filter, identified by name.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActorClass(String);

impl ActorClass {
    /// Class with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// World-space placement of an actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// World-space orientation.
    pub rotation: Quat,
}

impl Pose {
    /// Pose at `position` with identity rotation.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_distinguishes_reused_slots() {
        let first = ActorId::new(3, 0);
        let reused = ActorId::new(3, 1);
        assert_ne!(first, reused);
        assert_eq!(first.index(), reused.index());
        assert_eq!(reused.to_string(), "actor#3v1");
    }

    #[test]
    fn class_serializes_as_plain_string() {
        let class = ActorClass::new("CameraRig");
        assert_eq!(serde_json::to_string(&class).unwrap(), "\"CameraRig\"");
    }
}
