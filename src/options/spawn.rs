use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Spawning", inline)]
#[serde(default)]
/// Camera array spawning parameters.
pub struct SpawnOptions {
    /// Number of camera rigs to spawn.
    #[schemars(title = "Spawn Count", range(min = 0, max = 256))]
    pub count: u32,
    /// Offset between consecutive rigs, measured from the first one.
    #[schemars(title = "Spawn Offset")]
    pub offset: [f32; 3],
    /// Prefix for spawned rig names (`{prefix}_{n}`, 1-based).
    #[schemars(skip)]
    pub name_prefix: String,
}

impl SpawnOptions {
    /// Spawn offset as a vector.
    #[must_use]
    pub fn offset_vec(&self) -> Vec3 {
        Vec3::from_array(self.offset)
    }
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            count: 5,
            offset: [400.0, 0.0, 0.0],
            name_prefix: "CameraRig".to_owned(),
        }
    }
}
