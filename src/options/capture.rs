use std::ops::RangeInclusive;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Accepted range for [`CaptureOptions::max_depth_distance`].
pub const MAX_DEPTH_DISTANCE_RANGE: RangeInclusive<f32> = 100.0..=100_000.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Channels", inline)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
/// Which render buffers to create per camera rig.
pub struct ChannelOptions {
    /// Final color buffer, bound to capture slot 0.
    #[schemars(title = "RGB")]
    pub rgb: bool,
    /// Linear scene depth buffer, bound to capture slot 1.
    #[schemars(title = "Raw Depth")]
    pub raw_depth: bool,
    /// 8-bit depth normalized by the max depth distance, on its own
    /// capture component.
    #[schemars(title = "ML Depth")]
    pub normalized_depth: bool,
    /// World normal buffer, bound to capture slot 2.
    #[schemars(title = "Normal")]
    pub normal: bool,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            rgb: true,
            raw_depth: true,
            normalized_depth: true,
            normal: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Capture", inline)]
#[serde(default)]
/// Render buffer and scene capture parameters.
pub struct CaptureOptions {
    /// Render buffer width in pixels.
    #[schemars(title = "Width", range(min = 1, max = 8192))]
    pub width: u32,
    /// Render buffer height in pixels.
    #[schemars(title = "Height", range(min = 1, max = 8192))]
    pub height: u32,
    /// Per-channel enable flags.
    pub channels: ChannelOptions,
    /// Put every bound capture component into every-frame capture mode.
    #[schemars(title = "Capture Every Frame")]
    pub force_every_frame: bool,
    /// Seconds between forced capture refreshes (0 disables).
    #[schemars(title = "Update Interval", range(min = 0.0, max = 60.0), extend("step" = 0.1))]
    pub update_interval_secs: f32,
    /// Depth mapped to 1.0 in the normalized depth channel (world units).
    /// Read through [`CaptureOptions::max_depth_distance`], which clamps.
    #[schemars(title = "Max Depth Distance", range(min = 100.0, max = 100_000.0))]
    pub max_depth_distance: f32,
    /// Maximum view distance applied to every capture component.
    #[schemars(skip)]
    pub max_view_distance: f32,
    /// LOD distance factor applied to every capture component.
    #[schemars(skip)]
    pub lod_distance_factor: f32,
    /// Delay before the first detection pass after `begin_play`.
    #[schemars(skip)]
    pub initial_detection_delay_secs: f32,
    /// Delay of the one-shot forced capture after a detection pass
    /// (0 disables).
    #[schemars(skip)]
    pub post_configure_capture_delay_secs: f32,
}

impl CaptureOptions {
    /// Max depth distance clamped to [`MAX_DEPTH_DISTANCE_RANGE`].
    #[must_use]
    pub fn max_depth_distance(&self) -> f32 {
        self.max_depth_distance.clamp(
            *MAX_DEPTH_DISTANCE_RANGE.start(),
            *MAX_DEPTH_DISTANCE_RANGE.end(),
        )
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            channels: ChannelOptions::default(),
            force_every_frame: true,
            update_interval_secs: 0.0,
            max_depth_distance: 10_000.0,
            max_view_distance: 100_000.0,
            lod_distance_factor: 1.0,
            initial_detection_delay_secs: 5.0,
            post_configure_capture_delay_secs: 1.0,
        }
    }
}
