use crate::options::CaptureOptions;

/// Capture-quality settings applied uniformly to every bound component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureConfig {
    /// Capture on every frame instead of on demand.
    pub every_frame_capture: bool,
    /// Re-capture whenever the owning actor moves.
    pub capture_on_movement: bool,
    /// Maximum view distance override, world units.
    pub max_view_distance: f32,
    /// LOD distance scale.
    pub lod_distance_factor: f32,
}

impl CaptureConfig {
    /// Settings derived from capture options.
    #[must_use]
    pub fn from_options(options: &CaptureOptions) -> Self {
        Self {
            every_frame_capture: options.force_every_frame,
            capture_on_movement: true,
            max_view_distance: options.max_view_distance,
            lod_distance_factor: options.lod_distance_factor,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::from_options(&CaptureOptions::default())
    }
}
