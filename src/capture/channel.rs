use serde::{Deserialize, Serialize};

use crate::options::ChannelOptions;

/// Semantic render buffer type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CaptureChannel {
    /// Final tone-mapped color.
    Rgb,
    /// Linear scene depth in world units.
    RawDepth,
    /// Depth divided by the max depth distance, 8-bit.
    NormalizedDepth,
    /// World-space surface normal.
    Normal,
}

impl CaptureChannel {
    /// All channels in the order buffers are created for each camera.
    pub const ALL: [Self; 4] =
        [Self::Rgb, Self::RawDepth, Self::NormalizedDepth, Self::Normal];

    /// Pixel format of this channel's buffers.
    #[must_use]
    pub const fn pixel_format(self) -> PixelFormat {
        match self {
            Self::Rgb | Self::Normal => PixelFormat::Rgba8,
            Self::RawDepth => PixelFormat::R32Float,
            Self::NormalizedDepth => PixelFormat::R8,
        }
    }

    /// Capture source the bound component is switched to.
    #[must_use]
    pub const fn capture_source(self, max_depth_distance: f32) -> CaptureSource {
        match self {
            Self::Rgb => CaptureSource::FinalColorLdr,
            Self::RawDepth => CaptureSource::SceneDepth,
            Self::NormalizedDepth => CaptureSource::NormalizedDepth {
                max_distance: max_depth_distance,
            },
            Self::Normal => CaptureSource::Normal,
        }
    }

    /// Index into a camera's discovered capture components, or `None` for
    /// the channel that gets a dedicated attached component.
    #[must_use]
    pub const fn capture_slot(self) -> Option<usize> {
        match self {
            Self::Rgb => Some(0),
            Self::RawDepth => Some(1),
            Self::Normal => Some(2),
            Self::NormalizedDepth => None,
        }
    }

    /// Short tag used in asset names.
    #[must_use]
    pub const fn asset_tag(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::RawDepth => "Depth",
            Self::NormalizedDepth => "DepthML",
            Self::Normal => "Normal",
        }
    }

    /// Whether the channel is switched on in `channels`.
    #[must_use]
    pub const fn is_enabled(self, channels: &ChannelOptions) -> bool {
        match self {
            Self::Rgb => channels.rgb,
            Self::RawDepth => channels.raw_depth,
            Self::NormalizedDepth => channels.normalized_depth,
            Self::Normal => channels.normal,
        }
    }
}

/// Pixel layout of a render buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit RGBA, unsigned normalized.
    Rgba8,
    /// Single 32-bit float channel.
    R32Float,
    /// Single 8-bit channel, unsigned normalized.
    R8,
}

impl PixelFormat {
    /// Size of one pixel in bytes.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Rgba8 | Self::R32Float => 4,
            Self::R8 => 1,
        }
    }

    /// Matching wgpu texture format.
    #[must_use]
    pub const fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            Self::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
            Self::R32Float => wgpu::TextureFormat::R32Float,
            Self::R8 => wgpu::TextureFormat::R8Unorm,
        }
    }
}

/// What a capture component renders into its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CaptureSource {
    /// Final LDR color.
    #[default]
    FinalColorLdr,
    /// Raw scene depth.
    SceneDepth,
    /// Scene depth divided by `max_distance`, clamped to [0, 1].
    NormalizedDepth {
        /// Depth mapped to 1.0.
        max_distance: f32,
    },
    /// World normals.
    Normal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_channel_has_distinct_source() {
        let sources: Vec<_> = CaptureChannel::ALL
            .iter()
            .map(|c| c.capture_source(10_000.0))
            .collect();
        for (i, a) in sources.iter().enumerate() {
            for b in &sources[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn depth_channels_use_single_channel_formats() {
        assert_eq!(CaptureChannel::RawDepth.pixel_format(), PixelFormat::R32Float);
        assert_eq!(CaptureChannel::NormalizedDepth.pixel_format(), PixelFormat::R8);
        assert_eq!(
            PixelFormat::R8.to_wgpu(),
            wgpu::TextureFormat::R8Unorm
        );
    }

    #[test]
    fn slot_convention() {
        assert_eq!(CaptureChannel::Rgb.capture_slot(), Some(0));
        assert_eq!(CaptureChannel::RawDepth.capture_slot(), Some(1));
        assert_eq!(CaptureChannel::Normal.capture_slot(), Some(2));
        assert_eq!(CaptureChannel::NormalizedDepth.capture_slot(), None);
    }
}
