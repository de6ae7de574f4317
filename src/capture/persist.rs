//! Named render-target assets and a filesystem asset store.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{CaptureChannel, PixelFormat, RenderBuffer};
use crate::error::SynthcapError;
use crate::host::AssetStore;

/// Logical directory persisted render targets are stored under.
pub const RENDER_TARGET_DIR: &str = "RenderTargets";

/// Deterministic asset name for a channel and 1-based camera index, e.g.
/// `RT_RGB_Camera_2`.
#[must_use]
pub fn asset_name(channel: CaptureChannel, camera_index: usize) -> String {
    format!("RT_{}_Camera_{camera_index}", channel.asset_tag())
}

/// Logical, store-independent asset address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetPath {
    /// Directory under the store root.
    pub dir: String,
    /// Asset name (no extension).
    pub name: String,
}

impl AssetPath {
    /// Path of the render target for `channel` on camera `camera_index`.
    #[must_use]
    pub fn render_target(channel: CaptureChannel, camera_index: usize) -> Self {
        Self {
            dir: RENDER_TARGET_DIR.to_owned(),
            name: asset_name(channel, camera_index),
        }
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.dir, self.name)
    }
}

/// Outcome of persisting a batch of buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistSummary {
    /// Buffers written successfully.
    pub persisted: usize,
    /// Buffers the store rejected.
    pub failed: usize,
}

/// On-disk descriptor of a persisted render target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTargetAsset {
    /// Asset name.
    pub name: String,
    /// Semantic channel.
    pub channel: CaptureChannel,
    /// Pixel layout.
    pub format: PixelFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// 1-based camera index.
    pub camera_index: usize,
}

impl RenderTargetAsset {
    fn describe(buffer: &RenderBuffer, path: &AssetPath) -> Self {
        Self {
            name: path.name.clone(),
            channel: buffer.channel,
            format: buffer.format(),
            width: buffer.width(),
            height: buffer.height(),
            camera_index: buffer.camera_index,
        }
    }
}

/// Asset store writing one TOML descriptor per render target below a root
/// directory (`<root>/<dir>/<name>.toml`).
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    /// Store rooted at `root`. Directories are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File an asset path resolves to.
    #[must_use]
    pub fn file_path(&self, path: &AssetPath) -> PathBuf {
        self.root.join(&path.dir).join(format!("{}.toml", path.name))
    }

    /// Read a previously persisted descriptor back.
    pub fn load(&self, path: &AssetPath) -> Result<RenderTargetAsset, SynthcapError> {
        let content = std::fs::read_to_string(self.file_path(path))?;
        toml::from_str(&content).map_err(|e| SynthcapError::Persist {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

impl AssetStore for FsAssetStore {
    fn persist(
        &mut self,
        buffer: &RenderBuffer,
        path: &AssetPath,
    ) -> Result<(), SynthcapError> {
        let asset = RenderTargetAsset::describe(buffer, path);
        let content = toml::to_string_pretty(&asset).map_err(|e| {
            SynthcapError::Persist {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })?;
        let file = self.file_path(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file, content)?;
        log::debug!("persisted {path} to {}", file.display());
        Ok(())
    }
}
