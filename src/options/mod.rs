//! Centralized spawning and capture options with TOML preset support.
//!
//! Every tweakable setting of the camera array and the capture orchestrator
//! is consolidated here. Options serialize to/from TOML so a capture session
//! can be described by a preset file.

mod capture;
mod spawn;

use std::path::Path;

pub use capture::{
    CaptureOptions, ChannelOptions, MAX_DEPTH_DISTANCE_RANGE,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use spawn::SpawnOptions;

use crate::error::SynthcapError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[capture]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera array spawning parameters.
    pub spawn: SpawnOptions,
    /// Render buffer and capture parameters.
    pub capture: CaptureOptions,
}

impl Options {
    /// Generate JSON Schema describing the exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, SynthcapError> {
        toml::from_str(content)
            .map_err(|e| SynthcapError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, SynthcapError> {
        let content =
            std::fs::read_to_string(path).map_err(SynthcapError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), SynthcapError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SynthcapError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SynthcapError::Io)?;
        }
        std::fs::write(path, content).map_err(SynthcapError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn defaults_match_documented_values() {
        let opts = Options::default();
        assert_eq!(opts.spawn.count, 5);
        assert_eq!(opts.spawn.offset, [400.0, 0.0, 0.0]);
        assert_eq!(opts.capture.width, 512);
        assert_eq!(opts.capture.height, 512);
        assert!(opts.capture.channels.rgb);
        assert!(opts.capture.channels.raw_depth);
        assert!(opts.capture.channels.normalized_depth);
        assert!(!opts.capture.channels.normal);
        assert!(opts.capture.force_every_frame);
        assert_eq!(opts.capture.update_interval_secs, 0.0);
        assert_eq!(opts.capture.max_depth_distance(), 10_000.0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[capture]
width = 256

[capture.channels]
normal = true
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.capture.width, 256);
        assert_eq!(opts.capture.height, 512);
        assert!(opts.capture.channels.normal);
        assert!(opts.capture.channels.rgb);
        assert_eq!(opts.spawn.count, 5);
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = Options::from_toml_str("[spawn]\ncount = \"many\"");
        assert!(matches!(err, Err(SynthcapError::OptionsParse(_))));
    }

    #[test]
    fn save_then_load_and_list_presets() {
        let dir = std::env::temp_dir()
            .join(format!("synthcap-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.spawn.count = 3;
        opts.save(&dir.join("three_cams.toml")).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let loaded = Options::load(&dir.join("three_cams.toml")).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["three_cams".to_owned()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("spawn"));
        assert!(props.contains_key("capture"));

        let capture = &props["capture"]["properties"];
        assert!(capture.get("width").is_some());
        assert!(capture.get("max_depth_distance").is_some());
        assert!(capture.get("channels").is_some());
    }
}
