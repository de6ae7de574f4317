//! Crate-level error types.

use std::fmt;

use crate::gpu::context::GpuContextError;

/// Errors produced by the synthcap crate.
///
/// Only I/O-bound surfaces (options files, asset persistence, GPU setup)
/// return these. Spawning, detection and capture updates report failures
/// through empty or zero results instead.
#[derive(Debug)]
pub enum SynthcapError {
    /// GPU context initialization failure.
    Gpu(GpuContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// A render buffer could not be written to asset storage.
    Persist {
        /// Logical asset path that was being written.
        path: String,
        /// Reason reported by the store.
        reason: String,
    },
}

impl fmt::Display for SynthcapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Persist { path, reason } => {
                write!(f, "failed to persist {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for SynthcapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GpuContextError> for SynthcapError {
    fn from(e: GpuContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for SynthcapError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
