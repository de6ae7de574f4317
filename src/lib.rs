// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Tests may unwrap.
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Camera-array spawning and multi-buffer scene capture for synthetic
//! training data.
//!
//! Synthcap places a line of camera rigs in a host world and gives every
//! rig a set of render buffers (RGB, raw depth, normalized depth, normals)
//! bound to its scene-capture components, ready for dataset export.
//!
//! # Key entry points
//!
//! - [`spawner::CameraArraySpawner`] - spawns the camera array
//! - [`capture::CaptureBufferOrchestrator`] - creates, binds and refreshes
//!   render buffers
//! - [`host`] - the capability traits a host engine implements, plus
//!   [`host::headless::HeadlessHost`]
//! - [`options::Options`] - TOML-loadable configuration
//!
//! # Architecture
//!
//! The core holds no engine state. Each operation receives the host
//! explicitly ([`host::World`], [`host::CaptureBackend`],
//! [`host::Scheduler`]) and keeps only weak handles to what the host owns.
//! Timed behaviour is expressed as timer handles the host fires back into
//! [`capture::CaptureBufferOrchestrator::on_timer`]. Asset persistence is an
//! optional [`host::AssetStore`] injected by tooling.

pub mod capture;
pub mod error;
pub mod gpu;
pub mod host;
pub mod options;
pub mod spawner;
