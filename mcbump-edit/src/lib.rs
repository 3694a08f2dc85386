//! Config patching for mcbump.
//!
//! Responsibilities:
//! - Describe where a Fabric project keeps its versions ([`default_patch_set`]).
//! - Apply a [`VersionPlan`](mcbump_types::plan::VersionPlan) to those files (in memory or
//!   to disk), rewriting only the matched regions.
//! - Generate a unified diff preview and sha256 change records.

mod apply;
mod diff;
mod document;
mod error;
mod lines;
mod patchset;

pub use apply::{ApplyOptions, apply_patch_set};
pub use error::PatchError;
pub use patchset::{DEFAULT_LOOM_PLUGIN_ID, DEFAULT_MOD_JSON, PatchSetConfig, default_patch_set};
