//! Embeddable core library for mcbump.
//!
//! Provides a clap-free, I/O-abstracted entry point: the CLI is one host, tests are another.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`MetadataFetcher`](ports::MetadataFetcher): HTTP GET of version metadata
//! - [`BuildTool`](ports::BuildTool): run one build stage
//! - [`WritePort`](ports::WritePort): write artifacts and create directories
//! - [`ProgressPort`](ports::ProgressPort): show the plan, patch and build results as they happen
//!
//! The [`adapters`] module provides the default network, process and filesystem implementations.
//!
//! # Entry points
//!
//! - [`run_switch`](pipeline::run_switch): anchor check, resolve, patch, build
//! - [`resolve_plan`](pipeline::resolve_plan), [`apply_patches`](pipeline::apply_patches),
//!   [`run_build`](pipeline::run_build): the individual steps
//! - [`write_artifacts`](pipeline::write_artifacts): `plan.json`, `report.md`, `patch.diff`

pub mod adapters;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use error::ToolError;

// Re-exported so embedders don't need the lower crates for the common types.
pub use mcbump_types::plan::{PlanInputs, VersionPlan};
pub use mcbump_types::report::WarningReport;
