//! The external build pipeline.
//!
//! Stages run strictly one after another through a [`BuildTool`], each with its own timeout,
//! and are classified as success, failed-required, failed-optional or timed-out. Nothing is
//! retried.

mod artifacts;
mod pipeline;
mod process;
mod tool;

pub use artifacts::list_jars;
pub use pipeline::{BuildPipeline, StageConfig, default_stages, verdict};
pub use process::{ProcessOutput, run_with_timeout};
pub use tool::{BuildTool, GradleWrapper, StageError};
