//! Shared DTOs for the mcbump workspace.
//!
//! # Design constraints
//! - A [`plan::VersionPlan`] is immutable once built; consumers only read it.
//! - Fact identifiers are a closed set ([`fact::FactId`]); every consumer matches exhaustively.
//! - Everything here is serializable so it can be written to `--out-dir` artifacts.

pub mod fact;
pub mod patch;
pub mod pipeline;
pub mod plan;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const MCBUMP_PLAN_V1: &str = "mcbump.plan.v1";
    pub const MCBUMP_PATCH_V1: &str = "mcbump.patch.v1";
    pub const MCBUMP_PIPELINE_V1: &str = "mcbump.pipeline.v1";
}
