//! Domain logic: turn live metadata into an immutable [`VersionPlan`](mcbump_types::plan::VersionPlan).
//!
//! This crate owns *which* value each fact gets and how much to trust it. It does not own
//! fetching (that's `mcbump-sources`) or writing files (that's `mcbump-edit`).

mod catalog;
mod policy;
mod resolver;

pub use catalog::{FABRIC_DEVELOP_URL, FactRule, builtin_rules};
pub use policy::FallbackPolicy;
pub use resolver::{DEFAULT_LOADER_FALLBACK, DEFAULT_TIMEOUT, ResolverConfig, VersionResolver};
