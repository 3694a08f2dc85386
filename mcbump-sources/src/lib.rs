//! Version metadata sources.
//!
//! Each [`MetadataSource`] knows one URL and how to pick "latest" out of its JSON response.
//! Sources are tolerant: anything other than a usable value comes back as a
//! [`QueryOutcome`] describing why, never as a panic or a propagated error. Deciding
//! what to do about missing data is the resolver's job, not this crate's.

mod fetch;
mod latest;
mod source;

pub use fetch::{HttpFetcher, InMemoryFetcher, MetadataFetcher, SourceError};
pub use latest::latest_from_json;
pub use source::{MetadataSource, QueryOutcome, default_sources};
