//! Error types for mcbump-edit.
//!
//! A [`PatchError`] fails the target it happened in and aborts the rest of the patch set.
//! Missing files and unresolved facts are not errors; they are reported as target and field
//! statuses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    /// The document could not be parsed, or is not shaped the way its bindings expect.
    /// Guessing a repair could corrupt the file, so the run stops instead.
    #[error("{path}: malformed document: {message}")]
    Malformed { path: String, message: String },

    /// A binding's locator does not fit the target's file format.
    #[error("{path}: locator `{locator}` cannot be applied to a {format} file")]
    FormatMismatch {
        path: String,
        locator: String,
        format: &'static str,
    },

    #[error("invalid pattern for `{locator}`: {source}")]
    Pattern {
        locator: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
