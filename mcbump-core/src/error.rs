use camino::Utf8PathBuf;

/// Errors that stop a run before it can produce an outcome. Every one exits with 1.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("{path} not found; is this a Fabric mod project root?")]
    MissingAnchor { path: Utf8PathBuf },

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Invalid(_) | ToolError::MissingAnchor { .. } | ToolError::Internal(_) => 1,
        }
    }
}
