use crate::process::{ProcessOutput, run_with_timeout};
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use std::process::Command;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// The external build tool, one invocation per stage.
pub trait BuildTool {
    /// Human-readable command line prefix, for logs and reports.
    fn describe(&self) -> String;

    fn run(&self, args: &[String], timeout: Duration) -> Result<ProcessOutput, StageError>;
}

/// The project's Gradle wrapper script, run from the project root.
#[derive(Debug, Clone)]
pub struct GradleWrapper {
    root: Utf8PathBuf,
    program: String,
    leading_args: Vec<String>,
}

impl GradleWrapper {
    /// `gradlew.bat` on Windows, `gradlew` elsewhere, inside `root`.
    pub fn locate(root: &Utf8Path) -> Self {
        let script = if cfg!(windows) {
            "gradlew.bat"
        } else {
            "gradlew"
        };
        Self::new(root, root.join(script).to_string())
    }

    pub fn new(root: &Utf8Path, program: impl Into<String>) -> Self {
        Self {
            root: root.to_path_buf(),
            program: program.into(),
            leading_args: vec![],
        }
    }

    /// Arguments placed before every stage's arguments, e.g. a script for an interpreter.
    pub fn with_leading_args(mut self, args: &[&str]) -> Self {
        self.leading_args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl BuildTool for GradleWrapper {
    fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.leading_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run(&self, args: &[String], timeout: Duration) -> Result<ProcessOutput, StageError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .current_dir(&self.root);
        debug!(program = %self.program, ?args, cwd = %self.root, "spawn");

        run_with_timeout(cmd, timeout).map_err(|source| StageError::Spawn {
            program: self.describe(),
            source,
        })
    }
}
