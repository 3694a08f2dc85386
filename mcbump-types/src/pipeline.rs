use crate::report::WarningReport;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One step of the external build pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,

    /// Arguments passed to the build tool, e.g. `["clean"]`.
    pub args: Vec<String>,

    pub required: bool,
    pub timeout_secs: u64,

    /// Keep going after this stage fails. Optional stages always continue.
    #[serde(default)]
    pub continue_on_failure: bool,
}

impl StageSpec {
    pub fn new(name: &str, args: &[&str], required: bool, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            required,
            timeout_secs: timeout.as_secs(),
            continue_on_failure: !required,
        }
    }

    pub fn continue_on_failure(mut self, yes: bool) -> Self {
        self.continue_on_failure = yes;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether a failure of this stage halts the pipeline.
    pub fn halts_on_failure(&self) -> bool {
        self.required && !self.continue_on_failure
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageClass {
    Success,
    FailedRequired,
    FailedOptional,
    TimedOut,
}

impl StageClass {
    pub fn label(self) -> &'static str {
        match self {
            StageClass::Success => "success",
            StageClass::FailedRequired => "failed (required)",
            StageClass::FailedOptional => "failed (optional)",
            StageClass::TimedOut => "timed out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: String,
    pub required: bool,

    /// Process exit code; `None` when the process could not be spawned or was killed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    #[serde(default)]
    pub stdout: String,

    #[serde(default)]
    pub stderr: String,

    pub elapsed_ms: u64,
    pub class: StageClass,

    /// Spawn or wait error, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageResult {
    pub fn succeeded(&self) -> bool {
        self.class == StageClass::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    DegradedSuccess,
    Failed,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Success => "success",
            Verdict::DegradedSuccess => "degraded success",
            Verdict::Failed => "failed",
        }
    }

    pub fn is_success(self) -> bool {
        !matches!(self, Verdict::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub schema: String,
    pub verdict: Verdict,

    #[serde(default)]
    pub stages: Vec<StageResult>,

    /// Stages never started because an earlier stage halted the pipeline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,

    /// Files produced by a successful build (relative to the project root).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<String>,

    /// Warnings active when the pipeline finished.
    pub report: WarningReport,
}

impl PipelineOutcome {
    pub fn new(verdict: Verdict, stages: Vec<StageResult>, report: WarningReport) -> Self {
        Self {
            schema: crate::schema::MCBUMP_PIPELINE_V1.to_string(),
            verdict,
            stages,
            skipped: vec![],
            artifacts: vec![],
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_stages_continue_by_default() {
        let stage = StageSpec::new("genSources", &["genSources"], false, Duration::from_secs(60));
        assert!(stage.continue_on_failure);
        assert!(!stage.halts_on_failure());
    }

    #[test]
    fn required_stage_can_allow_continuation() {
        let clean = StageSpec::new("clean", &["clean"], true, Duration::from_secs(300));
        assert!(clean.halts_on_failure());
        let clean = clean.continue_on_failure(true);
        assert!(!clean.halts_on_failure());
        assert_eq!(clean.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn only_failed_is_unsuccessful() {
        assert!(Verdict::Success.is_success());
        assert!(Verdict::DegradedSuccess.is_success());
        assert!(!Verdict::Failed.is_success());
    }
}
