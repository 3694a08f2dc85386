use crate::tool::BuildTool;
use camino::{Utf8Path, Utf8PathBuf};
use mcbump_types::pipeline::{PipelineOutcome, StageClass, StageResult, StageSpec, Verdict};
use mcbump_types::plan::WarningKind;
use mcbump_types::report::{ReportEntry, ReportPhase, WarningReport};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Timeouts and the IDE verb for [`default_stages`].
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// IDE integration task, e.g. `vscode`. `None` drops the stage.
    pub ide: Option<String>,
    pub clean_timeout: Duration,
    pub gen_sources_timeout: Duration,
    pub ide_timeout: Duration,
    pub build_timeout: Duration,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            ide: Some("vscode".to_string()),
            clean_timeout: Duration::from_secs(300),
            gen_sources_timeout: Duration::from_secs(600),
            ide_timeout: Duration::from_secs(300),
            build_timeout: Duration::from_secs(600),
        }
    }
}

/// clean, genSources, IDE setup, build.
///
/// clean is required but a failure there only degrades the run; build is terminal.
pub fn default_stages(config: &StageConfig) -> Vec<StageSpec> {
    let mut stages = vec![
        StageSpec::new("clean", &["clean"], true, config.clean_timeout).continue_on_failure(true),
        StageSpec::new(
            "genSources",
            &["genSources"],
            false,
            config.gen_sources_timeout,
        ),
    ];
    if let Some(verb) = config.ide.as_deref().filter(|v| !v.trim().is_empty()) {
        stages.push(StageSpec::new(verb, &[verb], false, config.ide_timeout));
    }
    stages.push(StageSpec::new("build", &["build"], true, config.build_timeout));
    stages
}

pub struct BuildPipeline<'a> {
    tool: &'a dyn BuildTool,
    root: Utf8PathBuf,
}

impl<'a> BuildPipeline<'a> {
    /// `root` is where built jars are looked for after a successful run.
    pub fn new(tool: &'a dyn BuildTool, root: &Utf8Path) -> Self {
        Self {
            tool,
            root: root.to_path_buf(),
        }
    }

    /// Run `stages` strictly in order. The last stage is the one the verdict hinges on.
    ///
    /// Stage failures are appended to a copy of `report`, which becomes the outcome's snapshot.
    pub fn run(&self, stages: &[StageSpec], report: &WarningReport) -> PipelineOutcome {
        let mut report = report.clone();
        let mut results = Vec::with_capacity(stages.len());
        let mut skipped = Vec::new();

        for (idx, stage) in stages.iter().enumerate() {
            let result = self.run_stage(stage);

            if !result.succeeded() {
                report.push(stage_entry(stage, &result, self.tool.describe()));
            }
            let halt = !result.succeeded() && stage.halts_on_failure();
            results.push(result);

            if halt {
                skipped = stages[idx + 1..].iter().map(|s| s.name.clone()).collect();
                if !skipped.is_empty() {
                    warn!(stage = %stage.name, skipped = ?skipped, "pipeline halted");
                }
                break;
            }
        }

        let verdict = verdict(stages, &results);
        info!(verdict = verdict.label(), "pipeline finished");

        let mut outcome = PipelineOutcome::new(verdict, results, report);
        outcome.skipped = skipped;
        if verdict.is_success() {
            outcome.artifacts = crate::artifacts::list_jars(&self.root);
        }
        outcome
    }

    fn run_stage(&self, stage: &StageSpec) -> StageResult {
        info!(stage = %stage.name, timeout_secs = stage.timeout_secs, "running stage");
        let started = Instant::now();
        let run = self.tool.run(&stage.args, stage.timeout());
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let failed_class = if stage.required {
            StageClass::FailedRequired
        } else {
            StageClass::FailedOptional
        };

        let result = match run {
            Ok(out) => {
                let class = if out.timed_out {
                    StageClass::TimedOut
                } else if out.exit_code == Some(0) {
                    StageClass::Success
                } else {
                    failed_class
                };
                StageResult {
                    name: stage.name.clone(),
                    required: stage.required,
                    exit_code: out.exit_code,
                    stdout: out.stdout,
                    stderr: out.stderr,
                    elapsed_ms,
                    class,
                    error: None,
                }
            }
            Err(err) => StageResult {
                name: stage.name.clone(),
                required: stage.required,
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                elapsed_ms,
                class: failed_class,
                error: Some(err.to_string()),
            },
        };

        if result.succeeded() {
            info!(stage = %stage.name, elapsed_ms, "stage succeeded");
        } else {
            warn!(
                stage = %stage.name,
                class = result.class.label(),
                exit_code = ?result.exit_code,
                "stage did not succeed"
            );
        }
        result
    }
}

/// success: the last stage succeeded and nothing else failed.
/// degraded success: the last stage succeeded, something before it did not.
/// failed: the last stage failed or never ran.
pub fn verdict(stages: &[StageSpec], results: &[StageResult]) -> Verdict {
    let final_ran = !stages.is_empty() && results.len() == stages.len();
    let final_ok = final_ran && results.last().is_some_and(StageResult::succeeded);

    if !final_ok {
        Verdict::Failed
    } else if results.iter().all(StageResult::succeeded) {
        Verdict::Success
    } else {
        Verdict::DegradedSuccess
    }
}

fn stage_entry(stage: &StageSpec, result: &StageResult, tool: String) -> ReportEntry {
    let detail = match (&result.error, result.class, result.exit_code) {
        (Some(err), _, _) => err.clone(),
        (None, StageClass::TimedOut, _) => format!("timed out after {}s", stage.timeout_secs),
        (None, _, Some(code)) => format!("exited with code {code}"),
        (None, _, None) => "terminated by a signal".to_string(),
    };
    let consequence = if stage.halts_on_failure() {
        "the pipeline stopped here"
    } else if stage.required {
        "continuing in degraded mode"
    } else {
        "optional, continuing"
    };

    let mut message = format!("`{tool} {}` {detail}; {consequence}", stage.args.join(" "));
    if let Some(line) = last_output_line(result) {
        message.push_str(&format!("; last output: {line}"));
    }

    ReportEntry {
        phase: ReportPhase::Build,
        kind: WarningKind::StageFailure,
        subject: stage.name.clone(),
        message,
        remediation: None,
        files: vec![],
    }
}

/// Last non-blank line of stderr, or of stdout when stderr is empty.
fn last_output_line(result: &StageResult) -> Option<&str> {
    [&result.stderr, &result.stdout]
        .into_iter()
        .find_map(|text| text.lines().rev().map(str::trim).find(|l| !l.is_empty()))
}
