//! The switch flow: anchor check, resolve, patch, build.
//!
//! These entry points are I/O-agnostic: metadata, processes and artifact writes all go
//! through the port traits. Project files are read and rewritten by `mcbump-edit`.

use crate::error::ToolError;
use crate::ports::{BuildTool, MetadataFetcher, ProgressPort, WritePort};
use crate::settings::{ANCHOR_FILE, SwitchSettings};
use anyhow::Context;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use mcbump_build::{BuildPipeline, default_stages};
use mcbump_domain::VersionResolver;
use mcbump_edit::{ApplyOptions, apply_patch_set, default_patch_set};
use mcbump_render::{extend_with_patch, render_report_md, warning_report};
use mcbump_types::patch::PatchReport;
use mcbump_types::pipeline::PipelineOutcome;
use mcbump_types::plan::{PlanInputs, VersionPlan};
use mcbump_types::report::WarningReport;
use serde::Serialize;
use tracing::{info, warn};

/// Everything one switch run produced.
#[derive(Debug, Clone)]
pub struct SwitchOutcome {
    pub plan: VersionPlan,
    pub patch: PatchReport,
    pub diff: String,

    /// `None` when the build was not requested or the patch set aborted.
    pub pipeline: Option<PipelineOutcome>,

    /// The consolidated report as of the end of the run.
    pub report: WarningReport,
}

impl SwitchOutcome {
    /// False when the patch set aborted or the final build stage did not succeed.
    /// Warnings alone never fail a run.
    pub fn succeeded(&self) -> bool {
        !self.patch.aborted
            && self
                .pipeline
                .as_ref()
                .is_none_or(|p| p.verdict.is_success())
    }

    pub fn exit_code(&self) -> u8 {
        if self.succeeded() { 0 } else { 1 }
    }
}

/// Refuse to touch a directory that does not look like a mod project.
pub fn check_project(root: &Utf8Path) -> Result<(), ToolError> {
    let anchor = root.join(ANCHOR_FILE);
    if !anchor.is_file() {
        return Err(ToolError::MissingAnchor { path: anchor });
    }
    Ok(())
}

/// Resolve every fact and build the warning report for it.
///
/// Never fails: unavailable sources become fallbacks or unresolved facts.
pub fn resolve_plan(
    settings: &SwitchSettings,
    inputs: PlanInputs,
    fetcher: &dyn MetadataFetcher,
) -> (VersionPlan, WarningReport) {
    let resolver = VersionResolver::new(&settings.resolver);
    let plan = resolver.resolve(fetcher, inputs);
    let report = warning_report(&plan, &default_patch_set(&settings.patch_set));
    info!(
        target_version = plan.target_version(),
        warnings = report.len(),
        "resolved plan"
    );
    (plan, report)
}

/// Apply the plan to the project's files and add what needs a human to `report`.
///
/// In dry-run mode nothing is written but the outcomes and the diff are the same.
pub fn apply_patches(
    settings: &SwitchSettings,
    plan: &VersionPlan,
    report: &mut WarningReport,
) -> (PatchReport, String) {
    let targets = default_patch_set(&settings.patch_set);
    let opts = ApplyOptions {
        dry_run: settings.dry_run,
    };
    let (patch, diff) = apply_patch_set(&settings.project_root, plan, &targets, &opts);
    extend_with_patch(report, &patch);
    (patch, diff)
}

/// Run the configured build stages. The outcome carries `report` plus any stage failures.
pub fn run_build(
    settings: &SwitchSettings,
    tool: &dyn BuildTool,
    report: &WarningReport,
) -> PipelineOutcome {
    let stages = default_stages(&settings.stages);
    info!(tool = %tool.describe(), stages = stages.len(), "running build pipeline");
    BuildPipeline::new(tool, &settings.project_root).run(&stages, report)
}

/// Run the whole flow, reporting each decision point through `progress`.
///
/// The caller is responsible for writing artifacts (see [`write_artifacts`]).
pub fn run_switch(
    settings: &SwitchSettings,
    inputs: PlanInputs,
    fetcher: &dyn MetadataFetcher,
    tool: &dyn BuildTool,
    progress: &dyn ProgressPort,
) -> Result<SwitchOutcome, ToolError> {
    check_project(&settings.project_root)?;

    let (plan, mut report) = resolve_plan(settings, inputs, fetcher);
    progress.resolved(&plan, &report);

    let (patch, diff) = apply_patches(settings, &plan, &mut report);
    progress.patched(&patch, &diff, &report);

    let pipeline = if patch.aborted {
        warn!(written = ?patch.written, "patch set aborted; skipping build");
        None
    } else if settings.builds() {
        let outcome = run_build(settings, tool, &report);
        progress.built(&outcome);
        report = outcome.report.clone();
        Some(outcome)
    } else {
        None
    };

    Ok(SwitchOutcome {
        plan,
        patch,
        diff,
        pipeline,
        report,
    })
}

#[derive(Serialize)]
struct ToolInfo {
    name: &'static str,
    version: &'static str,
}

/// `plan.json`: the plan plus whatever happened after it.
#[derive(Serialize)]
struct RunRecord<'a> {
    tool: ToolInfo,
    generated_at: DateTime<Utc>,
    plan: &'a VersionPlan,
    patch: &'a PatchReport,

    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline: Option<&'a PipelineOutcome>,
    warnings: &'a WarningReport,
}

/// Write `plan.json`, `report.md` and `patch.diff` to `out_dir`.
pub fn write_artifacts(
    outcome: &SwitchOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let record = RunRecord {
        tool: ToolInfo {
            name: "mcbump",
            version: env!("CARGO_PKG_VERSION"),
        },
        generated_at: Utc::now(),
        plan: &outcome.plan,
        patch: &outcome.patch,
        pipeline: outcome.pipeline.as_ref(),
        warnings: &outcome.report,
    };
    let plan_json = serde_json::to_string_pretty(&record).context("serialize plan")?;
    writer.write_file(&out_dir.join("plan.json"), plan_json.as_bytes())?;

    let report_md = render_report_md(
        &outcome.plan,
        Some(&outcome.patch),
        outcome.pipeline.as_ref(),
        &outcome.report,
    );
    writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.diff.as_bytes())?;

    info!(out_dir = %out_dir, "wrote artifacts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcbump_types::pipeline::Verdict;

    fn outcome(aborted: bool, verdict: Option<Verdict>) -> SwitchOutcome {
        let mut patch = PatchReport::new(false);
        patch.aborted = aborted;
        SwitchOutcome {
            plan: VersionPlan::new(PlanInputs::new("1.21.1"), vec![], vec![]),
            patch,
            diff: String::new(),
            pipeline: verdict.map(|v| PipelineOutcome::new(v, vec![], WarningReport::default())),
            report: WarningReport::default(),
        }
    }

    #[test]
    fn exit_codes() {
        assert_eq!(outcome(false, None).exit_code(), 0);
        assert_eq!(outcome(false, Some(Verdict::Success)).exit_code(), 0);
        assert_eq!(outcome(false, Some(Verdict::DegradedSuccess)).exit_code(), 0);
        assert_eq!(outcome(false, Some(Verdict::Failed)).exit_code(), 1);
        assert_eq!(outcome(true, None).exit_code(), 1);
    }
}
