//! Markdown for the `report.md` artifact.

use mcbump_types::fact::Provenance;
use mcbump_types::patch::PatchReport;
use mcbump_types::pipeline::PipelineOutcome;
use mcbump_types::plan::VersionPlan;
use mcbump_types::report::WarningReport;

pub fn render_plan_md(plan: &VersionPlan) -> String {
    let mut out = String::new();
    out.push_str("## Versions\n\n");
    out.push_str(&format!("- Minecraft: `{}`\n", plan.target_version()));
    if let Some(m) = plan.mod_version() {
        out.push_str(&format!("- Mod version: `{m}`\n"));
    }
    out.push_str(&format!(
        "- Confirmed: {}, fallback: {}, unresolved: {}\n\n",
        plan.count(Provenance::Confirmed),
        plan.count(Provenance::Fallback),
        plan.count(Provenance::Unresolved)
    ));

    out.push_str("| Fact | Value | Provenance |\n|---|---|---|\n");
    for fact in plan.facts() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            fact.id().title(),
            fact.value().map(|v| format!("`{v}`")).unwrap_or_else(|| "-".to_string()),
            fact.provenance().label()
        ));
    }
    out.push('\n');
    out
}

pub fn render_patch_md(report: &PatchReport) -> String {
    let mut out = String::new();
    out.push_str("## Files\n\n");
    let s = &report.summary;
    out.push_str(&format!(
        "- Patched: {}\n- Up to date: {}\n- Skipped: {}\n- Could not update: {}\n- Failed: {}\n",
        s.patched, s.up_to_date, s.skipped, s.unmatched, s.failed
    ));
    if report.dry_run {
        out.push_str("- Dry run: nothing was written\n");
    }
    if report.aborted && report.written.is_empty() {
        out.push_str("- Aborted: nothing was written\n");
    } else if report.aborted {
        out.push_str("- Aborted after writing:\n");
        for path in &report.written {
            out.push_str(&format!("  - `{path}`\n"));
        }
    }
    out.push('\n');

    if report.targets.is_empty() {
        out.push_str("_No targets._\n\n");
        return out;
    }

    for t in &report.targets {
        out.push_str(&format!("### `{}`\n\n", t.path));
        out.push_str(&format!("- Status: `{}`\n", t.status.label()));
        if let Some(msg) = &t.message {
            out.push_str(&format!("- Message: {msg}\n"));
        }
        if let Some(change) = &t.change {
            out.push_str(&format!(
                "- sha256: {} → {}\n",
                change.sha256_before, change.sha256_after
            ));
        }
        if !t.fields.is_empty() {
            out.push_str("\n**Fields**\n\n");
            for f in &t.fields {
                let value = f
                    .value
                    .as_deref()
                    .map(|v| format!(" = `{v}`"))
                    .unwrap_or_default();
                out.push_str(&format!("- `{}`{value}: {}\n", f.locator, f.status.label()));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_pipeline_md(outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    out.push_str("## Build\n\n");
    out.push_str(&format!("- Verdict: `{}`\n\n", outcome.verdict.label()));
    out.push_str("| Stage | Result | Exit | Time |\n|---|---|---|---|\n");
    for s in &outcome.stages {
        out.push_str(&format!(
            "| {} | {} | {} | {:.1}s |\n",
            s.name,
            s.class.label(),
            s.exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            s.elapsed_ms as f64 / 1000.0
        ));
    }
    for name in &outcome.skipped {
        out.push_str(&format!("| {name} | not run | - | - |\n"));
    }
    for s in outcome.stages.iter().filter(|s| !s.succeeded()) {
        for (stream, lines) in crate::text::output_excerpts(s) {
            out.push_str(&format!(
                "\n**{} {stream}** (last {} lines)\n\n```text\n",
                s.name,
                lines.len()
            ));
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("```\n");
        }
    }
    if !outcome.artifacts.is_empty() {
        out.push_str("\n**Artifacts**\n\n");
        for jar in &outcome.artifacts {
            out.push_str(&format!("- `{jar}`\n"));
        }
    }
    out.push('\n');
    out
}

pub fn render_warnings_md(report: &WarningReport) -> String {
    let mut out = String::new();
    out.push_str("## Needs verification\n\n");
    if report.is_empty() {
        out.push_str("_Nothing: every value was confirmed._\n");
        return out;
    }
    for e in &report.entries {
        out.push_str(&format!(
            "- **{}** `{}` ({}): {}\n",
            e.kind.label(),
            e.subject,
            e.phase.label(),
            e.message
        ));
        if let Some(url) = &e.remediation {
            out.push_str(&format!("  - Check: <{url}>\n"));
        }
        if !e.files.is_empty() {
            let files: Vec<String> = e.files.iter().map(|f| format!("`{f}`")).collect();
            out.push_str(&format!("  - Files: {}\n", files.join(", ")));
        }
    }
    out
}

/// The whole `report.md`: versions, files, build, then the warnings.
pub fn render_report_md(
    plan: &VersionPlan,
    patch: Option<&PatchReport>,
    pipeline: Option<&PipelineOutcome>,
    warnings: &WarningReport,
) -> String {
    let mut out = String::new();
    out.push_str("# mcbump report\n\n");
    out.push_str(&render_plan_md(plan));
    if let Some(patch) = patch {
        out.push_str(&render_patch_md(patch));
    }
    if let Some(pipeline) = pipeline {
        out.push_str(&render_pipeline_md(pipeline));
    }
    out.push_str(&render_warnings_md(warnings));
    out
}
