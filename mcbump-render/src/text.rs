//! Plain-text views printed by the CLI.

use mcbump_types::patch::{FieldStatus, PatchReport};
use mcbump_types::pipeline::{PipelineOutcome, StageResult};
use mcbump_types::plan::VersionPlan;
use mcbump_types::report::WarningReport;

pub fn render_plan_text(plan: &VersionPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!("Minecraft {}", plan.target_version()));
    if let Some(m) = plan.mod_version() {
        out.push_str(&format!(" (mod {m})"));
    }
    out.push('\n');

    for fact in plan.facts() {
        out.push_str(&format!(
            "  {:<16} {:<24} {}\n",
            fact.id().as_str(),
            fact.value().unwrap_or("-"),
            fact.provenance().label()
        ));
    }
    out
}

pub fn render_patch_text(report: &PatchReport) -> String {
    let mut out = String::new();
    for t in &report.targets {
        out.push_str(&format!("  {:<44} {}\n", t.path, t.status.label()));
        if let Some(msg) = &t.message {
            out.push_str(&format!("      {msg}\n"));
        }
        for f in t.fields.iter().filter(|f| f.status == FieldStatus::NotFound) {
            out.push_str(&format!("      could not update `{}`\n", f.locator));
        }
    }
    let s = &report.summary;
    out.push_str(&format!(
        "{} patched, {} up to date, {} skipped, {} could not update, {} failed",
        s.patched, s.up_to_date, s.skipped, s.unmatched, s.failed
    ));
    if report.dry_run {
        out.push_str(" (dry run, nothing written)");
    } else if report.aborted && report.written.is_empty() {
        out.push_str(" (aborted, nothing written)");
    } else if report.aborted {
        out.push_str(&format!(
            " (aborted after writing {})",
            report.written.join(", ")
        ));
    }
    out.push('\n');
    out
}

pub fn render_pipeline_text(outcome: &PipelineOutcome) -> String {
    let mut out = String::new();
    for s in &outcome.stages {
        let code = s
            .exit_code
            .map(|c| format!("exit {c}"))
            .unwrap_or_else(|| "no exit code".to_string());
        out.push_str(&format!(
            "  {:<12} {:<18} {:>8.1}s  {}\n",
            s.name,
            s.class.label(),
            s.elapsed_ms as f64 / 1000.0,
            code
        ));
    }
    for s in outcome.stages.iter().filter(|s| !s.succeeded()) {
        for (stream, lines) in output_excerpts(s) {
            out.push_str(&format!(
                "      {} {stream} (last {} lines):\n",
                s.name,
                lines.len()
            ));
            for line in lines {
                out.push_str(&format!("        | {line}\n"));
            }
        }
    }
    for name in &outcome.skipped {
        out.push_str(&format!("  {name:<12} not run\n"));
    }
    for jar in &outcome.artifacts {
        out.push_str(&format!("  built {jar}\n"));
    }
    out.push_str(&format!("Build: {}\n", outcome.verdict.label()));
    out
}

/// Lines of captured output shown for each stage that did not succeed.
const OUTPUT_TAIL_LINES: usize = 20;

/// The last `max` lines of `text`, ignoring trailing blank lines.
pub(crate) fn tail(text: &str, max: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |i| i + 1);
    lines[end.saturating_sub(max)..end].to_vec()
}

/// stderr first, then stdout; empty streams are left out.
pub(crate) fn output_excerpts(stage: &StageResult) -> Vec<(&'static str, Vec<&str>)> {
    [("stderr", stage.stderr.as_str()), ("stdout", stage.stdout.as_str())]
        .into_iter()
        .map(|(name, text)| (name, tail(text, OUTPUT_TAIL_LINES)))
        .filter(|(_, lines)| !lines.is_empty())
        .collect()
}

/// Numbered warning list, or a single line saying there is nothing to check.
pub fn render_text(report: &WarningReport) -> String {
    let lines = crate::report::render_lines(report);
    if lines.is_empty() {
        return "No warnings: every value was confirmed.\n".to_string();
    }
    let mut out = format!("{} item(s) need a human check:\n", lines.len());
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!("  {}. {line}\n", i + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcbump_types::fact::{FactId, MetadataFact};
    use mcbump_types::pipeline::{StageClass, StageResult, Verdict};
    use mcbump_types::plan::PlanInputs;
    use pretty_assertions::assert_eq;

    #[test]
    fn plan_table() {
        let plan = VersionPlan::new(
            PlanInputs::new("1.21.1").with_mod_version("2.0.0"),
            vec![
                MetadataFact::confirmed(FactId::YarnMappings, "1.21.1+build.5"),
                MetadataFact::unresolved(FactId::FabricVersion),
            ],
            vec![],
        );
        assert_eq!(
            render_plan_text(&plan),
            "Minecraft 1.21.1 (mod 2.0.0)\n\
             \x20 yarn_mappings    1.21.1+build.5           confirmed\n\
             \x20 fabric_version   -                        unresolved\n"
        );
    }

    #[test]
    fn tail_keeps_last_lines_and_drops_trailing_blanks() {
        assert_eq!(tail("a\nb\nc\nd\n\n  \n", 2), vec!["c", "d"]);
        assert_eq!(tail("only\n", 20), vec!["only"]);
        assert!(tail("\n\n", 5).is_empty());
    }

    #[test]
    fn aborted_patch_names_written_files() {
        let mut report = PatchReport::new(false);
        report.aborted = true;
        assert!(render_patch_text(&report).ends_with("(aborted, nothing written)\n"));

        report.written = vec!["gradle.properties".to_string(), "build.gradle".to_string()];
        assert!(
            render_patch_text(&report)
                .ends_with("(aborted after writing gradle.properties, build.gradle)\n")
        );
    }

    #[test]
    fn empty_report() {
        assert_eq!(
            render_text(&WarningReport::default()),
            "No warnings: every value was confirmed.\n"
        );
    }

    #[test]
    fn pipeline_summary() {
        let mut outcome = PipelineOutcome::new(
            Verdict::Failed,
            vec![StageResult {
                name: "clean".to_string(),
                required: true,
                exit_code: Some(1),
                stdout: String::new(),
                stderr: String::new(),
                elapsed_ms: 1500,
                class: StageClass::FailedRequired,
                error: None,
            }],
            WarningReport::default(),
        );
        outcome.stages[0].stderr = "Deleting build\nerror: cannot find symbol\n\n".to_string();
        outcome.skipped = vec!["build".to_string()];
        let text = render_pipeline_text(&outcome);
        assert!(text.contains("clean        failed (required)       1.5s  exit 1\n"));
        assert!(text.contains(
            "      clean stderr (last 2 lines):\n\
             \x20       | Deleting build\n\
             \x20       | error: cannot find symbol\n"
        ));
        assert!(!text.contains("clean stdout"));
        assert!(text.contains("build        not run\n"));
        assert!(text.ends_with("Build: failed\n"));
    }
}
