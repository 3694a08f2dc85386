use mcbump_types::patch::{FieldStatus, PatchReport, PatchTarget, TargetStatus};
use mcbump_types::plan::{VersionPlan, WarningKind};
use mcbump_types::report::{ReportEntry, ReportPhase, WarningReport};

/// One entry per resolution warning, pointing at the files that embed the fact.
///
/// Pure over the plan: calling it again gives the same report without re-querying anything.
pub fn warning_report(plan: &VersionPlan, targets: &[PatchTarget]) -> WarningReport {
    let mut report = WarningReport::default();
    for w in plan.warnings() {
        let files = w
            .fact
            .map(|id| {
                targets
                    .iter()
                    .filter(|t| t.facts().contains(&id))
                    .map(|t| t.path.to_string())
                    .collect()
            })
            .unwrap_or_default();

        report.push(ReportEntry {
            phase: ReportPhase::Resolve,
            kind: w.kind,
            subject: w
                .fact
                .map(|id| id.to_string())
                .unwrap_or_else(|| "plan".to_string()),
            message: w.message.clone(),
            remediation: w.remediation.clone(),
            files,
        });
    }
    report
}

/// Add what the patch step left for a human: unmatched locators, wildcards, failures.
pub fn extend_with_patch(report: &mut WarningReport, patch: &PatchReport) {
    for target in &patch.targets {
        if target.status == TargetStatus::Failed {
            report.push(entry(
                WarningKind::PatchFailure,
                &target.path,
                format!(
                    "{}; remaining files were not processed",
                    target.message.as_deref().unwrap_or("patch failed")
                ),
            ));
            continue;
        }

        for field in &target.fields {
            match field.status {
                FieldStatus::NotFound => report.push(entry(
                    WarningKind::Unmatched,
                    &target.path,
                    format!("could not update `{}`: not found", field.locator),
                )),
                FieldStatus::Wildcarded => report.push(entry(
                    WarningKind::Caution,
                    &target.path,
                    format!(
                        "wrote `*` for `{}` because {} is unresolved; pin it once known",
                        field.locator,
                        field
                            .facts
                            .iter()
                            .map(|f| f.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )),
                _ => {}
            }
        }
    }
}

fn entry(kind: WarningKind, path: &str, message: String) -> ReportEntry {
    ReportEntry {
        phase: ReportPhase::Patch,
        kind,
        subject: path.to_string(),
        message,
        remediation: None,
        files: vec![path.to_string()],
    }
}

/// One line per entry: `[kind] subject: message (see url) [files]`.
pub fn render_lines(report: &WarningReport) -> Vec<String> {
    report
        .entries
        .iter()
        .map(|e| {
            let mut line = format!("[{}] {}: {}", e.kind.label(), e.subject, e.message);
            if let Some(url) = &e.remediation {
                line.push_str(&format!(" (see {url})"));
            }
            if !e.files.is_empty() && e.phase == ReportPhase::Resolve {
                line.push_str(&format!(" [affects {}]", e.files.join(", ")));
            }
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcbump_types::fact::{FactId, MetadataFact};
    use mcbump_types::patch::{
        Binding, FieldOutcome, FileFormat, Locator, TargetOutcome, ValueTemplate,
    };
    use mcbump_types::plan::{PlanInputs, Warning};
    use pretty_assertions::assert_eq;

    fn targets() -> Vec<PatchTarget> {
        vec![
            PatchTarget::new("gradle.properties", FileFormat::LinePattern).bind(Binding::new(
                Locator::property("fabric_version"),
                ValueTemplate::fact(FactId::FabricVersion),
            )),
            PatchTarget::new("build.gradle", FileFormat::LinePattern).bind(Binding::new(
                Locator::PluginVersion {
                    plugin_id: "fabric-loom".to_string(),
                },
                ValueTemplate::fact(FactId::LoomVersion),
            )),
        ]
    }

    #[test]
    fn resolution_warnings_point_at_files() {
        let plan = VersionPlan::new(
            PlanInputs::new("1.21.1"),
            vec![MetadataFact::unresolved(FactId::FabricVersion)],
            vec![
                Warning::for_fact(
                    FactId::FabricVersion,
                    WarningKind::Unresolved,
                    "Fabric API could not be determined",
                )
                .with_remediation("https://fabricmc.net/develop/"),
            ],
        );

        let report = warning_report(&plan, &targets());
        assert_eq!(report.entries[0].files, vec!["gradle.properties".to_string()]);
        assert_eq!(
            render_lines(&report),
            vec![
                "[unresolved] fabric_version: Fabric API could not be determined \
                 (see https://fabricmc.net/develop/) [affects gradle.properties]"
                    .to_string()
            ]
        );
        // Same input, same output.
        assert_eq!(warning_report(&plan, &targets()), report);
    }

    #[test]
    fn patch_entries() {
        let mut patch = PatchReport::new(false);
        patch.targets.push(TargetOutcome {
            path: "build.gradle".to_string(),
            status: TargetStatus::Unmatched,
            fields: vec![FieldOutcome {
                locator: "plugin 'fabric-loom' version".to_string(),
                status: FieldStatus::NotFound,
                facts: vec![FactId::LoomVersion],
                value: Some("1.10.1".to_string()),
            }],
            message: Some("could not update: no locator matched".to_string()),
            change: None,
        });
        patch.targets.push(TargetOutcome {
            path: "src/main/resources/fabric.mod.json".to_string(),
            status: TargetStatus::Failed,
            fields: vec![],
            message: Some("malformed document".to_string()),
            change: None,
        });

        let mut report = WarningReport::default();
        extend_with_patch(&mut report, &patch);

        let kinds: Vec<WarningKind> = report.entries.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![WarningKind::Unmatched, WarningKind::PatchFailure]);
        assert_eq!(
            render_lines(&report)[0],
            "[unmatched] build.gradle: could not update `plugin 'fabric-loom' version`: not found"
        );
    }
}
