use crate::diff::{file_change, render_patch};
use crate::document::{self, KeyEdit};
use crate::error::PatchError;
use crate::lines;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use mcbump_types::fact::Provenance;
use mcbump_types::patch::{
    Binding, FieldOutcome, FieldStatus, FileFormat, Locator, PatchReport, PatchTarget,
    Placeholder, TargetOutcome, TargetStatus,
};
use mcbump_types::plan::VersionPlan;
use std::collections::BTreeMap;
use std::io;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    pub dry_run: bool,
}

/// Apply a patch set in order.
///
/// Every target is computed in memory first. Files are written only when `opts.dry_run` is
/// false and no target failed; a failed target stops the remaining ones and nothing is
/// written. Changed files are then written in patch order. A write error marks its target
/// failed and stops; [`PatchReport::written`] lists what had already been rewritten. The
/// report and the diff are produced either way.
pub fn apply_patch_set(
    root: &Utf8Path,
    plan: &VersionPlan,
    targets: &[PatchTarget],
    opts: &ApplyOptions,
) -> (PatchReport, String) {
    let outcome = execute(root, plan, targets);
    let patch = render_patch(&outcome.before, &outcome.after);

    let mut report = PatchReport::new(opts.dry_run);
    report.aborted = outcome.aborted;
    report.targets = outcome.targets;

    if !opts.dry_run && !report.aborted {
        write_changed(root, &outcome.before, &outcome.after, &mut report);
    }

    let statuses: Vec<TargetStatus> = report.targets.iter().map(|t| t.status).collect();
    for status in statuses {
        tally(&mut report, status);
    }
    (report, patch)
}

fn write_changed(
    root: &Utf8Path,
    before: &BTreeMap<Utf8PathBuf, String>,
    after: &BTreeMap<Utf8PathBuf, String>,
    report: &mut PatchReport,
) {
    for idx in 0..report.targets.len() {
        let path = Utf8PathBuf::from(&report.targets[idx].path);
        if report.written.iter().any(|w| w == path.as_str()) {
            continue;
        }
        let Some(new_contents) = after.get(&path) else {
            continue;
        };
        let old = before.get(&path).map(String::as_str).unwrap_or("");
        if old == new_contents {
            continue;
        }

        let abs = abs_path(root, &path);
        match fs::write(&abs, new_contents) {
            Ok(()) => {
                info!(path = %path, "wrote");
                report.written.push(path.to_string());
            }
            Err(e) => {
                let err = PatchError::Io(e);
                warn!(path = %path, error = %err, written = ?report.written, "write failed; stopping");
                let target = &mut report.targets[idx];
                target.status = TargetStatus::Failed;
                target.message = Some(format!("write failed: {err}"));
                report.aborted = true;
                return;
            }
        }
    }
}

fn tally(report: &mut PatchReport, status: TargetStatus) {
    let s = &mut report.summary;
    s.targets += 1;
    match status {
        TargetStatus::Patched => s.patched += 1,
        TargetStatus::UpToDate => s.up_to_date += 1,
        TargetStatus::SkippedMissingFile | TargetStatus::SkippedUnresolvedFact => s.skipped += 1,
        TargetStatus::Unmatched => s.unmatched += 1,
        TargetStatus::Failed => s.failed += 1,
    }
}

struct ExecuteOutcome {
    before: BTreeMap<Utf8PathBuf, String>,
    after: BTreeMap<Utf8PathBuf, String>,
    targets: Vec<TargetOutcome>,
    aborted: bool,
}

fn execute(root: &Utf8Path, plan: &VersionPlan, targets: &[PatchTarget]) -> ExecuteOutcome {
    let mut before: BTreeMap<Utf8PathBuf, String> = BTreeMap::new();
    let mut after: BTreeMap<Utf8PathBuf, String> = BTreeMap::new();
    let mut outcomes = Vec::with_capacity(targets.len());
    let mut aborted = false;

    for target in targets {
        let path = target.path.as_str();

        let current = match after.get(&target.path) {
            Some(c) => c.clone(),
            None => match read_target(root, &target.path) {
                Ok(Some(c)) => {
                    before.insert(target.path.clone(), c.clone());
                    c
                }
                Ok(None) => {
                    info!(path, "missing; skipped");
                    outcomes.push(TargetOutcome {
                        path: path.to_string(),
                        status: TargetStatus::SkippedMissingFile,
                        fields: vec![],
                        message: Some("file not found".to_string()),
                        change: None,
                    });
                    continue;
                }
                Err(e) => {
                    outcomes.push(failed(path, &PatchError::Io(e)));
                    aborted = true;
                    break;
                }
            },
        };

        let edited = match target.format {
            FileFormat::LinePattern => edit_lines(&current, target, plan),
            FileFormat::StructuredDocument => edit_document(&current, target, plan),
        };

        match edited {
            Ok((contents, fields)) => {
                let changed = contents != current;
                let status = target_status(changed, &fields);
                let change = changed.then(|| file_change(path, &current, &contents));
                let message = (status == TargetStatus::Unmatched)
                    .then(|| "could not update: no locator matched".to_string());

                match status {
                    TargetStatus::Unmatched => warn!(path, "could not update"),
                    _ => info!(path, status = status.label(), "target"),
                }

                after.insert(target.path.clone(), contents);
                outcomes.push(TargetOutcome {
                    path: path.to_string(),
                    status,
                    fields,
                    message,
                    change,
                });
            }
            Err(e) => {
                outcomes.push(failed(path, &e));
                aborted = true;
                break;
            }
        }
    }

    ExecuteOutcome {
        before,
        after,
        targets: outcomes,
        aborted,
    }
}

fn failed(path: &str, err: &PatchError) -> TargetOutcome {
    warn!(path, error = %err, "patch failed; stopping");
    TargetOutcome {
        path: path.to_string(),
        status: TargetStatus::Failed,
        fields: vec![],
        message: Some(err.to_string()),
        change: None,
    }
}

fn read_target(root: &Utf8Path, rel: &Utf8Path) -> io::Result<Option<String>> {
    match fs::read_to_string(abs_path(root, rel)) {
        Ok(c) => Ok(Some(c)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn abs_path(root: &Utf8Path, rel: &Utf8Path) -> Utf8PathBuf {
    if rel.is_absolute() {
        rel.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// Changed content wins, then "could not update", then "already current".
fn target_status(changed: bool, fields: &[FieldOutcome]) -> TargetStatus {
    let any = |s: FieldStatus| fields.iter().any(|f| f.status == s);
    if changed {
        TargetStatus::Patched
    } else if any(FieldStatus::NotFound) {
        TargetStatus::Unmatched
    } else if any(FieldStatus::AlreadyCurrent) || any(FieldStatus::Wildcarded) {
        TargetStatus::UpToDate
    } else {
        TargetStatus::SkippedUnresolvedFact
    }
}

enum Resolution {
    Write { value: String, wildcard: bool },
    Skip(FieldStatus),
}

fn resolve_binding(binding: &Binding, plan: &VersionPlan) -> Resolution {
    let facts = binding.value.facts();
    let unresolved = facts
        .iter()
        .any(|id| plan.provenance(*id) == Some(Provenance::Unresolved));

    if unresolved {
        return if binding.wildcard_when_unresolved {
            Resolution::Write {
                value: "*".to_string(),
                wildcard: true,
            }
        } else {
            Resolution::Skip(FieldStatus::SkippedUnresolved)
        };
    }

    let rendered = binding.value.render(|p| match p {
        Placeholder::MinecraftVersion => Some(plan.target_version()),
        Placeholder::ModVersion => plan.mod_version(),
        Placeholder::Fact(id) => plan.value(id),
    });
    match rendered {
        Some(value) => Resolution::Write {
            value,
            wildcard: false,
        },
        None => Resolution::Skip(FieldStatus::SkippedAbsent),
    }
}

fn field(binding: &Binding, status: FieldStatus, value: Option<String>) -> FieldOutcome {
    debug!(locator = %binding.locator, status = status.label(), "field");
    FieldOutcome {
        locator: binding.locator.to_string(),
        status,
        facts: binding.value.facts(),
        value,
    }
}

fn edit_lines(
    content: &str,
    target: &PatchTarget,
    plan: &VersionPlan,
) -> Result<(String, Vec<FieldOutcome>), PatchError> {
    let mut text = content.to_string();
    let mut fields = Vec::with_capacity(target.bindings.len());

    for binding in &target.bindings {
        let (value, wildcard) = match resolve_binding(binding, plan) {
            Resolution::Write { value, wildcard } => (value, wildcard),
            Resolution::Skip(status) => {
                fields.push(field(binding, status, None));
                continue;
            }
        };

        let edit = lines::rewrite(&text, &binding.locator, &value, target.path.as_str())?;
        let status = if edit.matches == 0 {
            FieldStatus::NotFound
        } else if wildcard {
            FieldStatus::Wildcarded
        } else if edit.changed(&text) {
            FieldStatus::Rewritten
        } else {
            FieldStatus::AlreadyCurrent
        };
        text = edit.content;
        fields.push(field(binding, status, Some(value)));
    }

    Ok((text, fields))
}

fn edit_document(
    content: &str,
    target: &PatchTarget,
    plan: &VersionPlan,
) -> Result<(String, Vec<FieldOutcome>), PatchError> {
    let path = target.path.as_str();
    let mut doc = document::parse(content, path)?;
    let mut fields = Vec::with_capacity(target.bindings.len());
    let mut changed = false;

    for binding in &target.bindings {
        let Locator::KeyPath { path: key_path } = &binding.locator else {
            return Err(PatchError::FormatMismatch {
                path: path.to_string(),
                locator: binding.locator.to_string(),
                format: "structured-document",
            });
        };

        let (value, wildcard) = match resolve_binding(binding, plan) {
            Resolution::Write { value, wildcard } => (value, wildcard),
            Resolution::Skip(status) => {
                fields.push(field(binding, status, None));
                continue;
            }
        };

        let status = match document::set_string(&mut doc, key_path, &value) {
            KeyEdit::NotFound => FieldStatus::NotFound,
            edit => {
                changed |= edit == KeyEdit::Changed;
                match (wildcard, edit) {
                    (true, _) => FieldStatus::Wildcarded,
                    (false, KeyEdit::Changed) => FieldStatus::Rewritten,
                    _ => FieldStatus::AlreadyCurrent,
                }
            }
        };
        fields.push(field(binding, status, Some(value)));
    }

    // Untouched documents keep their exact original bytes.
    let text = if changed {
        document::serialize(&doc, content, path)?
    } else {
        content.to_string()
    };
    Ok((text, fields))
}
