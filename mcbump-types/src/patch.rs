use crate::fact::FactId;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// File format family of a patch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// Edited line by line through anchored patterns.
    LinePattern,
    /// Parsed, mutated by key path, and re-serialized.
    StructuredDocument,
}

/// Where a value lives inside its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Locator {
    /// A `key=value` line; the whole line is replaced.
    Property { key: String },
    /// The version segment of a distribution URL held in a `key=value` line.
    DistributionUrl { key: String },
    /// The version string of a plugin declaration in a build script.
    PluginVersion { plugin_id: String },
    /// A nested key path in a structured document.
    KeyPath { path: Vec<String> },
}

impl Locator {
    pub fn property(key: &str) -> Self {
        Locator::Property {
            key: key.to_string(),
        }
    }

    pub fn key_path(path: &[&str]) -> Self {
        Locator::KeyPath {
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The file format this locator can be applied to.
    pub fn format(&self) -> FileFormat {
        match self {
            Locator::KeyPath { .. } => FileFormat::StructuredDocument,
            _ => FileFormat::LinePattern,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Property { key } => write!(f, "{key}="),
            Locator::DistributionUrl { key } => write!(f, "{key}= (version segment)"),
            Locator::PluginVersion { plugin_id } => write!(f, "plugin '{plugin_id}' version"),
            Locator::KeyPath { path } => write!(f, "{}", path.join(".")),
        }
    }
}

/// A named slot inside a [`ValueTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Placeholder {
    MinecraftVersion,
    ModVersion,
    Fact(FactId),
}

impl Placeholder {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "minecraft_version" => Some(Placeholder::MinecraftVersion),
            "mod_version" => Some(Placeholder::ModVersion),
            other => FactId::parse(other).map(Placeholder::Fact),
        }
    }
}

/// A value with `{name}` placeholders, e.g. `"{minecraft_version}-{mod_version}"`.
///
/// Unknown placeholder names are kept as literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueTemplate(String);

impl ValueTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Template that is exactly one fact.
    pub fn fact(id: FactId) -> Self {
        Self(format!("{{{id}}}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut out = Vec::new();
        for (_, name) in self.segments() {
            if let Some(p) = name.and_then(Placeholder::parse)
                && !out.contains(&p)
            {
                out.push(p);
            }
        }
        out
    }

    /// Facts referenced by this template.
    pub fn facts(&self) -> Vec<FactId> {
        self.placeholders()
            .into_iter()
            .filter_map(|p| match p {
                Placeholder::Fact(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Substitute every known placeholder. Returns `None` when `lookup` has no value for one.
    pub fn render<'a>(&self, lookup: impl Fn(Placeholder) -> Option<&'a str>) -> Option<String> {
        let mut out = String::with_capacity(self.0.len());
        for (text, name) in self.segments() {
            match name.and_then(Placeholder::parse) {
                Some(p) => out.push_str(lookup(p)?),
                None => out.push_str(text),
            }
        }
        Some(out)
    }

    /// Split into (raw text, placeholder name) pieces. Raw text of a placeholder includes braces.
    fn segments(&self) -> Vec<(&str, Option<&str>)> {
        let mut out = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            if open > 0 {
                out.push((&rest[..open], None));
            }
            let raw = &rest[open..open + close + 1];
            out.push((raw, Some(&raw[1..raw.len() - 1])));
            rest = &rest[open + close + 1..];
        }
        if !rest.is_empty() {
            out.push((rest, None));
        }
        out
    }
}

/// One value to write into one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub locator: Locator,
    pub value: ValueTemplate,

    /// Write `*` when a referenced fact was sought but came back unresolved.
    #[serde(default)]
    pub wildcard_when_unresolved: bool,
}

impl Binding {
    pub fn new(locator: Locator, value: ValueTemplate) -> Self {
        Self {
            locator,
            value,
            wildcard_when_unresolved: false,
        }
    }

    pub fn wildcard_when_unresolved(mut self, enabled: bool) -> Self {
        self.wildcard_when_unresolved = enabled;
        self
    }
}

/// A file plus the values it embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchTarget {
    /// Path relative to the project root.
    pub path: Utf8PathBuf,
    pub format: FileFormat,
    pub bindings: Vec<Binding>,
}

impl PatchTarget {
    pub fn new(path: impl Into<Utf8PathBuf>, format: FileFormat) -> Self {
        Self {
            path: path.into(),
            format,
            bindings: vec![],
        }
    }

    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Every fact any binding of this target references.
    pub fn facts(&self) -> BTreeSet<FactId> {
        self.bindings.iter().flat_map(|b| b.value.facts()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// At least one field was rewritten.
    Patched,
    /// Every writable field already held its value.
    UpToDate,
    SkippedMissingFile,
    /// Nothing was writable because the referenced facts are unresolved or absent.
    SkippedUnresolvedFact,
    /// Could not update: no locator matched.
    Unmatched,
    Failed,
}

impl TargetStatus {
    pub fn label(self) -> &'static str {
        match self {
            TargetStatus::Patched => "patched",
            TargetStatus::UpToDate => "up-to-date",
            TargetStatus::SkippedMissingFile => "skipped (missing file)",
            TargetStatus::SkippedUnresolvedFact => "skipped (unresolved fact)",
            TargetStatus::Unmatched => "could not update",
            TargetStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Rewritten,
    AlreadyCurrent,
    /// A referenced fact is unresolved; left untouched.
    SkippedUnresolved,
    /// A referenced fact or input is not part of the plan; left untouched.
    SkippedAbsent,
    /// A referenced fact is unresolved; the wildcard was written instead.
    Wildcarded,
    NotFound,
}

impl FieldStatus {
    pub fn label(self) -> &'static str {
        match self {
            FieldStatus::Rewritten => "rewritten",
            FieldStatus::AlreadyCurrent => "already current",
            FieldStatus::SkippedUnresolved => "skipped (unresolved)",
            FieldStatus::SkippedAbsent => "skipped (not in plan)",
            FieldStatus::Wildcarded => "wildcard",
            FieldStatus::NotFound => "not found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub locator: String,
    pub status: FieldStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facts: Vec<FactId>,

    /// The value written (or that would have been written in dry-run).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub sha256_before: String,
    pub sha256_after: String,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub path: String,
    pub status: TargetStatus,

    #[serde(default)]
    pub fields: Vec<FieldOutcome>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<FileChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    pub targets: u64,
    pub patched: u64,
    pub up_to_date: u64,
    pub skipped: u64,
    pub unmatched: u64,
    pub failed: u64,
}

/// Result of applying a patch set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchReport {
    pub schema: String,
    pub dry_run: bool,

    #[serde(default)]
    pub targets: Vec<TargetOutcome>,

    pub summary: PatchSummary,

    /// True when a failed target stopped the remaining targets from being processed.
    #[serde(default)]
    pub aborted: bool,

    /// Files rewritten on disk, in the order they were written.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<String>,
}

impl PatchReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            schema: crate::schema::MCBUMP_PATCH_V1.to_string(),
            dry_run,
            targets: vec![],
            summary: PatchSummary::default(),
            aborted: false,
            written: vec![],
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_lists_placeholders_once() {
        let t = ValueTemplate::new("{minecraft_version}-{mod_version}-{minecraft_version}");
        assert_eq!(
            t.placeholders(),
            vec![Placeholder::MinecraftVersion, Placeholder::ModVersion]
        );
        assert!(t.facts().is_empty());
    }

    #[test]
    fn template_renders_known_placeholders() {
        let t = ValueTemplate::new(">={loader_version}");
        let rendered = t.render(|p| match p {
            Placeholder::Fact(FactId::LoaderVersion) => Some("0.16.9"),
            _ => None,
        });
        assert_eq!(rendered.as_deref(), Some(">=0.16.9"));
        assert_eq!(t.facts(), vec![FactId::LoaderVersion]);
    }

    #[test]
    fn template_missing_value_renders_none() {
        let t = ValueTemplate::new("{minecraft_version}-{mod_version}");
        let rendered = t.render(|p| match p {
            Placeholder::MinecraftVersion => Some("1.21.1"),
            _ => None,
        });
        assert_eq!(rendered, None);
    }

    #[test]
    fn unknown_placeholders_stay_literal() {
        let t = ValueTemplate::new("{unknown}+{yarn_mappings}");
        let rendered = t.render(|_| Some("x"));
        assert_eq!(rendered.as_deref(), Some("{unknown}+x"));
    }

    #[test]
    fn target_collects_facts() {
        let target = PatchTarget::new("gradle.properties", FileFormat::LinePattern)
            .bind(Binding::new(
                Locator::property("loader_version"),
                ValueTemplate::fact(FactId::LoaderVersion),
            ))
            .bind(Binding::new(
                Locator::property("minecraft_version"),
                ValueTemplate::new("{minecraft_version}"),
            ));
        assert_eq!(
            target.facts().into_iter().collect::<Vec<_>>(),
            vec![FactId::LoaderVersion]
        );
    }
}
