use crate::plan::WarningKind;
use serde::{Deserialize, Serialize};

/// Which part of the run produced a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPhase {
    Resolve,
    Patch,
    Build,
}

impl ReportPhase {
    pub fn label(self) -> &'static str {
        match self {
            ReportPhase::Resolve => "resolve",
            ReportPhase::Patch => "patch",
            ReportPhase::Build => "build",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub phase: ReportPhase,
    pub kind: WarningKind,

    /// What the entry is about: a fact id, a file path, or a stage name.
    pub subject: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,

    /// Files an operator should look at.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

/// The consolidated list of decisions that need a human to verify them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningReport {
    #[serde(default)]
    pub entries: Vec<ReportEntry>,
}

impl WarningReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn in_phase(&self, phase: ReportPhase) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.phase == phase)
    }
}
