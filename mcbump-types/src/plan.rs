use crate::fact::{FactId, MetadataFact, Provenance};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operator-supplied inputs a plan was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInputs {
    pub minecraft_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_version: Option<String>,
}

impl PlanInputs {
    pub fn new(minecraft_version: impl Into<String>) -> Self {
        Self {
            minecraft_version: minecraft_version.into(),
            mod_version: None,
        }
    }

    pub fn with_mod_version(mut self, mod_version: impl Into<String>) -> Self {
        self.mod_version = Some(mod_version.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A default was substituted for a fact.
    Fallback,
    /// No value could be determined; the field will not be written.
    Unresolved,
    /// A live value was found but should still be double-checked.
    Caution,
    /// A locator did not match anything in its file.
    Unmatched,
    /// A target could not be patched; the patch set was aborted.
    PatchFailure,
    /// A build stage failed or timed out.
    StageFailure,
}

impl WarningKind {
    pub fn label(self) -> &'static str {
        match self {
            WarningKind::Fallback => "fallback",
            WarningKind::Unresolved => "unresolved",
            WarningKind::Caution => "caution",
            WarningKind::Unmatched => "unmatched",
            WarningKind::PatchFailure => "patch failure",
            WarningKind::StageFailure => "stage failure",
        }
    }
}

/// A human-readable annotation produced during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact: Option<FactId>,

    pub kind: WarningKind,
    pub message: String,

    /// Where an operator can verify the value by hand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl Warning {
    pub fn for_fact(fact: FactId, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            fact: Some(fact),
            kind,
            message: message.into(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, url: impl Into<String>) -> Self {
        self.remediation = Some(url.into());
        self
    }
}

/// The resolved set of facts for one invocation.
///
/// Built once by the resolver and then only read. There are no mutating accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPlan {
    schema: String,
    inputs: PlanInputs,
    facts: BTreeMap<FactId, MetadataFact>,

    #[serde(default)]
    warnings: Vec<Warning>,
}

impl VersionPlan {
    /// Build a plan. A later fact with the same id replaces an earlier one.
    pub fn new(inputs: PlanInputs, facts: Vec<MetadataFact>, warnings: Vec<Warning>) -> Self {
        let facts = facts.into_iter().map(|f| (f.id(), f)).collect();
        Self {
            schema: crate::schema::MCBUMP_PLAN_V1.to_string(),
            inputs,
            facts,
            warnings,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn inputs(&self) -> &PlanInputs {
        &self.inputs
    }

    pub fn target_version(&self) -> &str {
        &self.inputs.minecraft_version
    }

    pub fn mod_version(&self) -> Option<&str> {
        self.inputs.mod_version.as_deref()
    }

    pub fn fact(&self, id: FactId) -> Option<&MetadataFact> {
        self.facts.get(&id)
    }

    /// Facts in identifier order.
    pub fn facts(&self) -> impl Iterator<Item = &MetadataFact> {
        self.facts.values()
    }

    pub fn value(&self, id: FactId) -> Option<&str> {
        self.fact(id).and_then(MetadataFact::value)
    }

    pub fn provenance(&self, id: FactId) -> Option<Provenance> {
        self.fact(id).map(MetadataFact::provenance)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn warnings_for(&self, id: FactId) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.fact == Some(id))
    }

    pub fn count(&self, provenance: Provenance) -> usize {
        self.facts
            .values()
            .filter(|f| f.provenance() == provenance)
            .count()
    }
}
