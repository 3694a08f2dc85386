use serde::{Deserialize, Serialize};
use std::fmt;

/// The version facts mcbump knows how to resolve.
///
/// The order of [`FactId::ALL`] is the resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactId {
    YarnMappings,
    LoaderVersion,
    FabricVersion,
    GradleVersion,
    LoomVersion,
}

impl FactId {
    pub const ALL: [FactId; 5] = [
        FactId::YarnMappings,
        FactId::LoaderVersion,
        FactId::FabricVersion,
        FactId::GradleVersion,
        FactId::LoomVersion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactId::YarnMappings => "yarn_mappings",
            FactId::LoaderVersion => "loader_version",
            FactId::FabricVersion => "fabric_version",
            FactId::GradleVersion => "gradle_version",
            FactId::LoomVersion => "loom_version",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    /// Human-readable name used in reports.
    pub fn title(self) -> &'static str {
        match self {
            FactId::YarnMappings => "Yarn mappings",
            FactId::LoaderVersion => "Fabric Loader",
            FactId::FabricVersion => "Fabric API",
            FactId::GradleVersion => "Gradle",
            FactId::LoomVersion => "Fabric Loom",
        }
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a resolved value can be trusted.
///
/// - confirmed: a live query returned a non-empty value
/// - fallback: a static or derived default was substituted
/// - unresolved: neither worked and no safe default exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Confirmed,
    Fallback,
    Unresolved,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Provenance::Confirmed => "confirmed",
            Provenance::Fallback => "fallback",
            Provenance::Unresolved => "unresolved",
        }
    }
}

/// A single resolved (or unresolved) fact.
///
/// Only constructible through [`MetadataFact::confirmed`], [`MetadataFact::fallback`] and
/// [`MetadataFact::unresolved`], so a value is present exactly when the provenance is not
/// `unresolved`. Deserialization enforces the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFact")]
pub struct MetadataFact {
    id: FactId,

    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,

    provenance: Provenance,
}

impl MetadataFact {
    pub fn confirmed(id: FactId, value: impl Into<String>) -> Self {
        Self {
            id,
            value: Some(value.into()),
            provenance: Provenance::Confirmed,
        }
    }

    pub fn fallback(id: FactId, value: impl Into<String>) -> Self {
        Self {
            id,
            value: Some(value.into()),
            provenance: Provenance::Fallback,
        }
    }

    pub fn unresolved(id: FactId) -> Self {
        Self {
            id,
            value: None,
            provenance: Provenance::Unresolved,
        }
    }

    pub fn id(&self) -> FactId {
        self.id
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// True when the value may be written to disk (confirmed or fallback).
    pub fn is_usable(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Deserialize)]
struct RawFact {
    id: FactId,
    #[serde(default)]
    value: Option<String>,
    provenance: Provenance,
}

impl TryFrom<RawFact> for MetadataFact {
    type Error = String;

    fn try_from(raw: RawFact) -> Result<Self, Self::Error> {
        match (raw.provenance, raw.value) {
            (Provenance::Unresolved, None) => Ok(Self::unresolved(raw.id)),
            (Provenance::Unresolved, Some(v)) => Err(format!(
                "unresolved fact `{}` must not carry a value (got `{v}`)",
                raw.id.as_str()
            )),
            (Provenance::Confirmed, Some(v)) => Ok(Self::confirmed(raw.id, v)),
            (Provenance::Fallback, Some(v)) => Ok(Self::fallback(raw.id, v)),
            (p, None) => Err(format!(
                "{} fact `{}` is missing its value",
                p.label(),
                raw.id.as_str()
            )),
        }
    }
}
