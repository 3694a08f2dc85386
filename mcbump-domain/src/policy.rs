use serde::{Deserialize, Serialize};

/// What to do when a fact's source yields nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// `<target version><suffix>`, e.g. `1.21.1+build.1`.
    Derive { suffix: String },

    /// A fixed last-known-good value.
    Literal { value: String },

    /// Never guess. The fact stays unresolved and the operator is sent to `url`.
    ManualLookup { url: String },
}

impl FallbackPolicy {
    /// The value substituted for `target`, if this policy substitutes one.
    pub fn substitute(&self, target: &str) -> Option<String> {
        match self {
            FallbackPolicy::Derive { suffix } => Some(format!("{target}{suffix}")),
            FallbackPolicy::Literal { value } => Some(value.clone()),
            FallbackPolicy::ManualLookup { .. } => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FallbackPolicy::Derive { suffix } => format!("derive `<minecraft_version>{suffix}`"),
            FallbackPolicy::Literal { value } => format!("use `{value}`"),
            FallbackPolicy::ManualLookup { url } => {
                format!("leave unresolved; look it up at {url}")
            }
        }
    }
}
