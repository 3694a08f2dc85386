use crate::policy::FallbackPolicy;
use mcbump_sources::{MetadataSource, default_sources};
use mcbump_types::fact::FactId;
use serde::Serialize;

pub const FABRIC_DEVELOP_URL: &str = "https://fabricmc.net/develop/";
pub const GRADLE_RELEASES_URL: &str = "https://gradle.org/releases/";
pub const LOOM_MAVEN_URL: &str = "https://maven.fabricmc.net/net/fabricmc/fabric-loom/";

/// How one fact is resolved: where to ask, and what to do when nobody answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactRule {
    pub fact: FactId,
    pub source: MetadataSource,
    pub fallback: FallbackPolicy,

    /// Emitted even when the live query succeeds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caution: Option<String>,

    /// Where an operator can check the value by hand.
    pub reference_url: String,
}

/// The built-in rules, one per fact, in resolution order.
pub fn builtin_rules(loader_fallback: &str) -> Vec<FactRule> {
    default_sources()
        .into_iter()
        .map(|source| rule_for(source, loader_fallback))
        .collect()
}

fn rule_for(source: MetadataSource, loader_fallback: &str) -> FactRule {
    let fact = source.fact;
    let (fallback, caution, reference_url) = match fact {
        FactId::YarnMappings => (
            FallbackPolicy::Derive {
                suffix: "+build.1".to_string(),
            },
            None,
            FABRIC_DEVELOP_URL,
        ),
        FactId::LoaderVersion => (
            FallbackPolicy::Literal {
                value: loader_fallback.to_string(),
            },
            None,
            FABRIC_DEVELOP_URL,
        ),
        FactId::FabricVersion => (
            FallbackPolicy::ManualLookup {
                url: FABRIC_DEVELOP_URL.to_string(),
            },
            None,
            FABRIC_DEVELOP_URL,
        ),
        FactId::GradleVersion => (
            FallbackPolicy::ManualLookup {
                url: GRADLE_RELEASES_URL.to_string(),
            },
            Some(
                "the newest Gradle release may not be supported by Fabric Loom yet; \
                 check Loom's minimum Gradle version"
                    .to_string(),
            ),
            GRADLE_RELEASES_URL,
        ),
        FactId::LoomVersion => (
            FallbackPolicy::ManualLookup {
                url: LOOM_MAVEN_URL.to_string(),
            },
            Some(
                "the newest Loom release may not be published to the Fabric maven yet; \
                 the plugin block will fail to resolve until it is"
                    .to_string(),
            ),
            LOOM_MAVEN_URL,
        ),
    };

    FactRule {
        fact,
        source,
        fallback,
        caution,
        reference_url: reference_url.to_string(),
    }
}
