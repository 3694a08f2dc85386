use crate::catalog::{FactRule, builtin_rules};
use mcbump_sources::{MetadataFetcher, QueryOutcome};
use mcbump_types::fact::{FactId, MetadataFact};
use mcbump_types::plan::{PlanInputs, VersionPlan, Warning, WarningKind};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOADER_FALLBACK: &str = "0.16.9";

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Per-query timeout.
    pub timeout: Duration,
    pub loader_fallback: String,

    /// Replacement URL templates (`{version}` placeholder) keyed by fact.
    pub url_overrides: BTreeMap<FactId, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            loader_fallback: DEFAULT_LOADER_FALLBACK.to_string(),
            url_overrides: BTreeMap::new(),
        }
    }
}

pub struct VersionResolver {
    rules: Vec<FactRule>,
    timeout: Duration,
}

impl Default for VersionResolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl VersionResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        let rules = builtin_rules(&config.loader_fallback)
            .into_iter()
            .map(|mut rule| {
                if let Some(url) = config.url_overrides.get(&rule.fact) {
                    rule.source = rule.source.with_url_template(url.clone());
                }
                rule
            })
            .collect();
        Self {
            rules,
            timeout: config.timeout,
        }
    }

    pub fn with_rules(rules: Vec<FactRule>, timeout: Duration) -> Self {
        Self { rules, timeout }
    }

    pub fn rules(&self) -> &[FactRule] {
        &self.rules
    }

    /// Query every source once, in rule order, and build the plan.
    ///
    /// Never fails: unreachable sources are handled by each fact's fallback policy.
    pub fn resolve(&self, fetcher: &dyn MetadataFetcher, inputs: PlanInputs) -> VersionPlan {
        let target = inputs.minecraft_version.clone();
        let mut facts = Vec::with_capacity(self.rules.len());
        let mut warnings = Vec::new();

        for rule in &self.rules {
            let outcome = rule.source.query(fetcher, &target, self.timeout);
            facts.push(resolve_fact(rule, &target, outcome, &mut warnings));
        }

        VersionPlan::new(inputs, facts, warnings)
    }
}

fn resolve_fact(
    rule: &FactRule,
    target: &str,
    outcome: QueryOutcome,
    warnings: &mut Vec<Warning>,
) -> MetadataFact {
    let fact = rule.fact;

    if let QueryOutcome::Found(value) = outcome {
        info!(fact = %fact, value = %value, "confirmed");
        if let Some(caution) = &rule.caution {
            warn!(fact = %fact, value = %value, "{caution}");
            warnings.push(
                Warning::for_fact(
                    fact,
                    WarningKind::Caution,
                    format!("{} {value}: {caution}", fact.title()),
                )
                .with_remediation(&rule.reference_url),
            );
        }
        return MetadataFact::confirmed(fact, value);
    }

    let why = outcome.describe();
    match rule.fallback.substitute(target) {
        Some(value) => {
            warn!(fact = %fact, value = %value, source = %rule.source.name, "{why}; using fallback");
            warnings.push(
                Warning::for_fact(
                    fact,
                    WarningKind::Fallback,
                    format!(
                        "{} could not be fetched from {} ({why}); using fallback {value}",
                        fact.title(),
                        rule.source.name
                    ),
                )
                .with_remediation(&rule.reference_url),
            );
            MetadataFact::fallback(fact, value)
        }
        None => {
            warn!(fact = %fact, source = %rule.source.name, "{why}; leaving unresolved");
            warnings.push(
                Warning::for_fact(
                    fact,
                    WarningKind::Unresolved,
                    format!(
                        "{} could not be determined from {} ({why}); set it by hand",
                        fact.title(),
                        rule.source.name
                    ),
                )
                .with_remediation(&rule.reference_url),
            );
            MetadataFact::unresolved(fact)
        }
    }
}
