use crate::fetch::{MetadataFetcher, SourceError};
use crate::latest::latest_from_json;
use mcbump_types::fact::FactId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// The result of one live query.
///
/// "Source unavailable" is a value here, not an error: callers decide what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// A non-empty value.
    Found(String),
    /// The source answered, but nothing usable was in it.
    NoData { reason: String },
    /// The source could not be reached or its answer could not be read.
    Unavailable(SourceError),
}

impl QueryOutcome {
    pub fn value(&self) -> Option<&str> {
        match self {
            QueryOutcome::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            QueryOutcome::Found(v) => format!("found {v}"),
            QueryOutcome::NoData { reason } => format!("no data ({reason})"),
            QueryOutcome::Unavailable(err) => format!("unavailable ({err})"),
        }
    }
}

/// One provider of one fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSource {
    pub fact: FactId,
    pub name: String,

    /// GET URL; `{version}` is replaced by the target Minecraft version.
    pub url_template: String,

    /// Field holding the version in object responses (or in array elements).
    pub field: String,

    /// Prefix removed from the found value, e.g. `v` on release tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,
}

impl MetadataSource {
    pub fn new(
        fact: FactId,
        name: impl Into<String>,
        url_template: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            fact,
            name: name.into(),
            url_template: url_template.into(),
            field: field.into(),
            strip_prefix: None,
        }
    }

    pub fn strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    pub fn with_url_template(mut self, url_template: impl Into<String>) -> Self {
        self.url_template = url_template.into();
        self
    }

    pub fn url(&self, target_version: &str) -> String {
        self.url_template.replace("{version}", target_version)
    }

    pub fn query(
        &self,
        fetcher: &dyn MetadataFetcher,
        target_version: &str,
        timeout: Duration,
    ) -> QueryOutcome {
        let url = self.url(target_version);
        let outcome = match fetcher.get_json(&url, timeout) {
            Ok(Some(body)) => match latest_from_json(&body, &self.field) {
                Some(found) => QueryOutcome::Found(self.clean(found)),
                None => QueryOutcome::NoData {
                    reason: format!("no `{}` in response", self.field),
                },
            },
            Ok(None) => QueryOutcome::NoData {
                reason: "empty body".to_string(),
            },
            Err(err) => QueryOutcome::Unavailable(err),
        };

        debug!(
            fact = %self.fact,
            source = %self.name,
            url = %url,
            outcome = %outcome.describe(),
            "queried metadata source"
        );
        outcome
    }

    fn clean(&self, found: String) -> String {
        match &self.strip_prefix {
            Some(prefix) => match found.strip_prefix(prefix.as_str()) {
                Some(rest) if !rest.is_empty() => rest.to_string(),
                _ => found,
            },
            None => found,
        }
    }
}

/// The built-in source for every fact, in resolution order.
pub fn default_sources() -> Vec<MetadataSource> {
    FactId::ALL.into_iter().map(default_source).collect()
}

fn default_source(fact: FactId) -> MetadataSource {
    match fact {
        FactId::YarnMappings => MetadataSource::new(
            fact,
            "Fabric meta (yarn)",
            "https://meta.fabricmc.net/v2/versions/yarn/{version}",
            "version",
        ),
        FactId::LoaderVersion => MetadataSource::new(
            fact,
            "Fabric meta (loader)",
            "https://meta.fabricmc.net/v2/versions/loader",
            "version",
        ),
        FactId::FabricVersion => MetadataSource::new(
            fact,
            "Modrinth (fabric-api)",
            "https://api.modrinth.com/v2/project/fabric-api/version?loaders=%5B%22fabric%22%5D&game_versions=%5B%22{version}%22%5D",
            "version_number",
        ),
        FactId::GradleVersion => MetadataSource::new(
            fact,
            "Gradle services",
            "https://services.gradle.org/versions/current",
            "version",
        ),
        FactId::LoomVersion => MetadataSource::new(
            fact,
            "GitHub releases (fabric-loom)",
            "https://api.github.com/repos/FabricMC/fabric-loom/releases/latest",
            "tag_name",
        )
        .strip_prefix("v"),
    }
}
