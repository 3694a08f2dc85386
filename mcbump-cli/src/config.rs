//! Configuration file loading for mcbump.
//!
//! Discovers and loads `mcbump.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use mcbump_build::StageConfig;
use mcbump_core::settings::SwitchSettings;
use mcbump_domain::ResolverConfig;
use mcbump_edit::{DEFAULT_LOOM_PLUGIN_ID, DEFAULT_MOD_JSON, PatchSetConfig};
use mcbump_types::fact::FactId;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "mcbump.toml";

/// Top-level configuration from mcbump.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct McbumpConfig {
    pub sources: SourcesConfig,
    pub fallbacks: FallbacksConfig,
    pub patch: PatchConfig,
    pub pipeline: PipelineConfig,
}

/// Sources section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Per-query timeout.
    pub timeout_secs: u64,

    /// URL templates keyed by fact name (`yarn_mappings`, ...). `{version}` is the target.
    pub urls: BTreeMap<String, String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            urls: BTreeMap::new(),
        }
    }
}

/// Fallbacks section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbacksConfig {
    /// Last-known-good Fabric Loader version.
    pub loader_version: String,
}

impl Default for FallbacksConfig {
    fn default() -> Self {
        Self {
            loader_version: mcbump_domain::DEFAULT_LOADER_FALLBACK.to_string(),
        }
    }
}

/// Patch section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Write `*` for the Fabric API dependency when its version is unresolved.
    pub wildcard_unresolved_dependencies: bool,

    pub loom_plugin_id: String,

    /// Mod manifest path, relative to the project root.
    pub mod_json: Utf8PathBuf,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            wildcard_unresolved_dependencies: true,
            loom_plugin_id: DEFAULT_LOOM_PLUGIN_ID.to_string(),
            mod_json: Utf8PathBuf::from(DEFAULT_MOD_JSON),
        }
    }
}

/// Pipeline section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Build tool script, relative to the project root unless absolute.
    pub gradle_wrapper: Option<Utf8PathBuf>,

    /// IDE integration task. Empty disables the stage.
    pub ide: String,

    pub clean_timeout_secs: u64,
    pub gen_sources_timeout_secs: u64,
    pub ide_timeout_secs: u64,
    pub build_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gradle_wrapper: None,
            ide: "vscode".to_string(),
            clean_timeout_secs: 300,
            gen_sources_timeout_secs: 600,
            ide_timeout_secs: 300,
            build_timeout_secs: 600,
        }
    }
}

/// Discover the mcbump.toml config file.
///
/// Returns `None` if the project root has none.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a mcbump.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<McbumpConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<McbumpConfig> {
    let config: McbumpConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return the default if there is none.
pub fn load_or_default(project_root: &Utf8Path) -> anyhow::Result<McbumpConfig> {
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(McbumpConfig::default()),
    }
}

/// Values given on the command line. `None`/`false` leaves the config file value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub project_root: Utf8PathBuf,
    pub out_dir: Option<Utf8PathBuf>,
    pub dry_run: bool,
    pub no_build: bool,
    pub timeout_secs: Option<u64>,
    pub loader_fallback: Option<String>,
    pub no_wildcard: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: McbumpConfig,
}

impl ConfigMerger {
    pub fn new(config: McbumpConfig) -> Self {
        Self { config }
    }

    /// Produce run settings. Fails on a URL override for a fact that doesn't exist.
    pub fn merge(self, cli: &CliOverrides) -> anyhow::Result<SwitchSettings> {
        let McbumpConfig {
            sources,
            fallbacks,
            patch,
            pipeline,
        } = self.config;

        let mut url_overrides = BTreeMap::new();
        for (name, url) in sources.urls {
            let fact = FactId::parse(&name).with_context(|| {
                format!(
                    "unknown fact `{name}` in [sources.urls]; expected one of: {}",
                    FactId::ALL.map(FactId::as_str).join(", ")
                )
            })?;
            url_overrides.insert(fact, url);
        }

        let resolver = ResolverConfig {
            timeout: Duration::from_secs(cli.timeout_secs.unwrap_or(sources.timeout_secs)),
            loader_fallback: cli
                .loader_fallback
                .clone()
                .unwrap_or(fallbacks.loader_version),
            url_overrides,
        };

        let patch_set = PatchSetConfig {
            mod_json: patch.mod_json,
            loom_plugin_id: patch.loom_plugin_id,
            wildcard_unresolved_dependencies: patch.wildcard_unresolved_dependencies
                && !cli.no_wildcard,
        };

        let ide = pipeline.ide.trim();
        let stages = StageConfig {
            ide: (!ide.is_empty()).then(|| ide.to_string()),
            clean_timeout: Duration::from_secs(pipeline.clean_timeout_secs),
            gen_sources_timeout: Duration::from_secs(pipeline.gen_sources_timeout_secs),
            ide_timeout: Duration::from_secs(pipeline.ide_timeout_secs),
            build_timeout: Duration::from_secs(pipeline.build_timeout_secs),
        };

        Ok(SwitchSettings {
            project_root: cli.project_root.clone(),
            out_dir: cli.out_dir.clone(),
            dry_run: cli.dry_run,
            no_build: cli.no_build,
            resolver,
            patch_set,
            stages,
            gradle_wrapper: pipeline.gradle_wrapper,
        })
    }
}
