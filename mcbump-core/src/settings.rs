//! Clap-free settings for a switch run.

use camino::Utf8PathBuf;
use mcbump_build::StageConfig;
use mcbump_domain::ResolverConfig;
use mcbump_edit::PatchSetConfig;

/// The file whose presence marks a project root. Checked before anything is resolved.
pub const ANCHOR_FILE: &str = "gradle.properties";

/// Settings for [`run_switch`](crate::pipeline::run_switch) and its steps.
#[derive(Debug, Clone)]
pub struct SwitchSettings {
    pub project_root: Utf8PathBuf,

    /// Where to write `plan.json`, `report.md` and `patch.diff`, if anywhere.
    pub out_dir: Option<Utf8PathBuf>,

    // Mode
    pub dry_run: bool,
    pub no_build: bool,

    // Steps
    pub resolver: ResolverConfig,
    pub patch_set: PatchSetConfig,
    pub stages: StageConfig,

    /// Build tool script, relative to the project root unless absolute.
    pub gradle_wrapper: Option<Utf8PathBuf>,
}

impl Default for SwitchSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            out_dir: None,
            dry_run: false,
            no_build: false,
            resolver: ResolverConfig::default(),
            patch_set: PatchSetConfig::default(),
            stages: StageConfig::default(),
            gradle_wrapper: None,
        }
    }
}

impl SwitchSettings {
    pub fn for_project(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            ..Self::default()
        }
    }

    /// Whether the build pipeline runs after patching.
    pub fn builds(&self) -> bool {
        !self.dry_run && !self.no_build
    }
}
