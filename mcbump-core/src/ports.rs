//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use mcbump_types::patch::PatchReport;
use mcbump_types::pipeline::PipelineOutcome;
use mcbump_types::plan::VersionPlan;
use mcbump_types::report::WarningReport;

pub use mcbump_build::BuildTool;
pub use mcbump_sources::MetadataFetcher;

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}

/// Decision points of a switch run.
///
/// Each call carries the warning report as it stands at that point, so a host can show
/// the same list again before files are touched, after they are, and after the build.
pub trait ProgressPort {
    fn resolved(&self, _plan: &VersionPlan, _report: &WarningReport) {}

    fn patched(&self, _patch: &PatchReport, _diff: &str, _report: &WarningReport) {}

    fn built(&self, _outcome: &PipelineOutcome) {}
}
