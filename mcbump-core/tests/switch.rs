//! The whole switch flow against a throwaway project, canned metadata and a scripted build.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use mcbump_build::{BuildTool, ProcessOutput, StageError};
use mcbump_core::adapters::{InMemoryWritePort, NoProgress};
use mcbump_core::pipeline::{run_switch, write_artifacts};
use mcbump_core::ports::ProgressPort;
use mcbump_core::settings::SwitchSettings;
use mcbump_core::{PlanInputs, ToolError, VersionPlan, WarningReport};
use mcbump_sources::InMemoryFetcher;
use mcbump_types::fact::{FactId, Provenance};
use mcbump_types::patch::{PatchReport, TargetStatus};
use mcbump_types::pipeline::{PipelineOutcome, Verdict};
use mcbump_types::plan::WarningKind;
use mcbump_types::report::ReportPhase;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;
use std::time::Duration;
use tempfile::TempDir;

const PROPERTIES: &str = "\
org.gradle.jvmargs=-Xmx1G

# Fabric Properties
minecraft_version=1.20.4
yarn_mappings=1.20.4+build.3
loader_version=0.15.11
loom_version=1.6.5

# Mod Properties
mod_version=1.20.4-1.1.0
maven_group=com.example

# Dependencies
fabric_version=0.97.0+1.20.4
";

const MOD_JSON: &str = r#"{
  "schemaVersion": 1,
  "id": "example",
  "depends": {
    "fabricloader": ">=0.15.11",
    "minecraft": "~1.20.4",
    "fabric-api": ">=0.97.0+1.20.4"
  }
}
"#;

const WRAPPER: &str =
    "distributionUrl=https\\://services.gradle.org/distributions/gradle-8.6-bin.zip\n";

const BUILD_GRADLE: &str = "plugins {\n    id 'fabric-loom' version '1.6.5'\n}\n";

fn project() -> (TempDir, Utf8PathBuf) {
    let td = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8 temp path");
    for (rel, contents) in [
        ("gradle.properties", PROPERTIES),
        ("src/main/resources/fabric.mod.json", MOD_JSON),
        ("gradle/wrapper/gradle-wrapper.properties", WRAPPER),
        ("build.gradle", BUILD_GRADLE),
    ] {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, contents).expect("write");
    }
    (td, root)
}

fn read(root: &Utf8Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).expect("read")
}

/// Every source points at a `mem://` URL so the fetcher needs no real endpoints.
fn settings(root: &Utf8Path) -> SwitchSettings {
    let mut settings = SwitchSettings::for_project(root);
    for fact in FactId::ALL {
        settings
            .resolver
            .url_overrides
            .insert(fact, format!("mem://{}/{{version}}", fact.as_str()));
    }
    settings
}

fn live_fetcher() -> InMemoryFetcher {
    InMemoryFetcher::new()
        .respond(
            "mem://yarn_mappings/1.21.1",
            json!([{ "version": "1.21.1+build.3" }]),
        )
        .respond(
            "mem://loader_version/1.21.1",
            json!([{ "version": "0.16.5" }]),
        )
        .respond(
            "mem://fabric_version/1.21.1",
            json!([{ "version_number": "0.105.0+1.21.1" }]),
        )
        .respond("mem://gradle_version/1.21.1", json!({ "version": "8.10" }))
        .respond("mem://loom_version/1.21.1", json!({ "tag_name": "v1.7.4" }))
}

struct ScriptedTool {
    fail: &'static [&'static str],
    calls: RefCell<Vec<String>>,
}

impl ScriptedTool {
    fn failing(fail: &'static [&'static str]) -> Self {
        Self {
            fail,
            calls: RefCell::new(vec![]),
        }
    }
}

impl BuildTool for ScriptedTool {
    fn describe(&self) -> String {
        "./gradlew".to_string()
    }

    fn run(&self, args: &[String], _timeout: Duration) -> Result<ProcessOutput, StageError> {
        let verb = args.join(" ");
        self.calls.borrow_mut().push(verb.clone());
        Ok(ProcessOutput {
            exit_code: Some(if self.fail.contains(&verb.as_str()) { 1 } else { 0 }),
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
        })
    }
}

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<(&'static str, usize)>>,
}

impl ProgressPort for Recorder {
    fn resolved(&self, _plan: &VersionPlan, report: &WarningReport) {
        self.events.borrow_mut().push(("resolved", report.len()));
    }

    fn patched(&self, _patch: &PatchReport, _diff: &str, report: &WarningReport) {
        self.events.borrow_mut().push(("patched", report.len()));
    }

    fn built(&self, outcome: &PipelineOutcome) {
        self.events.borrow_mut().push(("built", outcome.report.len()));
    }
}

#[test]
fn switch_without_build_rewrites_every_file() {
    let (_td, root) = project();
    let mut settings = settings(&root);
    settings.no_build = true;
    let tool = ScriptedTool::failing(&[]);
    let progress = Recorder::default();

    let outcome = run_switch(
        &settings,
        PlanInputs::new("1.21.1").with_mod_version("2.0.0"),
        &live_fetcher(),
        &tool,
        &progress,
    )
    .expect("switch");

    assert_eq!(outcome.exit_code(), 0);
    assert!(outcome.pipeline.is_none());
    assert!(tool.calls.borrow().is_empty());
    assert_eq!(outcome.plan.count(Provenance::Confirmed), 5);
    assert_eq!(outcome.patch.summary.patched, 4);

    let props = read(&root, "gradle.properties");
    assert!(props.contains("\nminecraft_version=1.21.1\n"));
    assert!(props.contains("\nyarn_mappings=1.21.1+build.3\n"));
    assert!(props.contains("\nloader_version=0.16.5\n"));
    assert!(props.contains("\nloom_version=1.7.4\n"));
    assert!(props.contains("\nmod_version=1.21.1-2.0.0\n"));
    assert!(props.contains("\nfabric_version=0.105.0+1.21.1\n"));
    assert!(props.contains("\nmaven_group=com.example\n"));

    let manifest = read(&root, "src/main/resources/fabric.mod.json");
    assert!(manifest.contains(r#""minecraft": "~1.21.1""#));
    assert!(manifest.contains(r#""fabricloader": ">=0.16.5""#));
    assert!(manifest.contains(r#""fabric-api": ">=0.105.0+1.21.1""#));

    assert!(read(&root, "gradle/wrapper/gradle-wrapper.properties").contains("gradle-8.10-bin.zip"));
    assert!(read(&root, "build.gradle").contains("id 'fabric-loom' version '1.7.4'"));

    // The Gradle and Loom cautions are there before and after patching.
    assert_eq!(
        *progress.events.borrow(),
        vec![("resolved", 2), ("patched", 2)]
    );
}

#[test]
fn dry_run_previews_without_writing() {
    let (_td, root) = project();
    let mut settings = settings(&root);
    settings.dry_run = true;
    let tool = ScriptedTool::failing(&[]);

    let outcome = run_switch(
        &settings,
        PlanInputs::new("1.21.1"),
        &live_fetcher(),
        &tool,
        &NoProgress,
    )
    .expect("switch");

    assert!(outcome.patch.dry_run);
    assert!(outcome.pipeline.is_none());
    assert!(tool.calls.borrow().is_empty());
    assert!(outcome.diff.contains("+minecraft_version=1.21.1"));
    assert!(outcome.diff.contains("-minecraft_version=1.20.4"));
    assert_eq!(read(&root, "gradle.properties"), PROPERTIES);
    assert_eq!(read(&root, "build.gradle"), BUILD_GRADLE);
}

#[test]
fn missing_anchor_stops_before_resolution() {
    let td = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8 temp path");
    let progress = Recorder::default();

    let err = run_switch(
        &settings(&root),
        PlanInputs::new("1.21.1"),
        &live_fetcher(),
        &ScriptedTool::failing(&[]),
        &progress,
    )
    .expect_err("no gradle.properties");

    assert!(matches!(err, ToolError::MissingAnchor { .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(progress.events.borrow().is_empty());
}

#[test]
fn unresolved_fabric_api_keeps_its_lines_and_is_reported() {
    let (_td, root) = project();
    let mut settings = settings(&root);
    settings.no_build = true;
    let fetcher = live_fetcher().respond("mem://fabric_version/1.21.1", json!([]));

    let outcome = run_switch(
        &settings,
        PlanInputs::new("1.21.1"),
        &fetcher,
        &ScriptedTool::failing(&[]),
        &NoProgress,
    )
    .expect("switch");

    assert_eq!(
        outcome.plan.provenance(FactId::FabricVersion),
        Some(Provenance::Unresolved)
    );
    assert!(read(&root, "gradle.properties").contains("\nfabric_version=0.97.0+1.20.4\n"));
    assert!(
        read(&root, "src/main/resources/fabric.mod.json").contains(r#""fabric-api": "*""#)
    );

    let unresolved = outcome
        .report
        .entries
        .iter()
        .find(|e| e.kind == WarningKind::Unresolved)
        .expect("unresolved entry");
    assert_eq!(unresolved.subject, "fabric_version");
    assert!(unresolved.files.contains(&"gradle.properties".to_string()));

    assert!(
        outcome
            .report
            .in_phase(ReportPhase::Patch)
            .any(|e| e.kind == WarningKind::Caution && e.message.contains("`*`"))
    );
    // Warnings alone never fail the run.
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn failed_build_fails_the_run() {
    let (_td, root) = project();
    let settings = settings(&root);
    let tool = ScriptedTool::failing(&["build"]);
    let progress = Recorder::default();

    let outcome = run_switch(
        &settings,
        PlanInputs::new("1.21.1"),
        &live_fetcher(),
        &tool,
        &progress,
    )
    .expect("switch");

    assert_eq!(
        *tool.calls.borrow(),
        vec!["clean", "genSources", "vscode", "build"]
    );
    let pipeline = outcome.pipeline.as_ref().expect("pipeline ran");
    assert_eq!(pipeline.verdict, Verdict::Failed);
    assert_eq!(outcome.report, pipeline.report);
    assert!(
        outcome
            .report
            .in_phase(ReportPhase::Build)
            .any(|e| e.subject == "build")
    );
    assert_eq!(progress.events.borrow().len(), 3);
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn malformed_manifest_aborts_before_build() {
    let (_td, root) = project();
    fs::write(root.join("src/main/resources/fabric.mod.json"), "{ not json").expect("write");
    let tool = ScriptedTool::failing(&[]);

    let outcome = run_switch(
        &settings(&root),
        PlanInputs::new("1.21.1"),
        &live_fetcher(),
        &tool,
        &NoProgress,
    )
    .expect("switch");

    assert!(outcome.patch.aborted);
    assert!(
        outcome
            .patch
            .targets
            .iter()
            .any(|t| t.status == TargetStatus::Failed)
    );
    assert!(outcome.pipeline.is_none());
    assert!(tool.calls.borrow().is_empty());
    assert_eq!(read(&root, "gradle.properties"), PROPERTIES);
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn artifacts_land_in_out_dir() {
    let (_td, root) = project();
    let mut settings = settings(&root);
    settings.dry_run = true;
    let outcome = run_switch(
        &settings,
        PlanInputs::new("1.21.1"),
        &live_fetcher(),
        &ScriptedTool::failing(&[]),
        &NoProgress,
    )
    .expect("switch");

    let writer = InMemoryWritePort::new();
    let out = Utf8PathBuf::from("out");
    write_artifacts(&outcome, &out, &writer).expect("write artifacts");

    assert_eq!(
        writer.paths(),
        vec![
            out.join("patch.diff"),
            out.join("plan.json"),
            out.join("report.md"),
        ]
    );

    let plan: serde_json::Value =
        serde_json::from_str(&writer.get(&out.join("plan.json")).expect("plan.json"))
            .expect("valid json");
    assert_eq!(plan["tool"]["name"], "mcbump");
    assert_eq!(plan["plan"]["inputs"]["minecraft_version"], "1.21.1");
    assert!(plan["generated_at"].is_string());
    assert!(plan.get("pipeline").is_none());

    let report = writer.get(&out.join("report.md")).expect("report.md");
    assert!(report.starts_with("# mcbump report\n"));
    assert_eq!(writer.get(&out.join("patch.diff")), Some(outcome.diff.clone()));
}
