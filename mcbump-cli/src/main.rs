mod config;
mod explain;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use config::{CliOverrides, ConfigMerger};
use mcbump_core::adapters::{FsWritePort, gradle_wrapper, http_fetcher};
use mcbump_core::pipeline::{resolve_plan, run_switch, write_artifacts};
use mcbump_core::ports::ProgressPort;
use mcbump_core::settings::SwitchSettings;
use mcbump_core::{PlanInputs, ToolError, VersionPlan, WarningReport};
use mcbump_domain::{ResolverConfig, VersionResolver};
use mcbump_edit::{PatchSetConfig, default_patch_set};
use mcbump_render::{render_patch_text, render_pipeline_text, render_plan_text, render_text};
use mcbump_types::patch::PatchReport;
use mcbump_types::pipeline::PipelineOutcome;
use regex::Regex;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const VERSION_PATTERN: &str = r"^\d+\.\d+(\.\d+)?$";

#[derive(Debug, Parser)]
#[command(
    name = "mcbump",
    version,
    about = "Switch a Fabric mod project to another Minecraft version."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve versions, patch the project's files and run the build.
    Switch(SwitchArgs),
    /// Resolve versions and print the plan without touching any file.
    Resolve(ResolveArgs),
    /// List the version facts with their sources and fallback policies.
    ListFacts(ListFactsArgs),
    /// Explain where a fact comes from and what happens when it can't be found.
    Explain(ExplainArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Per-query timeout for version metadata lookups, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Fabric Loader version to use when the meta service has no answer.
    #[arg(long)]
    loader_fallback: Option<String>,
}

#[derive(Debug, Parser)]
struct SwitchArgs {
    /// Target Minecraft version, e.g. 1.21.1.
    minecraft_version: String,

    /// Mod version; written as `<minecraft_version>-<mod_version>`.
    mod_version: Option<String>,

    #[command(flatten)]
    source: SourceArgs,

    /// Resolve and show the diff; write nothing and skip the build.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Patch the files but skip the build.
    #[arg(long, default_value_t = false)]
    no_build: bool,

    /// Write plan.json, report.md and patch.diff here.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Leave the Fabric API dependency alone instead of writing `*` when it is unresolved.
    #[arg(long, default_value_t = false)]
    no_wildcard: bool,
}

#[derive(Debug, Parser)]
struct ResolveArgs {
    /// Target Minecraft version, e.g. 1.21.1.
    minecraft_version: String,

    #[command(flatten)]
    source: SourceArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ListFactsArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Fact name or alias (e.g. "loom_version", "loom", "fabric-api").
    fact: String,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("error: {e:#}");
            let code = e
                .downcast_ref::<ToolError>()
                .map(ToolError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn real_main() -> anyhow::Result<u8> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Switch(args) => cmd_switch(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::ListFacts(args) => cmd_list_facts(args),
        Command::Explain(args) => cmd_explain(args),
    }
}

fn validate_version(label: &str, version: &str) -> anyhow::Result<()> {
    let re = Regex::new(VERSION_PATTERN).context("compile version pattern")?;
    if re.is_match(version) {
        Ok(())
    } else {
        Err(ToolError::Invalid(format!(
            "{label} `{version}` is not a version like 1.21 or 1.21.1"
        ))
        .into())
    }
}

fn plan_inputs(minecraft_version: &str, mod_version: Option<&str>) -> anyhow::Result<PlanInputs> {
    validate_version("Minecraft version", minecraft_version)?;
    let mut inputs = PlanInputs::new(minecraft_version);
    if let Some(m) = mod_version {
        validate_version("mod version", m)?;
        inputs = inputs.with_mod_version(m);
    }
    Ok(inputs)
}

fn load_settings(source: &SourceArgs, overrides: CliOverrides) -> anyhow::Result<SwitchSettings> {
    let file_config =
        config::load_or_default(&source.project_root).context("load mcbump.toml config")?;
    let settings = ConfigMerger::new(file_config).merge(&CliOverrides {
        project_root: source.project_root.clone(),
        timeout_secs: source.timeout_secs,
        loader_fallback: source.loader_fallback.clone(),
        ..overrides
    })?;
    debug!(?settings, "merged config");
    Ok(settings)
}

/// Prints each decision point with the warnings as they stand at that moment.
struct ConsoleProgress {
    dry_run: bool,
}

impl ProgressPort for ConsoleProgress {
    fn resolved(&self, plan: &VersionPlan, report: &WarningReport) {
        println!("== Versions ==");
        print!("{}", render_plan_text(plan));
        print!("{}", render_text(report));
        println!();
    }

    fn patched(&self, patch: &PatchReport, diff: &str, report: &WarningReport) {
        if self.dry_run && !diff.is_empty() {
            println!("== Diff ==");
            print!("{diff}");
            println!();
        }
        println!("== Files ==");
        print!("{}", render_patch_text(patch));
        print!("{}", render_text(report));
        println!();
    }

    fn built(&self, outcome: &PipelineOutcome) {
        println!("== Build ==");
        print!("{}", render_pipeline_text(outcome));
        println!();
    }
}

fn cmd_switch(args: SwitchArgs) -> anyhow::Result<u8> {
    let inputs = plan_inputs(&args.minecraft_version, args.mod_version.as_deref())?;
    let settings = load_settings(
        &args.source,
        CliOverrides {
            out_dir: args.out_dir,
            dry_run: args.dry_run,
            no_build: args.no_build,
            no_wildcard: args.no_wildcard,
            ..Default::default()
        },
    )?;

    let fetcher = http_fetcher()?;
    let tool = gradle_wrapper(&settings);
    let progress = ConsoleProgress {
        dry_run: settings.dry_run,
    };
    let outcome = run_switch(&settings, inputs, &fetcher, &tool, &progress)?;

    if let Some(out_dir) = &settings.out_dir {
        write_artifacts(&outcome, out_dir, &FsWritePort)
            .with_context(|| format!("write artifacts to {out_dir}"))?;
        println!("Artifacts written to {out_dir}");
    }

    println!("== Summary ==");
    print!("{}", render_text(&outcome.report));
    let code = outcome.exit_code();
    if outcome.patch.aborted && outcome.patch.written.is_empty() {
        println!("Switch aborted: a file could not be patched safely; nothing was written.");
    } else if outcome.patch.aborted {
        println!(
            "Switch aborted: a file could not be written; already rewritten: {}.",
            outcome.patch.written.join(", ")
        );
    } else if code != 0 {
        println!("Switch failed: the build did not succeed.");
        println!(
            "The build failed after the version switch; the code may need API-compatibility \
             fixes. Fabric API and Minecraft changes often break mod sources, so check the \
             build output above and update the code by hand."
        );
    } else if settings.dry_run {
        println!("Dry run complete; nothing was written.");
    } else {
        println!("Switched to Minecraft {}.", outcome.plan.target_version());
    }
    Ok(code)
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<u8> {
    let inputs = plan_inputs(&args.minecraft_version, None)?;
    let settings = load_settings(&args.source, CliOverrides::default())?;
    let fetcher = http_fetcher()?;

    let (plan, report) = resolve_plan(&settings, inputs, &fetcher);
    match args.format {
        OutputFormat::Text => {
            print!("{}", render_plan_text(&plan));
            print!("{}", render_text(&report));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }
    Ok(0)
}

fn cmd_list_facts(args: ListFactsArgs) -> anyhow::Result<u8> {
    let resolver = VersionResolver::new(&ResolverConfig::default());

    match args.format {
        OutputFormat::Text => {
            println!("Version facts, in resolution order:\n");
            println!("  {:<16} {:<8} FALLBACK", "FACT", "SOURCE");
            println!("  {:<16} {:<8} --------", "----", "------");
            for rule in resolver.rules() {
                println!(
                    "  {:<16} {:<8} {}",
                    rule.fact.as_str(),
                    rule.source.name,
                    rule.fallback.describe()
                );
            }
            println!();
            println!("Use 'mcbump explain <fact>' for details.");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(resolver.rules())?);
        }
    }
    Ok(0)
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<u8> {
    use explain::{list_fact_keys, lookup_fact};

    let Some(entry) = lookup_fact(&args.fact) else {
        anyhow::bail!(
            "Unknown fact: '{}'\n\nAvailable facts: {}",
            args.fact,
            list_fact_keys().join(", ")
        );
    };
    let fact = entry.fact;
    let resolver = VersionResolver::new(&ResolverConfig::default());
    let rule = resolver
        .rules()
        .iter()
        .find(|r| r.fact == fact)
        .with_context(|| format!("no resolution rule for {fact}"))?;
    let files: Vec<String> = default_patch_set(&PatchSetConfig::default())
        .iter()
        .filter(|t| t.facts().contains(&fact))
        .map(|t| t.path.to_string())
        .collect();

    println!("================================================================================");
    println!("FACT: {}", fact.title());
    println!("================================================================================");
    println!();
    println!("Name:     {}", fact.as_str());
    println!("Aliases:  {}", entry.aliases.join(", "));
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", entry.description);
    println!();

    println!("SOURCE");
    println!("--------------------------------------------------------------------------------");
    println!("{} ({} field)", rule.source.name, rule.source.field);
    println!("{}", rule.source.url_template);
    println!();

    println!("FALLBACK: {}", rule.fallback.describe());
    println!("--------------------------------------------------------------------------------");
    println!("{}", entry.fallback_rationale);
    if let Some(caution) = &rule.caution {
        println!();
        println!("Caution even when found: {caution}");
    }
    println!();

    println!("FILES");
    println!("--------------------------------------------------------------------------------");
    for file in &files {
        println!("  - {file}");
    }
    println!();

    println!("REMEDIATION GUIDANCE");
    println!("--------------------------------------------------------------------------------");
    println!("{}", entry.remediation);
    println!();

    Ok(0)
}
