use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tfagent_backend::{backend_for, Provider};
use tfagent_cli::{AgentConfig, Enhancer, RepoSource, SelectionPlan};
use tfagent_graph::ModuleMatch;
use tfagent_protocol::{EnhancementOutcome, RunContext};

#[derive(Parser)]
#[command(name = "tfagent")]
#[command(about = "Dependency-aware Terraform change assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// GitHub repository URL (can include /tree/<branch>/<folder>) or a local directory
    #[arg(long)]
    repo: String,

    /// Change request in natural language
    #[arg(long)]
    prompt: String,

    /// Output directory for modified files (default: ./output)
    #[arg(long)]
    output: Option<PathBuf>,

    /// API key for the generation provider
    #[arg(long)]
    api_key: Option<String>,

    /// Generation provider: openai|anthropic
    #[arg(long)]
    provider: Option<Provider>,

    /// GitHub token for private repositories
    #[arg(long)]
    github_token: Option<String>,

    /// Path to a JSON or TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the provider's default model
    #[arg(long)]
    model: Option<String>,

    /// Module directory matching: prefix|segment
    #[arg(long)]
    module_match: Option<ModuleMatch>,

    /// Only load Terraform files under this repository-relative path (repeatable)
    #[arg(long = "include", value_name = "PATH")]
    include_paths: Vec<String>,

    /// Skip Terraform files under this repository-relative path (repeatable)
    #[arg(long = "exclude", value_name = "PATH")]
    exclude_paths: Vec<String>,

    /// Print the selected files and stop before calling the provider
    #[arg(long)]
    dry_run: bool,

    /// Print the result as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

#[derive(Serialize)]
struct RunReport<'a> {
    run_id: &'a str,
    #[serde(flatten)]
    outcome: &'a EnhancementOutcome,
    output_dir: Option<&'a Path>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = RunContext::new();
    let mut config = AgentConfig::load_optional(cli.config.as_deref(), &ctx)?;
    apply_overrides(&mut config, &cli);
    config.validate(cli.dry_run)?;

    log::info!("[{ctx}] Starting run against {}", cli.repo);
    let source = RepoSource::from_arg(&cli.repo, config.github_token.as_deref(), &ctx);
    let enhancer = Enhancer::new(&config, ctx.clone());

    if cli.dry_run {
        let plan = enhancer.dry_run(&source, &cli.prompt).await?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let backend = backend_for(config.provider, config.backend_settings(), ctx.clone())
        .context("Failed to configure generation backend")?;
    let outcome = enhancer
        .enhance(&source, &cli.prompt, backend.as_ref())
        .await?;

    if cli.json {
        let report = RunReport {
            run_id: ctx.id(),
            outcome: &outcome,
            output_dir: enhancer.output_dir(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let files = outcome.files();
    println!("\nEnhanced {} files:", files.len());
    for path in files.keys() {
        println!(" - {path}");
    }
    if let Some(dir) = enhancer.output_dir() {
        println!("\nResults saved to: {}", dir.display());
    }
    Ok(())
}

fn apply_overrides(config: &mut AgentConfig, cli: &Cli) {
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(token) = &cli.github_token {
        config.github_token = Some(token.clone());
    }
    if let Some(output) = &cli.output {
        config.output_dir = Some(output.clone());
    }
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }
    if let Some(module_match) = cli.module_match {
        config.module_match = module_match;
    }
    if !cli.include_paths.is_empty() {
        config.include_paths = cli.include_paths.clone();
    }
    if !cli.exclude_paths.is_empty() {
        config.exclude_paths = cli.exclude_paths.clone();
    }
}

fn print_plan(plan: &SelectionPlan) {
    println!("Keywords: {}", plan.keywords.join(", "));
    if plan.whole_corpus_fallback {
        println!("No relevant files found; all {} files would be sent.", plan.corpus_files);
    }
    println!(
        "\nSelected {} of {} files:",
        plan.selected.len(),
        plan.corpus_files
    );
    for file in &plan.selected {
        match file.stage {
            Some(stage) => println!(" - {} ({})", file.path, stage),
            None => println!(" - {}", file.path),
        }
    }

    if !plan.links.is_empty() {
        println!("\nDependencies:");
        for link in &plan.links {
            println!(" {} -> {} ({})", link.from, link.to, link.relationship);
        }
    }
}
