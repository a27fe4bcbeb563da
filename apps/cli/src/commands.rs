//! CLI command definitions, routing, and tracing setup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use llmstxt_core::{
    GenerationReport, Generator, LanguageOutcome, OutcomeStatus, ProgressReporter, SnapshotSource,
    public_url,
};
use llmstxt_shared::{AppConfig, expand_home, init_config, load_config, load_config_from};
use llmstxt_storage::{ArtifactStore, GenerationRegistry};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// llmstxt: per-language llms.txt files for multilingual sites.
#[derive(Parser)]
#[command(
    name = "llmstxt",
    version,
    about = "Generate and serve per-language llms.txt summaries of a multilingual site.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.llmstxt/llmstxt.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Site snapshot JSON (overrides `[source] snapshot`).
    #[arg(long, env = "LLMSTXT_SNAPSHOT", global = true)]
    pub snapshot: Option<String>,

    /// Artifact directory (overrides `[output] dir`).
    #[arg(long, global = true)]
    pub out: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate llms.txt for every language, or a single one.
    Generate {
        /// Only generate this language slug.
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Serve llms.txt files over HTTP and regenerate them on a schedule.
    Serve {
        /// Socket address to listen on (overrides `[server] bind`).
        #[arg(long)]
        bind: Option<String>,

        /// Disable periodic regeneration.
        #[arg(long)]
        no_schedule: bool,
    },

    /// Show when each language was last generated and where it is served.
    Status,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "llmstxt=info",
        1 => "llmstxt=debug",
        _ => "llmstxt=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Generate { lang } => cmd_generate(&cli, lang.as_deref()).await,
        Command::Serve { bind, no_schedule } => cmd_serve(&cli, bind.as_deref(), *no_schedule).await,
        Command::Status => cmd_status(&cli).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&cli).await,
        },
    }
}

/// Config file named by `--config`, else the default location.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(snapshot) = &cli.snapshot {
        config.source.snapshot = Some(snapshot.clone());
    }
    if let Some(out) = &cli.out {
        config.output.dir = out.clone();
    }

    Ok(config)
}

/// Wire the snapshot source, artifact store and registry into a generator.
fn build_generator(config: &AppConfig) -> Result<Generator> {
    let snapshot = config.source.snapshot.as_deref().ok_or_else(|| {
        eyre!("no site snapshot configured: pass --snapshot or set [source] snapshot")
    })?;

    let source = SnapshotSource::load(&expand_home(snapshot))?;
    let store = ArtifactStore::new(config.output.dir_path());
    let registry = GenerationRegistry::load(config.output.registry_path())?;

    info!(
        snapshot,
        out = %store.dir().display(),
        registry = %registry.path().display(),
        "generator ready"
    );

    Ok(Generator::new(Arc::new(source), store, registry))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_generate(cli: &Cli, lang: Option<&str>) -> Result<()> {
    let config = resolve_config(cli)?;
    let generator = build_generator(&config)?;

    let report = match lang {
        Some(slug) => {
            let reporter = CliProgress::new();
            reporter.language_started(slug, 1, 1);
            let outcome = generator.generate_one(slug);
            reporter.language_finished(&outcome);
            let report = GenerationReport {
                outcomes: vec![outcome],
                elapsed: reporter.spinner.elapsed(),
            };
            reporter.done(&report);
            report
        }
        None => generator.generate_all(&CliProgress::new()),
    };

    println!();
    for outcome in &report.outcomes {
        match &outcome.status {
            OutcomeStatus::Generated { artifact, .. } => println!(
                "  {:<6} {}  ({} bytes)",
                outcome.language, artifact.filename, artifact.size_bytes
            ),
            OutcomeStatus::Failed { reason } => {
                println!("  {:<6} FAILED: {reason}", outcome.language)
            }
        }
    }
    println!();
    println!("  {}", report.message());
    println!("  Time: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if report.is_success() {
        Ok(())
    } else {
        Err(eyre!(report.message()))
    }
}

async fn cmd_serve(cli: &Cli, bind: Option<&str>, no_schedule: bool) -> Result<()> {
    let config = resolve_config(cli)?;
    let generator = Arc::new(build_generator(&config)?);

    let bind = bind.unwrap_or(config.server.bind.as_str());
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| eyre!("invalid bind address '{bind}': {e}"))?;

    let schedule = (config.schedule.enabled && !no_schedule).then(|| config.schedule.frequency.period());

    println!("Serving llms.txt on http://{addr}/llms.txt");
    if schedule.is_some() {
        println!("Regenerating {}", config.schedule.frequency);
    }

    llmstxt_server::serve(generator, addr, schedule).await?;
    Ok(())
}

async fn cmd_status(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let generator = build_generator(&config)?;

    let stamps = generator.last_generated();
    let default = generator.default_language();
    let home = generator.home_url();

    println!();
    for lang in generator.languages() {
        let generated = stamps
            .get(&lang)
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "Not generated yet".to_string());
        let url = public_url(&home, &lang, default.as_deref());
        println!("  {lang:<6} {generated:<24} {url}");
    }
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn language_started(&self, lang: &str, index: usize, total: usize) {
        self.spinner
            .set_message(format!("Generating [{index}/{total}] {lang}"));
    }

    fn language_finished(&self, outcome: &LanguageOutcome) {
        if !outcome.is_success() {
            self.spinner
                .println(format!("  {} failed", outcome.language));
        }
    }

    fn done(&self, _report: &GenerationReport) {
        self.spinner.finish_and_clear();
    }
}
