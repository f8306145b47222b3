//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use webcorpus_corpus::{MediaStore, write_corpus};
use webcorpus_crawler::{CrawlEngine, CrawlStats, ProgressReporter};
use webcorpus_extract::{Extractor, Transcriber};
use webcorpus_shared::{CrawlOptions, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// webcorpus — crawl one domain into a corpus document.
#[derive(Parser)]
#[command(
    name = "webcorpus",
    version,
    about = "Crawl a site within one domain and accumulate pages into a corpus document.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

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
    /// Crawl a site from a seed URL and write the corpus artifact.
    Crawl {
        /// Seed URL to start from. The crawl never leaves its host.
        url: String,

        /// Maximum number of URLs ever admitted (overrides config).
        #[arg(short, long)]
        budget: Option<usize>,

        /// Worker pool size (overrides config).
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output path for the corpus artifact (overrides config).
        #[arg(short, long)]
        out: Option<String>,

        /// Directory for fetched media side files (overrides config).
        #[arg(long)]
        media_dir: Option<String>,
    },

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
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
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
    match cli.command {
        Command::Crawl {
            url,
            budget,
            workers,
            out,
            media_dir,
        } => {
            cmd_crawl(
                &url,
                budget,
                workers,
                out.as_deref(),
                media_dir.as_deref(),
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Crawl command
// ---------------------------------------------------------------------------

async fn cmd_crawl(
    url: &str,
    budget: Option<usize>,
    workers: Option<usize>,
    out: Option<&str>,
    media_dir: Option<&str>,
) -> Result<()> {
    let config = load_config()?;

    let seed = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    // CLI flags override config file values.
    let mut options = CrawlOptions::from(&config);
    if let Some(budget) = budget {
        options.page_budget = budget;
    }
    if let Some(workers) = workers {
        options.workers = workers;
    }

    let corpus_path = PathBuf::from(out.unwrap_or(&config.output.corpus_path));
    let media_dir = media_dir.unwrap_or(&config.output.media_dir);

    info!(
        url,
        budget = options.page_budget,
        workers = options.workers,
        "starting crawl"
    );

    let extractor = match Transcriber::from_config(&config.transcriber) {
        Some(transcriber) => Extractor::with_transcriber(transcriber),
        None => Extractor::new(),
    };

    let engine = CrawlEngine::new(options)?
        .with_extractor(extractor)
        .with_media_store(MediaStore::new(media_dir)?);

    let progress = Arc::new(CliProgress::new());
    let (corpus, stats) = engine.crawl(&seed, progress.clone()).await?;
    progress.finish();

    write_corpus(&corpus_path, &corpus)?;

    print_summary(&corpus_path, &stats);
    Ok(())
}

fn print_summary(corpus_path: &std::path::Path, stats: &CrawlStats) {
    println!();
    println!("  Crawl complete!");
    println!("  Pages:    {}", stats.pages_fetched);
    println!("  Failed:   {}", stats.pages_failed);
    println!("  Admitted: {}", stats.urls_admitted);
    println!("  Artifact: {}", corpus_path.display());
    println!("  Time:     {:.1}s", stats.duration.as_secs_f64());
    println!();
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
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn page_fetched(&self, url: &str, recorded: usize, admitted: usize) {
        self.spinner
            .set_message(format!("Fetched [{recorded}/{admitted}] {url}"));
    }

    fn page_failed(&self, url: &str) {
        self.spinner.set_message(format!("Failed {url}"));
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("wrote default config to {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}
