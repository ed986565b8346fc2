//! Site-Inspector main entry point
//!
//! This is the command-line interface for the Site-Inspector crawler.

use anyhow::{bail, Context};
use clap::Parser;
use site_inspector::config::{load_config_with_hash, Config, UserAgentConfig};
use site_inspector::output::{write_report, JsonRenderer, TextRenderer};
use site_inspector::{Dispatcher, Inspector};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Inspector: a website health crawler
///
/// Site-Inspector crawls one website from a seed URL, respecting robots.txt,
/// and reports broken links, broken images and misspelled words.
#[derive(Parser, Debug)]
#[command(name = "site-inspector")]
#[command(version)]
#[command(about = "A website health crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from (overrides `seed-url` in the config)
    #[arg(value_name = "SEED_URL")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to visit
    #[arg(long)]
    max_pages: Option<usize>,

    /// Maximum link depth from the seed
    #[arg(long)]
    max_depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// User-Agent header, e.g. "MyBot/1.0 (+https://example.com/bot)"
    #[arg(long)]
    user_agent: Option<String>,

    /// Page fetch timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Word list used for spell checking (one word per line)
    #[arg(long, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// Disable spell checking
    #[arg(long)]
    no_spelling: bool,

    /// Where to write the JSON report
    #[arg(long, value_name = "FILE")]
    json_out: Option<PathBuf>,

    /// Where to write the text summary
    #[arg(long, value_name = "FILE")]
    text_out: Option<PathBuf>,

    /// Validate settings and robots.txt without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    let Some(seed) = config.crawler.seed_url.clone() else {
        bail!("no seed URL given; pass one on the command line or set crawler.seed-url");
    };

    let inspector = Inspector::new(config)?;
    let dispatcher = inspector.prepare(&seed).await?;

    if cli.dry_run {
        print_dry_run(inspector.config(), &dispatcher);
        return Ok(());
    }

    handle_crawl(inspector.config(), dispatcher).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("site_inspector=info,warn")),
            1 => EnvFilter::new("site_inspector=debug,info"),
            2 => EnvFilter::new("site_inspector=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = Some(seed.clone());
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(workers) = cli.workers {
        config.crawler.worker_count = workers;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.crawler.request_timeout_ms = timeout_ms;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = UserAgentConfig::from_header(user_agent);
    }
    if let Some(dictionary) = &cli.dictionary {
        config.spelling.dictionary_path = Some(dictionary.clone());
    }
    if cli.no_spelling {
        config.spelling.enabled = false;
    }
    if let Some(path) = &cli.json_out {
        config.output.json_path = path.clone();
    }
    if let Some(path) = &cli.text_out {
        config.output.text_path = path.clone();
    }
}

/// Handles the --dry-run mode: shows what would be crawled
fn print_dry_run(config: &Config, dispatcher: &Dispatcher) {
    let session = dispatcher.session();
    let scope = session.scope();

    println!("=== Site-Inspector Dry Run ===\n");

    println!("Seed: {}", scope.origin());
    println!(
        "  Allowed by robots.txt: {}",
        if scope.is_allowed(scope.origin()) { "yes" } else { "no" }
    );
    match scope.robots().crawl_delay(scope.agent_token()) {
        Some(delay) => println!("  Crawl-delay: {:?}", delay),
        None => println!("  Crawl-delay: none"),
    }

    println!("\nCrawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Page timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Probe timeout: {}ms", config.crawler.probe_timeout_ms);
    println!("  Fetch interval: {:?}", session.throttle().interval());

    println!("\nUser Agent: {}", session.user_agent());

    println!("\nSpelling:");
    if config.spelling.enabled {
        match &config.spelling.dictionary_path {
            Some(path) => println!("  Dictionary: {}", path.display()),
            None => println!("  Dictionary: system default"),
        }
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path.display());
    println!("  Text: {}", config.output.text_path.display());

    println!("\n✓ Configuration is valid");
}

/// Runs the crawl, stopping early on Ctrl-C, and writes both reports
async fn handle_crawl(config: &Config, dispatcher: Dispatcher) -> anyhow::Result<()> {
    let stop = dispatcher.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after in-flight pages");
            stop.stop();
        }
    });

    let report = dispatcher.run().await;

    write_report(&JsonRenderer::new(), &report, &config.output.json_path)
        .with_context(|| format!("failed to write {}", config.output.json_path.display()))?;
    write_report(&TextRenderer, &report, &config.output.text_path)
        .with_context(|| format!("failed to write {}", config.output.text_path.display()))?;

    tracing::info!(
        "Crawl finished: {} pages, {} spelling issues, {} broken links/images",
        report.pages_visited,
        report.misspelling_count(),
        report.broken_count()
    );
    tracing::info!("JSON report written to {}", config.output.json_path.display());
    tracing::info!("Text summary written to {}", config.output.text_path.display());

    Ok(())
}
