//! Graph-Trawl main entry point
//!
//! This is the command-line interface for the Graph-Trawl listing crawler.

use clap::Parser;
use graph_trawl::config::{load_config_with_hash, load_credentials, Config};
use graph_trawl::crawler::run_crawl;
use graph_trawl::extract::sheet_name;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Graph-Trawl: a resumable crawler for social-graph listings
///
/// Graph-Trawl walks the connection list of every configured seed, looks up
/// profile details for each new entry, and writes one sheet per seed. Progress
/// is recorded as it happens so an interrupted run resumes where it stopped.
#[derive(Parser, Debug)]
#[command(name = "graph-trawl")]
#[command(version)]
#[command(about = "A resumable crawler for social-graph listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without making requests
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the ledger and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate a markdown summary of the workbook and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("graph_trawl=info,warn"),
            1 => EnvFilter::new("graph_trawl=debug,info"),
            2 => EnvFilter::new("graph_trawl=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Graph-Trawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max attempts per request: {}", config.crawler.max_attempts);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Page size: {}", config.crawler.page_size);

    println!("\nBackoff:");
    println!("  Base delay: {}s", config.backoff.base_delay);
    println!("  Network ceiling: {}s", config.backoff.network_ceiling);
    println!("  Rate-limit ceiling: {}s", config.backoff.rate_limit_ceiling);
    println!("  Jitter: up to {}s", config.backoff.jitter);

    let pacing = &config.pacing;
    println!("\nPacing:");
    println!("  After each entry: {:?}s", pacing.entry_delay);
    println!("  Between pages: {:?}s", pacing.page_delay);
    println!("  Between seeds: {:?}s", pacing.seed_delay);
    println!(
        "  Long pause: {:?}s every {:?} entries",
        pacing.long_pause, pacing.long_pause_every
    );
    println!(
        "  Cooldown: {:?}s after every {}s of crawling",
        pacing.cooldown, pacing.cooldown_after
    );

    println!("\nAPI:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Static headers: {}", config.api.headers.len());

    let credentials = load_credentials(Path::new(&config.credentials.path))?;
    println!("\nCredentials:");
    println!("  File: {}", config.credentials.path);
    println!("  Loaded: {}", credentials.len());

    println!("\nOutput:");
    println!("  Ledger: {}", config.output.ledger_path);
    println!("  Workbook: {}", config.output.workbook_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!(
            "  - {} -> {} (sheet '{}')",
            seed.name,
            seed.target,
            sheet_name(&seed.name)
        );
    }

    println!("\n✓ Configuration is valid");
    if credentials.is_empty() {
        println!("✗ Credential pool is empty, a crawl would refuse to start");
    } else {
        println!("✓ Would start crawling {} seeds", config.seeds.len());
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the ledger
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use graph_trawl::ledger::open_ledger;
    use graph_trawl::output::{load_statistics, print_statistics};

    println!("Ledger: {}\n", config.output.ledger_path);

    let ledger = open_ledger(Path::new(&config.output.ledger_path))?;
    let stats = load_statistics(&ledger)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use graph_trawl::output::{generate_markdown_summary, open_workbook, OutputSink};

    println!("=== Exporting Workbook Summary ===\n");
    println!("Workbook: {}", config.output.workbook_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let workbook = open_workbook(Path::new(&config.output.workbook_path))?;

    tracing::info!("Loading sheets from workbook...");
    let summaries = workbook.sheet_summaries()?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summaries, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main crawl operation
///
/// Ctrl-C drops the crawl at its next await point. Entries already appended
/// to the ledger stay durable, so the next run resumes from them.
async fn handle_crawl(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Seeds: {}, credentials file: {}",
        config.seeds.len(),
        config.credentials.path
    );

    tokio::select! {
        result = run_crawl(config) => match result {
            Ok(summary) => {
                tracing::info!(
                    "Crawl completed successfully: {} profiles over {} pages",
                    summary.entries_recorded,
                    summary.pages_fetched
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                Err(e.into())
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, progress so far is saved in the ledger");
            Ok(())
        }
    }
}
