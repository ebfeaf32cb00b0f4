//! Crawler coordinator - seed-level orchestration
//!
//! This module sequences the configured seeds:
//! - Skipping seeds whose output sheet already exists
//! - Resolving each seed's handle to an internal id
//! - Walking the seed's listing and handing the results to the output sink
//! - Pacing between seeds

use crate::config::{load_credentials, Config, Credential, SeedEntry};
use crate::crawler::api::{parse_resolved_id, GraphApi};
use crate::crawler::backoff::RetryPolicy;
use crate::crawler::executor::{build_http_client, RequestExecutor};
use crate::crawler::pacing::Pacer;
use crate::crawler::rotator::CredentialRotator;
use crate::crawler::walker::{walk, WalkReport};
use crate::crawler::CrawlContext;
use crate::extract::{extract_handle, sheet_name};
use crate::ledger::{open_ledger, Ledger};
use crate::output::{open_workbook, OutputSink};
use crate::TrawlError;
use std::collections::HashSet;
use std::path::Path;
use tracing::{error, info, warn};

/// What happened to one seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The sheet already exists; no requests were made
    AlreadyDone { sheet: String },
    /// The handle could not be resolved to an id
    Unresolved { target: String },
    /// The listing was walked
    Completed { sheet: String, report: WalkReport },
}

/// Totals for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub seeds_completed: u32,
    pub seeds_skipped: u32,
    pub seeds_unresolved: u32,
    pub entries_recorded: u64,
    pub pages_fetched: u64,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seeds: Vec<SeedEntry>,
    ctx: CrawlContext,
    sink: Box<dyn OutputSink>,
}

impl Coordinator {
    /// Creates a coordinator from configuration
    ///
    /// Loads the credential pool, opens the ledger (exclusively) and the
    /// workbook, and replays the ledger into the dedup set.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(TrawlError)` - A fatal startup condition: unreadable config
    ///   files, an empty credential pool, or an unavailable ledger
    pub fn new(config: Config) -> Result<Self, TrawlError> {
        let credentials = load_credentials(Path::new(&config.credentials.path))?;
        let ledger = open_ledger(Path::new(&config.output.ledger_path))?;
        let sink = open_workbook(Path::new(&config.output.workbook_path))?;
        let pacer = Pacer::from_config(config.pacing.clone());

        Self::from_parts(&config, credentials, Box::new(ledger), Box::new(sink), pacer)
    }

    /// Creates a coordinator from already constructed collaborators
    pub fn from_parts(
        config: &Config,
        credentials: Vec<Credential>,
        ledger: Box<dyn Ledger>,
        sink: Box<dyn OutputSink>,
        pacer: Pacer,
    ) -> Result<Self, TrawlError> {
        let pool_size = credentials.len();
        let rotator = CredentialRotator::new(credentials)?;
        info!("Loaded {} credentials", pool_size);

        let executor = RequestExecutor::new(
            build_http_client(config)?,
            rotator,
            RetryPolicy::from_config(&config.crawler, &config.backoff),
            config.credentials.clone(),
            &config.api,
        );
        let api = GraphApi::new(&config.api, config.crawler.page_size)?;
        let ctx = CrawlContext::new(api, executor, pacer, ledger)?;

        Ok(Self {
            seeds: config.seeds.clone(),
            ctx,
            sink,
        })
    }

    /// HTTP attempts made so far
    pub fn attempts_made(&self) -> u64 {
        self.ctx.executor.attempts_made()
    }

    /// Usernames recorded so far, including those from earlier runs
    pub fn seen(&self) -> &HashSet<String> {
        &self.ctx.seen
    }

    /// Runs every seed in order
    pub async fn run(&mut self) -> Result<RunSummary, TrawlError> {
        let mut existing = self.sink.existing_sheets()?;
        let mut summary = RunSummary::default();
        let seeds = self.seeds.clone();

        info!("Starting crawl of {} seeds", seeds.len());

        for (index, seed) in seeds.iter().enumerate() {
            let outcome = self.crawl_seed(seed, &mut existing).await?;

            match &outcome {
                SeedOutcome::AlreadyDone { .. } => summary.seeds_skipped += 1,
                SeedOutcome::Unresolved { .. } => summary.seeds_unresolved += 1,
                SeedOutcome::Completed { report, .. } => {
                    summary.seeds_completed += 1;
                    summary.entries_recorded += report.entries.len() as u64;
                    summary.pages_fetched += u64::from(report.pages_fetched);

                    if index + 1 < seeds.len() {
                        self.ctx.pacer.between_seeds().await;
                    }
                }
            }
        }

        info!(
            "Crawl finished: {} seeds completed, {} skipped, {} unresolved, {} new profiles",
            summary.seeds_completed,
            summary.seeds_skipped,
            summary.seeds_unresolved,
            summary.entries_recorded
        );

        Ok(summary)
    }

    /// Crawls a single seed
    ///
    /// `existing` holds the sheet names already present in the sink and is
    /// updated when this seed writes its sheet.
    pub async fn crawl_seed(
        &mut self,
        seed: &SeedEntry,
        existing: &mut HashSet<String>,
    ) -> Result<SeedOutcome, TrawlError> {
        let sheet = sheet_name(&seed.name);
        if existing.contains(&sheet) {
            info!("Skipping {}, sheet '{}' already exists", seed.name, sheet);
            return Ok(SeedOutcome::AlreadyDone { sheet });
        }

        let Some(handle) = extract_handle(&seed.target) else {
            error!("No handle found in target '{}' for {}", seed.target, seed.name);
            return Ok(SeedOutcome::Unresolved {
                target: seed.target.clone(),
            });
        };

        info!("Crawling @{} for seed {}", handle, seed.name);

        let Some(target_id) = self.resolve(&handle).await else {
            error!("Couldn't resolve an id for @{}", handle);
            return Ok(SeedOutcome::Unresolved {
                target: seed.target.clone(),
            });
        };

        let report = walk(&mut self.ctx, &seed.name, &target_id).await?;

        // Rows recorded by an interrupted earlier run belong on the sheet too.
        let rows = self.ctx.ledger.entries_for_seed(&seed.name)?;
        if rows.is_empty() {
            warn!("No profiles recorded for {}", seed.name);
        } else {
            self.sink.write_sheet(&sheet, &seed.name, &rows)?;
            existing.insert(sheet.clone());
            info!(
                "Saved {} profiles from {} to sheet '{}' ({} new this run)",
                rows.len(),
                seed.name,
                sheet,
                report.entries.len()
            );
        }

        Ok(SeedOutcome::Completed { sheet, report })
    }

    async fn resolve(&mut self, handle: &str) -> Option<String> {
        let url = self.ctx.api.resolve_url(handle).ok()?;
        match self
            .ctx
            .executor
            .execute(&mut self.ctx.pacer, &url, &[])
            .await
        {
            Ok(body) => parse_resolved_id(&body),
            Err(failure) => {
                warn!("Resolving @{} failed: {}", handle, failure);
                None
            }
        }
    }
}

/// Runs a complete crawl from configuration
pub async fn run_crawl(config: Config) -> Result<RunSummary, TrawlError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
