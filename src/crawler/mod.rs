//! Crawler module for walking social-graph listings
//!
//! This module contains the core crawling logic, including:
//! - Credential rotation across a fixed session pool
//! - Request execution with classified retries and exponential backoff
//! - Pacing delays, randomized long pauses and the periodic cooldown
//! - Cursor-driven pagination with per-entry detail lookups
//! - Seed-level orchestration and resumability

mod api;
mod backoff;
mod coordinator;
mod executor;
mod pacing;
mod rotator;
mod walker;

pub use api::{
    parse_page, parse_profile, parse_resolved_id, Cursor, GraphApi, ListedEntry, Page,
    ProfileDetails,
};
pub use backoff::{Backoff, RetryPolicy};
pub use coordinator::{run_crawl, Coordinator, RunSummary, SeedOutcome};
pub use executor::{
    build_http_client, classify_status, RequestExecutor, RequestFailure, RetryableFailure,
    StatusClass,
};
pub use pacing::{
    Clock, ManualClock, Pacer, PauseSchedule, RecordingSleeper, Sleeper, SystemClock,
    TokioSleeper,
};
pub use rotator::CredentialRotator;
pub use walker::{walk, StopReason, WalkReport};

use crate::ledger::{Ledger, LedgerResult};
use std::collections::HashSet;
use tracing::info;

/// One discovered account
///
/// Created once per unique username and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetEntry {
    pub username: String,
    pub profile_url: String,
    pub full_name: String,
    pub biography: String,
    /// Email from the profile's contact field
    pub email_from_field: String,
    /// First email found in the biography text
    pub email_from_bio: String,
    pub follower_count: u64,
}

/// Mutable state for one crawl run
///
/// Owned by the coordinator and lent to the walker, so every piece of
/// process-wide state (pacing clock, dedup set, random source) is explicit.
pub struct CrawlContext {
    pub api: GraphApi,
    pub executor: RequestExecutor,
    pub pacer: Pacer,
    pub ledger: Box<dyn Ledger>,
    /// Usernames already recorded, rebuilt from the ledger
    pub seen: HashSet<String>,
}

impl CrawlContext {
    /// Creates the context and replays the ledger into the dedup set
    pub fn new(
        api: GraphApi,
        executor: RequestExecutor,
        pacer: Pacer,
        ledger: Box<dyn Ledger>,
    ) -> LedgerResult<Self> {
        let seen = ledger.load_existing()?;
        if seen.is_empty() {
            info!("No previous progress found, starting fresh");
        } else {
            info!("Loaded {} previously recorded usernames", seen.len());
        }

        Ok(Self {
            api,
            executor,
            pacer,
            ledger,
            seen,
        })
    }
}
