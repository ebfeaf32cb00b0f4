//! Pagination walker
//!
//! Drives one seed's connection listing as a bounded state machine:
//!
//! ```text
//! FetchPage -> ProcessEntries -> AdvanceCursor -> FetchPage | Done
//! ```
//!
//! A failed page request ends the walk gracefully; everything collected up to
//! that point is kept. Only ledger failures propagate, because without the
//! ledger neither deduplication nor resumability can be guaranteed.

use crate::crawler::api::{parse_page, parse_profile, Cursor, ListedEntry, Page, ProfileDetails};
use crate::crawler::executor::RequestFailure;
use crate::crawler::pacing::PauseSchedule;
use crate::crawler::{CrawlContext, TargetEntry};
use crate::extract::{extract_email_from_bio, profile_url};
use crate::ledger::LedgerResult;
use tracing::{debug, info, warn};

/// Why a walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The listing returned a terminal cursor
    EndOfList,
    /// A page request failed; pagination stopped for this target
    RequestFailed(RequestFailure),
}

/// Result of walking one target's listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// New entries, in discovery order
    pub entries: Vec<TargetEntry>,
    /// Listing pages successfully fetched
    pub pages_fetched: u32,
    /// Entries skipped because they were already recorded
    pub skipped: u32,
    /// Detail lookups that failed and left optional fields empty
    pub missing_details: u32,
    pub stop: StopReason,
}

enum WalkState {
    FetchPage { cursor: Option<String> },
    ProcessEntries { page: Page },
    AdvanceCursor { cursor: Cursor },
    Done(StopReason),
}

/// Walks the connection listing of `target_id`, recording new entries under
/// `seed_name`
pub async fn walk(
    ctx: &mut CrawlContext,
    seed_name: &str,
    target_id: &str,
) -> LedgerResult<WalkReport> {
    let mut report = WalkReport {
        entries: Vec::new(),
        pages_fetched: 0,
        skipped: 0,
        missing_details: 0,
        stop: StopReason::EndOfList,
    };
    let mut count: u64 = 0;
    let mut schedule = PauseSchedule::new(&mut ctx.pacer);

    let mut state = WalkState::FetchPage { cursor: None };

    report.stop = loop {
        state = match state {
            WalkState::FetchPage { cursor } => {
                ctx.pacer.cooldown_if_due().await;

                match fetch_page(ctx, target_id, cursor.as_deref()).await {
                    Ok(page) => {
                        report.pages_fetched += 1;
                        info!(
                            "{}: page {} with {} entries",
                            seed_name,
                            report.pages_fetched,
                            page.entries.len()
                        );
                        WalkState::ProcessEntries { page }
                    }
                    Err(failure) => {
                        warn!("{}: stopping pagination: {}", seed_name, failure);
                        WalkState::Done(StopReason::RequestFailed(failure))
                    }
                }
            }

            WalkState::ProcessEntries { page } => {
                for listed in page.entries {
                    if ctx.seen.contains(&listed.username) {
                        debug!("Skipping already recorded {}", listed.username);
                        report.skipped += 1;
                        continue;
                    }

                    let details = match fetch_details(ctx, &listed).await {
                        Some(details) => details,
                        None => {
                            report.missing_details += 1;
                            ProfileDetails::default()
                        }
                    };
                    let url = profile_url(ctx.api.profile_url_base(), &listed.username);
                    let entry = TargetEntry::from_details(listed.username, url, details);

                    // Recorded before moving on, so a crash never loses an acknowledged entry.
                    ctx.seen.insert(entry.username.clone());
                    if ctx.ledger.append(seed_name, &entry)? {
                        debug!("Recorded {}", entry.username);
                        report.entries.push(entry);
                    } else {
                        warn!("{} was already in the ledger", entry.username);
                    }

                    count += 1;
                    ctx.pacer.after_entry().await;

                    if schedule.is_due(count, &mut ctx.pacer) {
                        ctx.pacer.long_pause(count).await;
                    }
                }

                WalkState::AdvanceCursor { cursor: page.cursor }
            }

            WalkState::AdvanceCursor { cursor } => {
                if cursor.is_terminal() {
                    WalkState::Done(StopReason::EndOfList)
                } else {
                    ctx.pacer.between_pages().await;
                    WalkState::FetchPage {
                        cursor: cursor.token,
                    }
                }
            }

            WalkState::Done(reason) => break reason,
        };
    };

    Ok(report)
}

async fn fetch_page(
    ctx: &mut CrawlContext,
    target_id: &str,
    cursor: Option<&str>,
) -> Result<Page, RequestFailure> {
    let (url, params) = ctx
        .api
        .listing_request(target_id, cursor)
        .map_err(|e| RequestFailure::Malformed(e.to_string()))?;

    let body = ctx.executor.execute(&mut ctx.pacer, &url, &params).await?;
    Ok(parse_page(&body))
}

/// Looks up profile details; `None` when the listing had no id or the lookup failed
async fn fetch_details(ctx: &mut CrawlContext, listed: &ListedEntry) -> Option<ProfileDetails> {
    let id = listed.id.as_deref()?;
    let url = ctx.api.profile_request(id).ok()?;

    match ctx.executor.execute(&mut ctx.pacer, &url, &[]).await {
        Ok(body) => Some(parse_profile(&body)),
        Err(failure) => {
            warn!("No details for {}: {}", listed.username, failure);
            None
        }
    }
}

impl TargetEntry {
    /// Builds an entry from a detail lookup, extracting the biography email
    pub fn from_details(username: String, profile_url: String, details: ProfileDetails) -> Self {
        let email_from_bio = extract_email_from_bio(&details.biography);
        Self {
            username,
            profile_url,
            full_name: details.full_name,
            biography: details.biography,
            email_from_field: details.public_email,
            email_from_bio,
            follower_count: details.follower_count,
        }
    }
}
