use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for Graph-Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "seed")]
    pub seeds: Vec<SeedEntry>,
}

/// Request execution configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Attempts per logical request before giving up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Per-request network timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Entries requested per listing page
    #[serde(rename = "page-size")]
    pub page_size: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            request_timeout: 15,
            page_size: 50,
        }
    }
}

/// Exponential backoff configuration, all values in seconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay applied to the first retry of a failure class
    #[serde(rename = "base-delay")]
    pub base_delay: f64,

    /// Ceiling for transport-level failures
    #[serde(rename = "network-ceiling")]
    pub network_ceiling: f64,

    /// Ceiling for rate-limit and anti-spam responses
    #[serde(rename = "rate-limit-ceiling")]
    pub rate_limit_ceiling: f64,

    /// Upper bound of the uniform jitter added to every backoff sleep
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: 5.0,
            network_ceiling: 120.0,
            rate_limit_ceiling: 360.0,
            jitter: 2.0,
        }
    }
}

/// Pacing configuration. Ranges are `[low, high]` in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay after every recorded entry
    #[serde(rename = "entry-delay")]
    pub entry_delay: [f64; 2],

    /// Delay between listing pages
    #[serde(rename = "page-delay")]
    pub page_delay: [f64; 2],

    /// Delay between seeds
    #[serde(rename = "seed-delay")]
    pub seed_delay: [f64; 2],

    /// Length of the long pause taken every few hundred entries
    #[serde(rename = "long-pause")]
    pub long_pause: [f64; 2],

    /// Entry count interval between long pauses (inclusive integer range)
    #[serde(rename = "long-pause-every")]
    pub long_pause_every: [u32; 2],

    /// Wall-clock time after which a cooldown is taken (seconds)
    #[serde(rename = "cooldown-after")]
    pub cooldown_after: u64,

    /// Length of the cooldown
    pub cooldown: [f64; 2],

    /// Fixed seed for the random source; drawn from the OS when absent
    #[serde(rename = "random-seed")]
    pub random_seed: Option<u64>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            entry_delay: [2.5, 4.5],
            page_delay: [2.0, 4.0],
            seed_delay: [10.0, 20.0],
            long_pause: [25.0, 50.0],
            long_pause_every: [120, 150],
            cooldown_after: 3600,
            cooldown: [300.0, 360.0],
            random_seed: None,
        }
    }
}

impl PacingConfig {
    /// Configuration with every delay set to zero, used by tests
    pub fn immediate() -> Self {
        Self {
            entry_delay: [0.0, 0.0],
            page_delay: [0.0, 0.0],
            seed_delay: [0.0, 0.0],
            long_pause: [0.0, 0.0],
            cooldown: [0.0, 0.0],
            random_seed: Some(7),
            ..Self::default()
        }
    }

    pub fn cooldown_after(&self) -> Duration {
        Duration::from_secs(self.cooldown_after)
    }
}

/// Upstream API surface
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL every path below is joined onto
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Handle lookup path; `{handle}` is substituted
    #[serde(rename = "resolve-path")]
    pub resolve_path: String,

    /// Connection listing path; `{id}` is substituted
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Profile detail path; `{id}` is substituted
    #[serde(rename = "profile-path")]
    pub profile_path: String,

    /// Query parameter carrying the pagination cursor
    #[serde(rename = "cursor-param", default = "default_cursor_param")]
    pub cursor_param: String,

    /// Query parameter carrying the page size
    #[serde(rename = "page-size-param", default = "default_page_size_param")]
    pub page_size_param: String,

    /// Prefix for the public profile URL of an entry
    #[serde(rename = "profile-url-base")]
    pub profile_url_base: String,

    /// Substring of a 400 body that marks an anti-spam feedback response
    #[serde(rename = "feedback-marker", default = "default_feedback_marker")]
    pub feedback_marker: String,

    /// Static headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_cursor_param() -> String {
    "max_id".to_string()
}

fn default_page_size_param() -> String {
    "count".to_string()
}

fn default_feedback_marker() -> String {
    "feedback_required".to_string()
}

/// Where session credentials come from and how they are sent
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    /// JSON file holding an array of credential objects
    pub path: String,

    #[serde(rename = "session-cookie", default = "default_session_cookie")]
    pub session_cookie: String,

    #[serde(rename = "user-cookie", default = "default_user_cookie")]
    pub user_cookie: String,

    #[serde(rename = "csrf-cookie", default = "default_csrf_cookie")]
    pub csrf_cookie: String,

    /// Header that also carries the anti-forgery token, if any
    #[serde(rename = "csrf-header", default)]
    pub csrf_header: Option<String>,
}

fn default_session_cookie() -> String {
    "sessionid".to_string()
}

fn default_user_cookie() -> String {
    "user_id".to_string()
}

fn default_csrf_cookie() -> String {
    "csrftoken".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the progress ledger database
    #[serde(rename = "ledger-path")]
    pub ledger_path: String,

    /// Path to the workbook database holding one sheet per seed
    #[serde(rename = "workbook-path")]
    pub workbook_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

/// A seed account whose connections are crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Display name, also used to name the output sheet
    pub name: String,

    /// Handle or profile URL of the account
    pub target: String,
}
