//! Exponential backoff state
//!
//! One [`Backoff`] tracks one failure class within one logical request. The
//! executor keeps separate instances for transport errors and rate limiting,
//! each with its own ceiling, and drops both when the request finishes.

use crate::config::{BackoffConfig, CrawlerConfig};
use std::time::Duration;

/// Doubling delay with a ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    ceiling: Duration,
    current: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, ceiling: Duration) -> Self {
        Self {
            ceiling,
            current: base.min(ceiling),
            attempts: 0,
        }
    }

    /// Retries taken so far in this class
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the delay for this retry and doubles it for the next one
    pub fn advance(&mut self) -> Duration {
        let delay = self.current;
        self.current = self
            .current
            .checked_mul(2)
            .unwrap_or(self.ceiling)
            .min(self.ceiling);
        self.attempts += 1;
        delay
    }
}

/// Retry limits and backoff shape for the request executor
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per logical request, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub network_ceiling: Duration,
    pub rate_limit_ceiling: Duration,
    /// Upper bound of the uniform jitter, in seconds
    pub jitter: f64,
}

impl RetryPolicy {
    pub fn from_config(crawler: &CrawlerConfig, backoff: &BackoffConfig) -> Self {
        Self {
            max_attempts: crawler.max_attempts,
            base_delay: Duration::from_secs_f64(backoff.base_delay),
            network_ceiling: Duration::from_secs_f64(backoff.network_ceiling),
            rate_limit_ceiling: Duration::from_secs_f64(backoff.rate_limit_ceiling),
            jitter: backoff.jitter,
        }
    }

    pub fn network_backoff(&self) -> Backoff {
        Backoff::new(self.base_delay, self.network_ceiling)
    }

    pub fn rate_limit_backoff(&self) -> Backoff {
        Backoff::new(self.base_delay, self.rate_limit_ceiling)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default(), &BackoffConfig::default())
    }
}
