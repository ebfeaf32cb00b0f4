//! Rate-aware request executor
//!
//! This module issues every upstream call the crawler makes:
//! - Building the HTTP client with timeouts and a user agent
//! - Attaching the next credential from the rotator to each attempt
//! - Classifying responses into success, retryable and terminal outcomes
//! - Exponential backoff with jitter, separately per failure class
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 200 | Return parsed JSON body |
//! | Transport error / timeout | Retry, backoff capped at the network ceiling |
//! | HTTP 429 / 503 | Retry, backoff capped at the rate-limit ceiling |
//! | HTTP 400 with feedback marker | Same as 429 |
//! | Any other status | Fail immediately, no retry |
//! | Attempts exhausted | Fail with the last retryable cause |

use crate::config::{ApiConfig, Config, Credential, CredentialsConfig};
use crate::crawler::backoff::RetryPolicy;
use crate::crawler::pacing::Pacer;
use crate::crawler::rotator::CredentialRotator;
use reqwest::header::COOKIE;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// How a single response is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    RateLimited,
    Permanent,
}

/// Classifies an HTTP status and body
///
/// A 400 whose body carries `feedback_marker` is the upstream's anti-spam
/// signal and is handled like a 429.
pub fn classify_status(status: u16, body: &str, feedback_marker: &str) -> StatusClass {
    match status {
        200 => StatusClass::Success,
        429 | 503 => StatusClass::RateLimited,
        400 if !feedback_marker.is_empty() && body.contains(feedback_marker) => {
            StatusClass::RateLimited
        }
        _ => StatusClass::Permanent,
    }
}

/// The retryable failure that ended an exhausted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryableFailure {
    TransientNetwork(String),
    RateLimited { status: u16 },
}

impl fmt::Display for RetryableFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransientNetwork(error) => write!(f, "network error: {}", error),
            Self::RateLimited { status } => write!(f, "rate limited (HTTP {})", status),
        }
    }
}

/// Terminal outcome of a logical request
///
/// Callers treat every variant as "no data for this request" and stop the
/// page or seed; none of them abort the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    #[error("HTTP {status} is not retryable")]
    PermanentHttp { status: u16 },

    #[error("response body is not valid JSON: {0}")]
    Malformed(String),

    #[error("gave up after {attempts} attempts, last failure: {last}")]
    Exhausted {
        attempts: u32,
        last: RetryableFailure,
    },
}

enum Attempt {
    Done(Result<Value, RequestFailure>),
    Retry(RetryableFailure),
}

/// Builds the HTTP client shared by all requests
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let user_agent = format!("graph-trawl/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.crawler.request_timeout))
        .connect_timeout(Duration::from_secs(config.crawler.request_timeout.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues upstream calls with bounded retry and credential rotation
pub struct RequestExecutor {
    client: Client,
    rotator: CredentialRotator,
    policy: RetryPolicy,
    auth: CredentialsConfig,
    headers: BTreeMap<String, String>,
    feedback_marker: String,
    attempts_made: u64,
}

impl RequestExecutor {
    pub fn new(
        client: Client,
        rotator: CredentialRotator,
        policy: RetryPolicy,
        auth: CredentialsConfig,
        api: &ApiConfig,
    ) -> Self {
        Self {
            client,
            rotator,
            policy,
            auth,
            headers: api.headers.clone(),
            feedback_marker: api.feedback_marker.clone(),
            attempts_made: 0,
        }
    }

    /// HTTP attempts made so far across all requests
    pub fn attempts_made(&self) -> u64 {
        self.attempts_made
    }

    /// Executes one logical GET request and returns its JSON body
    ///
    /// Every attempt takes a fresh credential. Backoff sleeps go through the
    /// pacer so they share its sleeper and random source.
    pub async fn execute(
        &mut self,
        pacer: &mut Pacer,
        endpoint: &Url,
        params: &[(String, String)],
    ) -> Result<Value, RequestFailure> {
        let mut network = self.policy.network_backoff();
        let mut rate_limit = self.policy.rate_limit_backoff();
        let mut last = RetryableFailure::TransientNetwork("no attempt made".to_string());

        for attempt in 1..=self.policy.max_attempts {
            let credential = self.rotator.next().clone();
            self.attempts_made += 1;
            debug!(attempt, url = %endpoint, "Sending request");

            let failure = match self.attempt(endpoint, params, &credential).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(failure) => failure,
            };

            let backoff = match &failure {
                RetryableFailure::TransientNetwork(_) => &mut network,
                RetryableFailure::RateLimited { .. } => &mut rate_limit,
            };
            let delay = backoff.advance();
            let retries = backoff.attempts();
            last = failure;

            if attempt < self.policy.max_attempts {
                self.back_off(pacer, &last, retries, delay).await;
            }
        }

        Err(RequestFailure::Exhausted {
            attempts: self.policy.max_attempts,
            last,
        })
    }

    /// Sends one HTTP request and classifies the outcome
    async fn attempt(
        &self,
        endpoint: &Url,
        params: &[(String, String)],
        credential: &Credential,
    ) -> Attempt {
        let response = match self.build_request(endpoint, params, credential).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(RetryableFailure::TransientNetwork(e.to_string())),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Retry(RetryableFailure::TransientNetwork(e.to_string())),
        };

        match classify_status(status, &body, &self.feedback_marker) {
            StatusClass::Success => Attempt::Done(
                serde_json::from_str(&body).map_err(|e| RequestFailure::Malformed(e.to_string())),
            ),
            StatusClass::RateLimited => Attempt::Retry(RetryableFailure::RateLimited { status }),
            StatusClass::Permanent => {
                warn!("HTTP {} from {}, not retrying", status, endpoint);
                Attempt::Done(Err(RequestFailure::PermanentHttp { status }))
            }
        }
    }

    async fn back_off(
        &self,
        pacer: &mut Pacer,
        failure: &RetryableFailure,
        retries: u32,
        delay: Duration,
    ) {
        let total = delay + pacer.jitter(self.policy.jitter);
        warn!(
            "{} (retry {} for this cause), backing off {:.1}s",
            failure,
            retries,
            total.as_secs_f64()
        );
        pacer.sleep(total).await;
    }

    fn build_request(
        &self,
        endpoint: &Url,
        params: &[(String, String)],
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .get(endpoint.clone())
            .query(params)
            .header(COOKIE, self.cookie_header(credential));

        if let Some(header) = &self.auth.csrf_header {
            request = request.header(header.as_str(), credential.csrf_token.as_str());
        }

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        request
    }

    fn cookie_header(&self, credential: &Credential) -> String {
        format!(
            "{}={}; {}={}; {}={}",
            self.auth.session_cookie,
            credential.session_token,
            self.auth.user_cookie,
            credential.user_id,
            self.auth.csrf_cookie,
            credential.csrf_token
        )
    }
}
