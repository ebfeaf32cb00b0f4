//! Graph-Trawl: a resumable crawler for paginated social-graph listings
//!
//! This crate walks the connection list of each seed account through a
//! rate-limited upstream API, fetches profile details for every newly seen
//! entry, and records progress in a durable ledger so interrupted runs can
//! pick up where they stopped without fetching anyone twice.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod ledger;
pub mod output;

use thiserror::Error;

/// Main error type for Graph-Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Credential pool is empty; add at least one credential to the credentials file")]
    EmptyCredentialPool,

    #[error("Ledger error: {0}")]
    Ledger(#[from] ledger::LedgerError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse credentials file: {0}")]
    Credentials(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Graph-Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, TargetEntry};
pub use extract::{extract_email_from_bio, extract_handle, sheet_name};
