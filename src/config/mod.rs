//! Configuration module for Graph-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and loading the credential pool they point at.
//!
//! # Example
//!
//! ```no_run
//! use graph_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Crawling {} seeds", config.seeds.len());
//! ```

mod credentials;
mod parser;
mod types;
mod validation;

// Re-export types
pub use credentials::{load_credentials, parse_credentials, Credential};
pub use types::{
    ApiConfig, BackoffConfig, Config, CrawlerConfig, CredentialsConfig, OutputConfig,
    PacingConfig, SeedEntry,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
