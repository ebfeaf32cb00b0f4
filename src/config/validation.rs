use crate::config::types::{
    ApiConfig, BackoffConfig, Config, CrawlerConfig, CredentialsConfig, OutputConfig,
    PacingConfig, SeedEntry,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_backoff_config(&config.backoff)?;
    validate_pacing_config(&config.pacing)?;
    validate_api_config(&config.api)?;
    validate_credentials_config(&config.credentials)?;
    validate_output_config(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates request execution settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    Ok(())
}

fn validate_backoff_config(config: &BackoffConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("base_delay", config.base_delay),
        ("network_ceiling", config.network_ceiling),
        ("rate_limit_ceiling", config.rate_limit_ceiling),
        ("jitter", config.jitter),
    ] {
        validate_seconds(name, value)?;
    }

    if config.network_ceiling < config.base_delay || config.rate_limit_ceiling < config.base_delay
    {
        return Err(ConfigError::Validation(
            "backoff ceilings must be >= base_delay".to_string(),
        ));
    }

    Ok(())
}

fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_range("entry_delay", config.entry_delay)?;
    validate_range("page_delay", config.page_delay)?;
    validate_range("seed_delay", config.seed_delay)?;
    validate_range("long_pause", config.long_pause)?;
    validate_range("cooldown", config.cooldown)?;

    let [low, high] = config.long_pause_every;
    if low < 1 || low > high {
        return Err(ConfigError::Validation(format!(
            "long_pause_every must be a range [low, high] with 1 <= low <= high, got [{}, {}]",
            low, high
        )));
    }

    if config.cooldown_after < 1 {
        return Err(ConfigError::Validation(
            "cooldown_after must be >= 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates the upstream API surface
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
    if base.scheme() != "https" && base.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    Url::parse(&config.profile_url_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid profile_url_base: {}", e)))?;

    require_placeholder("resolve_path", &config.resolve_path, "{handle}")?;
    require_placeholder("listing_path", &config.listing_path, "{id}")?;
    require_placeholder("profile_path", &config.profile_path, "{id}")?;

    if config.cursor_param.is_empty() || config.page_size_param.is_empty() {
        return Err(ConfigError::Validation(
            "cursor_param and page_size_param cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_credentials_config(config: &CredentialsConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "credentials path cannot be empty".to_string(),
        ));
    }

    for (name, cookie) in [
        ("session_cookie", &config.session_cookie),
        ("user_cookie", &config.user_cookie),
        ("csrf_cookie", &config.csrf_cookie),
    ] {
        if cookie.is_empty() || cookie.contains(&['=', ';', ' '][..]) {
            return Err(ConfigError::Validation(format!(
                "{} must be a non-empty cookie name, got '{}'",
                name, cookie
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("ledger_path", &config.ledger_path),
        ("workbook_path", &config.workbook_path),
        ("summary_path", &config.summary_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.ledger_path == config.workbook_path {
        return Err(ConfigError::Validation(
            "ledger_path and workbook_path must point to different files".to_string(),
        ));
    }

    Ok(())
}

fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    for seed in seeds {
        if seed.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Seed with target '{}' has an empty name",
                seed.target
            )));
        }

        if seed.target.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Seed '{}' has an empty target",
                seed.name
            )));
        }
    }

    Ok(())
}

/// Longest delay, backoff or pause accepted, in seconds
const MAX_DELAY_SECONDS: f64 = 86_400.0;

fn validate_seconds(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }

    if value > MAX_DELAY_SECONDS {
        return Err(ConfigError::Validation(format!(
            "{} must be at most {} seconds (one day), got {}",
            name, MAX_DELAY_SECONDS, value
        )));
    }

    Ok(())
}

/// Validates a `[low, high]` range of seconds
fn validate_range(name: &str, range: [f64; 2]) -> Result<(), ConfigError> {
    let [low, high] = range;
    validate_seconds(name, low)?;
    validate_seconds(name, high)?;

    if low > high {
        return Err(ConfigError::Validation(format!(
            "{} must be a range [low, high] with low <= high, got [{}, {}]",
            name, low, high
        )));
    }

    Ok(())
}

fn require_placeholder(name: &str, template: &str, placeholder: &str) -> Result<(), ConfigError> {
    if !template.contains(placeholder) {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must contain the {} placeholder",
            name, template, placeholder
        )));
    }
    Ok(())
}
