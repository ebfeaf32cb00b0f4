//! Session credential loading
//!
//! Credentials are supplied by the operator in a JSON file; they are never
//! generated or embedded. Each credential is an immutable bundle that the
//! crawler attaches to outbound requests.

use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// An opaque session identity bundle
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    /// Session token
    #[serde(alias = "sessionid", alias = "session")]
    pub session_token: String,

    /// Account identifier the session belongs to
    #[serde(alias = "ds_user_id", alias = "uid")]
    pub user_id: String,

    /// Anti-forgery token
    #[serde(alias = "csrftoken", alias = "csrf")]
    pub csrf_token: String,
}

impl Credential {
    pub fn new(
        session_token: impl Into<String>,
        user_id: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self {
            session_token: session_token.into(),
            user_id: user_id.into(),
            csrf_token: csrf_token.into(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("session_token", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .finish()
    }
}

/// Loads the credential pool from a JSON array file
///
/// An empty array is returned as an empty pool; the rotator decides that an
/// empty pool is fatal.
pub fn load_credentials(path: &Path) -> Result<Vec<Credential>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_credentials(&content)
}

/// Parses a JSON array of credential objects
pub fn parse_credentials(content: &str) -> Result<Vec<Credential>, ConfigError> {
    let credentials: Vec<Credential> = serde_json::from_str(content)?;
    Ok(credentials)
}
