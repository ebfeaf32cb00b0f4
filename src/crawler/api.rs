//! Upstream API surface
//!
//! Builds request URLs from the configured path templates and turns JSON
//! response bodies into typed values. Parsing is lenient: the upstream schema
//! is not under our control, so missing fields become empty values instead of
//! errors, and ids are accepted as strings or numbers.

use crate::config::ApiConfig;
use serde_json::Value;
use url::Url;

/// One connection listed on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub username: String,
    /// Internal id used for the detail lookup, if the listing carried one
    pub id: Option<String>,
}

/// Pagination position returned with a page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cursor {
    pub token: Option<String>,
    pub has_more: bool,
}

impl Cursor {
    /// True when no further page should be requested
    pub fn is_terminal(&self) -> bool {
        !self.has_more || self.token.as_deref().map_or(true, str::is_empty)
    }
}

/// A parsed listing page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub entries: Vec<ListedEntry>,
    pub cursor: Cursor,
}

/// Profile fields from a detail lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDetails {
    pub full_name: String,
    pub biography: String,
    pub public_email: String,
    pub follower_count: u64,
}

/// Request builder for the three upstream endpoints
#[derive(Debug, Clone)]
pub struct GraphApi {
    base: Url,
    config: ApiConfig,
    page_size: u32,
}

impl GraphApi {
    pub fn new(config: &ApiConfig, page_size: u32) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(&config.base_url)?,
            config: config.clone(),
            page_size,
        })
    }

    /// Prefix used to build profile URLs for entries
    pub fn profile_url_base(&self) -> &str {
        &self.config.profile_url_base
    }

    /// URL resolving a handle to an internal id
    pub fn resolve_url(&self, handle: &str) -> Result<Url, url::ParseError> {
        let encoded: String = url::form_urlencoded::byte_serialize(handle.as_bytes()).collect();
        self.base
            .join(&self.config.resolve_path.replace("{handle}", &encoded))
    }

    /// URL and query parameters for one listing page
    pub fn listing_request(
        &self,
        id: &str,
        cursor: Option<&str>,
    ) -> Result<(Url, Vec<(String, String)>), url::ParseError> {
        let url = self.join_id(&self.config.listing_path, id)?;

        let mut params = vec![(
            self.config.page_size_param.clone(),
            self.page_size.to_string(),
        )];
        if let Some(token) = cursor.filter(|t| !t.is_empty()) {
            params.push((self.config.cursor_param.clone(), token.to_string()));
        }

        Ok((url, params))
    }

    /// URL for a profile detail lookup
    pub fn profile_request(&self, id: &str) -> Result<Url, url::ParseError> {
        self.join_id(&self.config.profile_path, id)
    }

    fn join_id(&self, template: &str, id: &str) -> Result<Url, url::ParseError> {
        let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
        self.base.join(&template.replace("{id}", &encoded))
    }
}

/// Reads an id that may be encoded as a string or a number
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn str_field(object: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// Extracts the internal id from a resolution response
pub fn parse_resolved_id(body: &Value) -> Option<String> {
    ["/data/user/id", "/user/id", "/user/pk", "/id", "/pk"]
        .iter()
        .find_map(|pointer| body.pointer(pointer).and_then(id_string))
}

/// Parses a listing page
///
/// Entries without a username are dropped. When the response has no explicit
/// `has_more` flag, more pages are assumed exactly when a cursor is present.
pub fn parse_page(body: &Value) -> Page {
    let entries = body
        .get("users")
        .and_then(Value::as_array)
        .map(|users| {
            users
                .iter()
                .filter_map(|user| {
                    let username = user.get("username")?.as_str()?;
                    if username.is_empty() {
                        return None;
                    }
                    let id = ["pk", "id"]
                        .iter()
                        .find_map(|key| user.get(*key).and_then(id_string));
                    Some(ListedEntry {
                        username: username.to_string(),
                        id,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let token = ["next_max_id", "next_cursor", "after"]
        .iter()
        .find_map(|key| body.get(*key).and_then(id_string));
    let has_more = ["has_more", "has_next_page"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_bool))
        .unwrap_or(token.is_some());

    Page {
        entries,
        cursor: Cursor { token, has_more },
    }
}

/// Parses a profile detail response
pub fn parse_profile(body: &Value) -> ProfileDetails {
    let user = body.get("user").unwrap_or(body);

    let follower_count = ["follower_count", "followers_count"]
        .iter()
        .find_map(|key| user.get(*key).and_then(Value::as_u64))
        .unwrap_or(0);

    ProfileDetails {
        full_name: str_field(user, &["full_name"]),
        biography: str_field(user, &["biography", "bio"]),
        public_email: str_field(user, &["public_email", "email"]),
        follower_count,
    }
}
