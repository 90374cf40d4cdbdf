//! Client configuration.
//!
//! Defaults are overridden by environment variables, which are in turn
//! overridden by command-line flags.

use std::str::FromStr;
use std::time::Duration;

/// Backend base URL override
pub const URL_ENV: &str = "SEARCHSTREAM_URL";
/// `summary` or `deep`
pub const PROFILE_ENV: &str = "SEARCHSTREAM_PROFILE";
pub const TOP_K_ENV: &str = "SEARCHSTREAM_TOP_K";
/// Connect timeout in whole seconds
pub const TIMEOUT_ENV: &str = "SEARCHSTREAM_TIMEOUT_SECS";

/// Results requested from the summary backend when nothing else is set.
pub const DEFAULT_TOP_K: u32 = 5;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown profile '{0}' (expected 'summary' or 'deep')")]
    InvalidProfile(String),
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: String, value: String },
}

/// Which backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Web search plus summary: `sources` then `answer_chunk` events
    #[default]
    Summary,
    /// Multi-agent research: generic chunks on chat/search/reporter channels
    DeepSearch,
}

impl Profile {
    pub fn path(&self) -> &'static str {
        match self {
            Profile::Summary => "/search/summary",
            Profile::DeepSearch => "/api/query_stream",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Profile::Summary => "http://localhost:8000",
            Profile::DeepSearch => "http://localhost:8081",
        }
    }

    /// Only the summary backend understands `top_k`.
    pub fn accepts_top_k(&self) -> bool {
        matches!(self, Profile::Summary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Summary => "summary",
            Profile::DeepSearch => "deep",
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" | "search" => Ok(Profile::Summary),
            "deep" | "deepsearch" | "deep-search" => Ok(Profile::DeepSearch),
            other => Err(ConfigError::InvalidProfile(other.to_string())),
        }
    }
}

/// Configuration for talking to a search backend.
///
/// # Example
///
/// ```ignore
/// use searchstream::config::{ClientConfig, Profile};
///
/// let config = ClientConfig::default()
///     .with_profile(Profile::DeepSearch)
///     .with_base_url("http://10.0.0.5:8081");
/// assert_eq!(config.endpoint(), "http://10.0.0.5:8081/api/query_stream");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub profile: Profile,
    /// Base URL; the profile's default when `None`
    pub base_url: Option<String>,
    /// Explicit `top_k`; summary requests fall back to [`DEFAULT_TOP_K`]
    pub top_k: Option<u32>,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            base_url: None,
            top_k: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Defaults overridden by `SEARCHSTREAM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env()
    }

    /// Apply any `SEARCHSTREAM_*` variables that are set on top of `self`.
    pub fn merge_env(mut self) -> Result<Self, ConfigError> {
        if let Some(url) = env_var(URL_ENV) {
            self.base_url = Some(url);
        }
        if let Some(profile) = env_var(PROFILE_ENV) {
            self.profile = profile.parse()?;
        }
        if let Some(top_k) = env_var(TOP_K_ENV) {
            self.top_k = Some(parse_positive(TOP_K_ENV, &top_k)?);
        }
        if let Some(secs) = env_var(TIMEOUT_ENV) {
            self.connect_timeout = Duration::from_secs(parse_positive(TIMEOUT_ENV, &secs)?.into());
        }
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.profile.default_base_url())
    }

    /// Full URL of the streaming endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url().trim_end_matches('/'),
            self.profile.path()
        )
    }

    /// `top_k` to put on the wire, if the profile takes one.
    pub fn request_top_k(&self) -> Option<u32> {
        if self.profile.accepts_top_k() {
            Some(self.top_k.unwrap_or(DEFAULT_TOP_K))
        } else {
            None
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a strictly positive integer setting.
pub fn parse_positive(name: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}
