use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{IdleError, Result};

/// Public GroupMe v3 endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.groupme.com/v3";

/// Environment variable consulted for the access token
pub const TOKEN_ENV_VAR: &str = "GROUPME_TOKEN";

/// Token file name inside the home directory, shared with the Groupy tooling
pub const TOKEN_FILE_NAME: &str = ".groupy.key";

/// Settings for one inactivity scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Activity within the last `lookback_days` days counts as active
    pub lookback_days: u32,

    /// Number of messages requested per archive fetch
    pub page_size: u32,
}

impl ScanConfig {
    pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;
    pub const PAGE_SIZE: u32 = 100;

    pub fn new(lookback_days: u32) -> Self {
        Self {
            lookback_days,
            page_size: Self::PAGE_SIZE,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LOOKBACK_DAYS)
    }
}

/// Connection settings for [`crate::api::GroupMeClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    /// Per-request timeout handed to the HTTP client
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn default_timeout() -> Duration {
        Duration::from_secs(30)
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            timeout: Self::default_timeout(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Finds the access token.
///
/// Lookup order is the explicit value, then `GROUPME_TOKEN` (a `.env` file in the working
/// directory is honoured), then the first non-empty line of `~/.groupy.key`.
pub fn resolve_token(explicit: Option<String>) -> Result<String> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        return Ok(token.trim().to_string());
    }

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(target: "groupme_idle::config", "Ignoring unreadable .env file: {}", e);
        }
    }

    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            return Ok(token.trim().to_string());
        }
    }

    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        IdleError::Configuration(format!(
            "no access token: pass --token, set {} or create ~/{}",
            TOKEN_ENV_VAR, TOKEN_FILE_NAME
        ))
    })?;
    read_token_file(&home.join(TOKEN_FILE_NAME))
}

/// Reads the first non-empty line of a token file.
pub fn read_token_file(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        IdleError::Configuration(format!("cannot read token file {}: {}", path.display(), e))
    })?;

    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| IdleError::Configuration(format!("token file {} is empty", path.display())))
}
