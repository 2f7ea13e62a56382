use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every book endpoint, e.g. `http://localhost:5000/api/v1`.
    pub base_url: String,
    pub timeout: Duration,
    pub page_limit: u32,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Reads `BOOK_API_URL`, `BOOK_API_TIMEOUT_SECS` and `BOOK_API_PAGE_LIMIT`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config =
            ClientConfig::new(lookup("BOOK_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()));

        if let Some(secs) = parse_number::<u64>(&lookup, "BOOK_API_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = parse_number::<u32>(&lookup, "BOOK_API_PAGE_LIMIT")? {
            config.page_limit = limit;
        }

        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new(DEFAULT_BASE_URL)
    }
}

fn parse_number<N>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<N>, ConfigError>
where
    N: std::str::FromStr<Err = std::num::ParseIntError>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<N>()
            .map(Some)
            .map_err(|source| ConfigError::InvalidNumber { var, value, source }),
    }
}
