use std::error::Error;
use std::fmt;

/// Why a remote book operation failed. Every variant carries the message that
/// should be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server rejected the input (400).
    Validation(String),
    /// The resource conflicts with an existing one (409).
    Conflict(String),
    /// No book with the requested ID (404).
    NotFound(String),
    /// No usable response: connection failure, unexpected status or undecodable body.
    Transport(String),
    /// The server answered 2xx but reported `success: false`.
    Rejected(String),
}

impl ApiError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ApiError::Validation(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Transport(message),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::Conflict(m)
            | ApiError::NotFound(m)
            | ApiError::Transport(m)
            | ApiError::Rejected(m) => m,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(m) => write!(f, "invalid book data: {m}"),
            ApiError::Conflict(m) => write!(f, "conflicting book: {m}"),
            ApiError::NotFound(m) => write!(f, "book not found: {m}"),
            ApiError::Transport(m) => write!(f, "problem talking to the book service: {m}"),
            ApiError::Rejected(m) => write!(f, "book service rejected the request: {m}"),
        }
    }
}

impl Error for ApiError {}

#[derive(Debug)]
pub enum ConfigError {
    InvalidUrl {
        url: String,
        reason: String,
    },
    InvalidNumber {
        var: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
    Client(reqwest::Error),
}

impl From<reqwest::Error> for ConfigError {
    fn from(error: reqwest::Error) -> Self {
        ConfigError::Client(error)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUrl { url, reason } => {
                write!(f, "{url:?} is not a usable base URL: {reason}")
            }
            ConfigError::InvalidNumber { var, value, .. } => {
                write!(f, "{var} must be a whole number, got {value:?}")
            }
            ConfigError::Client(e) => write!(f, "problem building the HTTP client: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::InvalidUrl { .. } => None,
            ConfigError::InvalidNumber { source, .. } => Some(source),
            ConfigError::Client(e) => Some(e),
        }
    }
}
