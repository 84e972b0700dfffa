use thiserror::Error;

/// Main error type for gh-report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Malformed month or week selector
    #[error("Invalid period: {0}")]
    Period(String),

    /// Malformed `owner/repo` argument
    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepo(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the GitHub API
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    /// Regex errors
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for gh-report operations
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Create a new period parse error
    pub fn period<S: Into<String>>(msg: S) -> Self {
        Self::Period(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(status: u16, msg: S) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }
}
