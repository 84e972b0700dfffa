use crate::error::{ReportError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the GitHub REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Records requested per page (GitHub caps this at 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Extra seconds to sleep past a rate-limit reset
    #[serde(default = "default_grace")]
    pub rate_limit_grace_secs: u64,

    /// GitHub access token
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::config(format!(
                "Config file not found at: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default config file, falling back to defaults if there is none
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::config("Could not determine home directory"))?;
        Ok(home.join(".config").join("gh-report").join("config.toml"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(ReportError::config("api_url must not be empty"));
        }

        if !(1..=100).contains(&self.per_page) {
            return Err(ReportError::config("per_page must be between 1 and 100"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ReportError::config("request_timeout_secs must be > 0"));
        }

        if matches!(self.token.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ReportError::config("token must not be empty"));
        }

        Ok(())
    }

    /// The access token, required for any run
    pub fn token(&self) -> Result<String> {
        self.token.clone().ok_or_else(|| {
            ReportError::MissingConfig(
                "access token (use --token, GITHUB_TOKEN or the config file)".to_string(),
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            per_page: default_per_page(),
            request_timeout_secs: default_timeout(),
            rate_limit_grace_secs: default_grace(),
            token: None,
        }
    }
}

// Serde default functions
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("gh-report/{}", env!("CARGO_PKG_VERSION"))
}

fn default_per_page() -> u32 {
    100
}

fn default_timeout() -> u64 {
    30
}

fn default_grace() -> u64 {
    5
}
