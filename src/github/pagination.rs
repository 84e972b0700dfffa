use crate::error::Result;
use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use reqwest::header::HeaderMap;
use std::time::Duration;

/// Pattern matching the `rel="next"` entry of a `Link` header
pub fn next_link_pattern() -> Result<Regex> {
    Ok(Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#)?)
}

/// Extract the `rel="next"` target from a `Link` header
pub fn next_page_url(pattern: &Regex, link: &str) -> Option<String> {
    pattern
        .captures(link)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Rate-limit state reported with every API response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
    pub reset: DateTime<Utc>,
}

impl RateLimit {
    /// Read the `x-ratelimit-*` headers. None if any is missing.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<i64>().ok())
        };

        let limit = u32::try_from(number("x-ratelimit-limit")?).ok()?;
        let remaining = u32::try_from(number("x-ratelimit-remaining")?).ok()?;
        let reset = Utc.timestamp_opt(number("x-ratelimit-reset")?, 0).single()?;

        Some(Self {
            limit,
            remaining,
            reset,
        })
    }

    /// No requests left until the reset
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// How long to wait from `now` until the quota resets, plus `grace`
    pub fn wait_time(&self, now: DateTime<Utc>, grace: Duration) -> Duration {
        (self.reset - now).to_std().unwrap_or(Duration::ZERO) + grace
    }
}
