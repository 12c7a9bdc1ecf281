use std::collections::HashSet;

use anyhow::{Context, Result};
use url::Url;

use crate::generation::channel::ChannelKind;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: Url,
    /// Channels that refuse to submit without an uploaded resume.
    pub resume_required: HashSet<ChannelKind>,
    pub session_id: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let base = std::env::var("RESUME_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let channels = std::env::var("RESUME_REQUIRED_CHANNELS").unwrap_or_default();

        Ok(Config {
            api_base_url: Url::parse(&base)
                .with_context(|| format!("RESUME_API_BASE_URL '{base}' is not a valid URL"))?,
            resume_required: parse_channel_list(&channels)?,
            session_id: std::env::var("RESUME_SESSION_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            resume_required: HashSet::new(),
            session_id: None,
            rust_log: "info".to_string(),
        }
    }
}

/// Parses `description,link,template` (any subset, any order, blanks ignored).
fn parse_channel_list(raw: &str) -> Result<HashSet<ChannelKind>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            ChannelKind::parse(s)
                .with_context(|| format!("RESUME_REQUIRED_CHANNELS: unknown channel '{s}'"))
        })
        .collect()
}
