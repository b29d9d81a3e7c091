use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::outreach::poller::PollBudget;
use crate::outreach::selector::MAX_CONTACTS_TO_RESOLVE;

pub const DEFAULT_SNOV_API_BASE: &str = "https://api.snov.io";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub snov_api_base: String,
    pub snov_client_id: Option<String>,
    pub snov_client_secret: Option<String>,
    pub domain_poll: PollBudget,
    pub discovery_poll: PollBudget,
    pub resolution_poll: PollBudget,
    pub max_contacts: usize,
    pub scoring_tables_path: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            snov_api_base: std::env::var("SNOV_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SNOV_API_BASE.to_string()),
            snov_client_id: optional_env("SNOV_CLIENT_ID"),
            snov_client_secret: optional_env("SNOV_CLIENT_SECRET"),
            domain_poll: poll_budget_env("DOMAIN_POLL", 5, 2000)?,
            discovery_poll: poll_budget_env("DISCOVERY_POLL", 10, 2000)?,
            resolution_poll: poll_budget_env("RESOLUTION_POLL", 20, 3000)?,
            max_contacts: parse_env("MAX_CONTACTS_TO_RESOLVE", MAX_CONTACTS_TO_RESOLVE)?,
            scoring_tables_path: optional_env("SCORING_TABLES_PATH"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Client credentials for minting provider tokens, when both halves are set.
    pub fn snov_credentials(&self) -> Option<(String, String)> {
        match (&self.snov_client_id, &self.snov_client_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn poll_budget_env(prefix: &str, attempts: u32, delay_ms: u64) -> Result<PollBudget> {
    Ok(PollBudget {
        max_attempts: parse_env(&format!("{prefix}_ATTEMPTS"), attempts)?,
        delay: Duration::from_millis(parse_env(&format!("{prefix}_DELAY_MS"), delay_ms)?),
    })
}
