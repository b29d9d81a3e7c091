//! Contact data provider boundary.
//!
//! ARCHITECTURAL RULE: the outreach pipeline only talks to the provider through
//! the `ContactProvider` trait. `SnovClient` is the production implementation;
//! tests use the scripted double in `mock`.
//!
//! Every provider operation is task based: a "start" call returns a task hash,
//! and a "result" call is polled with that hash until it reports a terminal status.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::outreach::poller::{TaskPayload, TaskStatus};

pub mod snov;

#[cfg(test)]
pub mod mock;

pub use snov::SnovClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Provider returned no task hash for {operation}")]
    MissingTaskHash { operation: &'static str },

    #[error("No provider access token supplied and no client credentials configured")]
    MissingCredentials,
}

/// Opaque identifier of an asynchronous provider task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle(pub String);

impl TaskHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The provider surface used by domain resolution, discovery and email resolution.
///
/// Carried in `AppState` as `Arc<dyn ContactProvider>`. The access token is
/// always passed explicitly; implementations must not cache it.
#[async_trait]
pub trait ContactProvider: Send + Sync {
    /// Mints an access token from configured client credentials.
    async fn issue_access_token(&self) -> Result<String, ProviderError>;

    async fn start_company_domain_search(
        &self,
        token: &str,
        company: &str,
    ) -> Result<TaskHandle, ProviderError>;

    async fn company_domain_result(
        &self,
        token: &str,
        task: &TaskHandle,
    ) -> Result<DomainSearchResult, ProviderError>;

    async fn start_prospect_search(
        &self,
        token: &str,
        domain: &str,
        positions: &[String],
    ) -> Result<TaskHandle, ProviderError>;

    async fn prospect_result(
        &self,
        token: &str,
        task: &TaskHandle,
    ) -> Result<ProspectSearchResult, ProviderError>;

    async fn start_email_search(
        &self,
        token: &str,
        search_emails_url: &str,
    ) -> Result<TaskHandle, ProviderError>;

    async fn email_search_result(
        &self,
        token: &str,
        task: &TaskHandle,
    ) -> Result<EmailSearchResult, ProviderError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Body of a "start" call. The hash usually sits under `meta`, older endpoints
/// return it at the top level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStartResponse {
    #[serde(default)]
    pub task_hash: Option<String>,
    #[serde(default)]
    pub meta: Option<TaskMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskMeta {
    #[serde(default)]
    pub task_hash: Option<String>,
}

impl TaskStartResponse {
    pub fn into_handle(self, operation: &'static str) -> Result<TaskHandle, ProviderError> {
        self.meta
            .and_then(|m| m.task_hash)
            .or(self.task_hash)
            .filter(|h| !h.trim().is_empty())
            .map(TaskHandle)
            .ok_or(ProviderError::MissingTaskHash { operation })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainSearchResult {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<CompanyDomainEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyDomainEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub result: Option<CompanyDomainMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyDomainMatch {
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProspectSearchResult {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<RawProspect>,
}

/// A prospect record as the provider returns it. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProspect {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Older spelling of `full_name`; some records carry both.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// Profile page the prospect was found on, usually LinkedIn.
    #[serde(default)]
    pub source_page: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    /// Follow-up email search URL, present when no email came back directly.
    #[serde(default)]
    pub search_emails_start: Option<String>,
    #[serde(default)]
    pub emails: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

impl RawProspect {
    /// `full_name`, else `name`, skipping blanks.
    pub fn display_name(&self) -> Option<&str> {
        first_non_blank(&[&self.full_name, &self.name])
    }

    /// `linkedin_url`, else `source_page`, skipping blanks.
    pub fn profile_url(&self) -> Option<&str> {
        first_non_blank(&[&self.linkedin_url, &self.source_page])
    }

    /// Whichever of the two email fields the provider populated.
    pub fn email_payload(&self) -> Option<&Value> {
        self.emails
            .as_ref()
            .filter(|v| !v.is_null())
            .or(self.email.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailSearchResult {
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TaskPayload for DomainSearchResult {
    fn status(&self) -> &TaskStatus {
        &self.status
    }
}

impl TaskPayload for ProspectSearchResult {
    fn status(&self) -> &TaskStatus {
        &self.status
    }
}

impl TaskPayload for EmailSearchResult {
    fn status(&self) -> &TaskStatus {
        &self.status
    }
}

fn first_non_blank<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .filter_map(Option::as_deref)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
