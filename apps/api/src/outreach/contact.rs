//! Candidate contacts and per-run credit accounting.

use serde::{Deserialize, Serialize};

/// Where a contact's email address came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailSource {
    /// Returned by the contact provider.
    Provider,
    /// Synthesized as `first.last@domain`.
    Pattern,
    /// Generic `contact@<slug>.com` placeholder.
    Placeholder,
    /// No address yet.
    #[default]
    None,
}

/// A candidate recruiting contact at the target company. Never persisted.
///
/// A contact is either resolved (`email` non-empty, no `search_emails_url`) or
/// unresolved (`email` empty). Resolution only ever moves forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position: String,
    pub location: String,
    pub linkedin_url: Option<String>,
    /// 0.0 – 1.0 data quality estimate
    pub confidence: f64,
    /// Verification status of the chosen provider email, if any.
    pub email_status: Option<String>,
    pub email_source: EmailSource,
    pub search_emails_url: Option<String>,
    pub company_domain: String,
    pub company: String,
    pub domain: String,
    /// Transient ranking score
    pub score: i32,
}

impl Contact {
    pub fn is_resolved(&self) -> bool {
        !self.email.is_empty()
    }

    /// Marks the contact resolved. A no-op if it already is.
    pub fn resolve(mut self, email: String, confidence: f64, source: EmailSource) -> Self {
        if self.is_resolved() || email.is_empty() {
            return self;
        }
        self.email = email;
        self.confidence = confidence;
        self.email_source = source;
        self.search_emails_url = None;
        self
    }

    /// Best human-readable name available.
    pub fn display_name(&self) -> String {
        if !self.full_name.trim().is_empty() {
            return self.full_name.trim().to_string();
        }
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Billable provider calls counted during one discovery run.
///
/// Display only; never reconciled against the provider's own billing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreditLedger {
    used: u32,
}

impl CreditLedger {
    pub fn charge(&mut self, operation: &str) {
        self.used += 1;
        tracing::debug!("Credit charged for {operation} (total {})", self.used);
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub credits_used: u32,
    pub total_found: usize,
    pub location_filtered: usize,
    pub final_selected: usize,
}
