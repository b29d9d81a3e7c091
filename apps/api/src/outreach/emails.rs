//! Email Normalizer: collapses the provider's inconsistent "emails" shapes into
//! a flat list of `EmailRecord`s and picks the best one.
//!
//! Accepted shapes (recursively):
//! - `null` / missing
//! - a bare address string
//! - an object with `email` | `address` | `value` | `emailAddress`, plus optional
//!   `smtp_status` | `status` | `verification_status` and `type`
//! - an array of any of the above
//! - `{ "emails": ... }` and `{ "data": { "emails": ... } }`
//!
//! The shapes are parsed once at the boundary into `EmailPayload`; business
//! logic only ever sees `EmailRecord`.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const UNKNOWN: &str = "unknown";

/// Confidence for a provider-verified address.
pub const VALID_EMAIL_CONFIDENCE: f64 = 0.95;
/// Confidence for an unverified address seen during discovery.
pub const DISCOVERY_EMAIL_CONFIDENCE: f64 = 0.8;
/// Confidence for an unverified address returned by a resolution task.
pub const RESOLUTION_EMAIL_CONFIDENCE: f64 = 0.75;

/// One normalized email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub email: String,
    pub status: String,
    #[serde(rename = "type")]
    pub email_type: String,
}

impl EmailRecord {
    pub fn is_valid(&self) -> bool {
        self.status.eq_ignore_ascii_case("valid")
    }

    pub fn is_work(&self) -> bool {
        self.email_type.eq_ignore_ascii_case("work")
    }
}

/// Where an address is being extracted. Drives the unverified confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Discovery,
    Resolution,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmailPayload {
    Address(String),
    List(Vec<EmailPayload>),
    Wrapped { emails: Box<EmailPayload> },
    Nested { data: Box<EmailPayload> },
    Entry(EmailEntry),
    Unrecognised(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
struct EmailEntry {
    #[serde(default)]
    email: Option<Value>,
    #[serde(default)]
    address: Option<Value>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default, rename = "emailAddress")]
    email_address: Option<Value>,
    #[serde(default)]
    smtp_status: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    verification_status: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
}

impl EmailEntry {
    fn into_record(self) -> Option<EmailRecord> {
        let email = [&self.email, &self.address, &self.value, &self.email_address]
            .into_iter()
            .find_map(non_empty_str)?;
        let status = [&self.smtp_status, &self.status, &self.verification_status]
            .into_iter()
            .find_map(non_empty_str)
            .unwrap_or(UNKNOWN);
        let email_type = non_empty_str(&self.kind).unwrap_or(UNKNOWN);

        Some(EmailRecord {
            email: email.to_string(),
            status: status.to_string(),
            email_type: email_type.to_string(),
        })
    }
}

impl EmailPayload {
    fn flatten_into(self, out: &mut Vec<EmailRecord>) {
        match self {
            EmailPayload::Address(address) => {
                let address = address.trim();
                if !address.is_empty() {
                    out.push(EmailRecord {
                        email: address.to_string(),
                        status: UNKNOWN.to_string(),
                        email_type: UNKNOWN.to_string(),
                    });
                }
            }
            EmailPayload::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            EmailPayload::Wrapped { emails } => emails.flatten_into(out),
            EmailPayload::Nested { data } => data.flatten_into(out),
            EmailPayload::Entry(entry) => out.extend(entry.into_record()),
            EmailPayload::Unrecognised(_) => {}
        }
    }
}

fn non_empty_str(value: &Option<Value>) -> Option<&str> {
    value
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Flattens any provider email payload into records with a non-empty address.
/// Unrecognised shapes yield an empty list.
pub fn normalize_emails(raw: &Value) -> Vec<EmailRecord> {
    let mut records = Vec::new();
    if let Ok(payload) = EmailPayload::deserialize(raw) {
        payload.flatten_into(&mut records);
    }
    records
}

/// Picks the best record: first `valid`, else first `work`, else first.
pub fn best_email(records: &[EmailRecord]) -> Option<&EmailRecord> {
    records
        .iter()
        .find(|r| r.is_valid())
        .or_else(|| records.iter().find(|r| r.is_work()))
        .or_else(|| records.first())
}

pub fn email_confidence(record: &EmailRecord, stage: ExtractionStage) -> f64 {
    if record.is_valid() {
        VALID_EMAIL_CONFIDENCE
    } else {
        match stage {
            ExtractionStage::Discovery => DISCOVERY_EMAIL_CONFIDENCE,
            ExtractionStage::Resolution => RESOLUTION_EMAIL_CONFIDENCE,
        }
    }
}
