//! Email draft generation for a resolved contact.
//!
//! The LLM writes `{subject, body}`; this module builds the prompt, validates
//! the result and produces a `mailto:` compose link for the UI.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::form_urlencoded::byte_serialize;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::outreach::contact::{Contact, EmailSource};
use crate::outreach::prompts::{
    DRAFT_PROMPT_TEMPLATE, DRAFT_SYSTEM, GATEKEEPER_TONE, MANAGER_TONE, PEER_TONE,
};
use crate::outreach::selector::{bucket_for, ContactBucket};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftRequest {
    pub contact: Contact,
    pub job: JobDetails,
    pub profile: SenderProfile,
}

/// The LLM's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub subject: String,
    pub body: String,
    pub mailto_url: String,
    /// Echoed so the UI can warn before sending to a guessed address.
    pub recipient_confidence: f64,
    pub email_source: EmailSource,
}

/// Job descriptions are cut to this many characters before prompting.
const MAX_DESCRIPTION_CHARS: usize = 2000;

pub async fn draft_email(llm: &LlmClient, request: &DraftRequest) -> Result<DraftResponse, AppError> {
    validate_request(request)?;

    let contact = &request.contact;
    if contact.email_source == EmailSource::Placeholder {
        warn!(
            "Drafting email to placeholder address {} (confidence {:.2})",
            contact.email, contact.confidence
        );
    }

    let prompt = build_draft_prompt(request)?;
    let draft: EmailDraft = llm
        .call_json(&prompt, DRAFT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Email draft LLM call failed: {e}")))?;

    let subject = draft.subject.trim().to_string();
    let body = draft.body.trim().to_string();
    if subject.is_empty() || body.is_empty() {
        return Err(AppError::Llm(
            "Email draft came back with an empty subject or body".to_string(),
        ));
    }

    info!(
        "Drafted email to {} for {} at {}",
        contact.display_name(),
        request.job.title,
        request.job.company
    );

    Ok(DraftResponse {
        mailto_url: mailto_url(&contact.email, &subject, &body),
        subject,
        body,
        recipient_confidence: contact.confidence,
        email_source: contact.email_source,
    })
}

fn validate_request(request: &DraftRequest) -> Result<(), AppError> {
    if !request.contact.is_resolved() {
        return Err(AppError::Validation(
            "contact has no email address; resolve it first".to_string(),
        ));
    }
    if request.job.title.trim().is_empty() || request.job.company.trim().is_empty() {
        return Err(AppError::Validation(
            "job title and company are required".to_string(),
        ));
    }
    if request.profile.name.trim().is_empty() {
        return Err(AppError::Validation(
            "sender profile name is required".to_string(),
        ));
    }
    Ok(())
}

/// Fills the draft template. The recipient's email address is left out of the
/// prompt; the model only needs name and role.
fn build_draft_prompt(request: &DraftRequest) -> Result<String, AppError> {
    let contact = &request.contact;
    let recipient_json = serde_json::to_string_pretty(&serde_json::json!({
        "first_name": contact.first_name,
        "full_name": contact.display_name(),
        "position": contact.position,
        "location": contact.location,
    }))
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize recipient: {e}")))?;

    let mut job = request.job.clone();
    job.description = job
        .description
        .map(|d| d.chars().take(MAX_DESCRIPTION_CHARS).collect());
    let job_json = serde_json::to_string_pretty(&job)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize job: {e}")))?;

    let profile_json = serde_json::to_string_pretty(&request.profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;

    let tone_hint = match bucket_for(&contact.position) {
        ContactBucket::Manager => MANAGER_TONE,
        ContactBucket::Gatekeeper => GATEKEEPER_TONE,
        ContactBucket::Other => PEER_TONE,
    };

    Ok(DRAFT_PROMPT_TEMPLATE
        .replace("{recipient_json}", &recipient_json)
        .replace("{job_json}", &job_json)
        .replace("{profile_json}", &profile_json)
        .replace("{tone_hint}", tone_hint))
}

/// `mailto:` compose link with percent-encoded subject and body.
///
/// The form encoder writes spaces as `+`, which mail clients show literally,
/// so they are rewritten to `%20`. A literal `+` is already `%2B` by then.
pub fn mailto_url(to: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        encode_component(to.trim()).replace("%40", "@"),
        encode_component(subject),
        encode_component(body)
    )
}

fn encode_component(value: &str) -> String {
    byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
