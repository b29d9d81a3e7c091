//! Axum route handlers for the Outreach API.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::outreach::contact::Contact;
use crate::outreach::discovery::{find_contacts, DiscoveryError, DiscoveryRequest, DiscoveryResult};
use crate::outreach::draft::{draft_email, DraftRequest, DraftResponse};
use crate::outreach::resolution::resolve_contact_email;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindContactsRequest {
    #[serde(flatten)]
    pub discovery: DiscoveryRequest,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveContactRequest {
    pub contact: Contact,
    #[serde(default)]
    pub access_token: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/outreach/contacts
///
/// Discovers and shortlists contacts at the target company.
pub async fn handle_find_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<FindContactsRequest>,
) -> Result<Json<DiscoveryResult>, AppError> {
    // Reject before a token is minted
    if !req.discovery.has_target() {
        return Err(DiscoveryError::MissingTarget.into());
    }

    let token = access_token(&state, req.access_token.as_deref(), &headers).await?;
    let result = find_contacts(
        state.provider.as_ref(),
        &req.discovery,
        &token,
        &state.discovery,
    )
    .await?;

    Ok(Json(result))
}

/// POST /api/v1/outreach/contacts/resolve
///
/// Finds an email for one contact. Always answers with a contact; a token is
/// only needed when the provider's email search will run.
pub async fn handle_resolve_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ResolveContactRequest>,
) -> Result<Json<Contact>, AppError> {
    let contact = req.contact;
    let needs_provider = !contact.is_resolved()
        && contact
            .search_emails_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());

    let token = if needs_provider {
        access_token(&state, req.access_token.as_deref(), &headers).await?
    } else {
        String::new()
    };

    let resolved =
        resolve_contact_email(state.provider.as_ref(), contact, &token, state.resolution_poll)
            .await;

    Ok(Json(resolved))
}

/// POST /api/v1/outreach/draft
///
/// Drafts a cold email to a resolved contact.
pub async fn handle_draft_email(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    let draft = draft_email(&state.llm, &req).await?;
    Ok(Json(draft))
}

// ────────────────────────────────────────────────────────────────────────────
// Access token
// ────────────────────────────────────────────────────────────────────────────

/// Body token, else `Authorization: Bearer`, else one minted from client
/// credentials. Missing credentials map to 401.
async fn access_token(
    state: &AppState,
    explicit: Option<&str>,
    headers: &HeaderMap,
) -> Result<String, AppError> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    if let Some(token) = bearer_token(headers) {
        return Ok(token);
    }

    debug!("No access token on request, minting one from client credentials");
    Ok(state.provider.issue_access_token().await?)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}
