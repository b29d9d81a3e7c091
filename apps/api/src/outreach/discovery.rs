//! Contact Discovery: finds, scores and shortlists contacts at a company.
//!
//! Flow: resolve domain → start prospects search → poll → normalize emails →
//! build contacts → score + select → usage accounting.
//!
//! Domain resolution failures are absorbed by the resolver's heuristic.
//! Prospect search failures surface as `DiscoveryError::ProspectSearch`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::outreach::contact::{Contact, CreditLedger, EmailSource, UsageStats};
use crate::outreach::domain::{
    normalize_domain, resolve_domain, DomainSource, ResolvedDomain,
};
use crate::outreach::emails::{best_email, email_confidence, normalize_emails, ExtractionStage};
use crate::outreach::poller::{poll_task, PollBudget, PollError};
use crate::outreach::scoring::{ScoringTables, ScoringTarget, ScoringWeights};
use crate::outreach::selector::select_contacts;
use crate::provider::{ContactProvider, RawProspect};

const UNKNOWN_POSITION: &str = "Unknown Position";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Either a domain or a company name is required")]
    MissingTarget,

    #[error("Prospect search for {domain} failed: {source}")]
    ProspectSearch {
        domain: String,
        #[source]
        source: PollError,
    },
}

/// Inputs to one discovery run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub job_location: Option<String>,
    /// Only the first entry is used, as the title-scoring signal. The provider
    /// search itself runs unfiltered.
    #[serde(default)]
    pub positions: Vec<String>,
}

impl DiscoveryRequest {
    /// True when a domain or a company name is present.
    pub fn has_target(&self) -> bool {
        non_blank(self.domain.as_deref()).is_some() || non_blank(self.company.as_deref()).is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    pub discovery_id: Uuid,
    pub domain: ResolvedDomain,
    pub contacts: Vec<Contact>,
    pub usage: UsageStats,
}

/// Budgets, caps and tables for discovery.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub domain_poll: PollBudget,
    pub prospect_poll: PollBudget,
    pub max_contacts: usize,
    pub tables: Arc<ScoringTables>,
    pub weights: ScoringWeights,
}

pub async fn find_contacts(
    provider: &dyn ContactProvider,
    request: &DiscoveryRequest,
    token: &str,
    settings: &DiscoverySettings,
) -> Result<DiscoveryResult, DiscoveryError> {
    if !request.has_target() {
        return Err(DiscoveryError::MissingTarget);
    }
    let explicit_domain = non_blank(request.domain.as_deref());
    let company = non_blank(request.company.as_deref());

    let discovery_id = Uuid::new_v4();
    let mut ledger = CreditLedger::default();

    // Step 1: Resolve domain
    let resolved = match (explicit_domain, company) {
        (Some(domain), _) => ResolvedDomain {
            domain: normalize_domain(domain).unwrap_or_else(|| domain.to_lowercase()),
            source: DomainSource::Explicit,
        },
        (None, Some(company)) => {
            ledger.charge("company-domain-by-name");
            resolve_domain(provider, token, company, settings.domain_poll).await
        }
        (None, None) => return Err(DiscoveryError::MissingTarget),
    };
    info!(
        %discovery_id,
        "Discovering contacts at {} ({:?})", resolved.domain, resolved.source
    );

    // Step 2: Prospects search (unfiltered; positions only feed scoring)
    let prospects = search_prospects(provider, token, &resolved.domain, settings, &mut ledger)
        .await
        .map_err(|source| DiscoveryError::ProspectSearch {
            domain: resolved.domain.clone(),
            source,
        })?;
    let total_found = prospects.len();
    debug!(%discovery_id, "Provider returned {total_found} prospects");

    // Step 3: Normalize into contacts
    let candidates: Vec<Contact> = prospects
        .into_iter()
        .map(|p| build_contact(p, &resolved.domain))
        .collect();

    // Step 4: Score and select
    let target = ScoringTarget {
        job_location: non_blank(request.job_location.as_deref()).map(str::to_string),
        job_title: request
            .positions
            .first()
            .and_then(|p| non_blank(Some(p.as_str())))
            .map(str::to_string),
        company: company.map(str::to_string),
        domain: Some(resolved.domain.clone()),
    };
    let contacts = select_contacts(
        candidates,
        &target,
        &settings.tables,
        &settings.weights,
        settings.max_contacts,
    );

    let usage = UsageStats {
        credits_used: ledger.used(),
        total_found,
        location_filtered: total_found,
        final_selected: contacts.len(),
    };
    info!(
        %discovery_id,
        "Selected {} of {} contacts ({} credits)",
        usage.final_selected, usage.total_found, usage.credits_used
    );

    Ok(DiscoveryResult {
        discovery_id,
        domain: resolved,
        contacts,
        usage,
    })
}

async fn search_prospects(
    provider: &dyn ContactProvider,
    token: &str,
    domain: &str,
    settings: &DiscoverySettings,
    ledger: &mut CreditLedger,
) -> Result<Vec<RawProspect>, PollError> {
    ledger.charge("domain-search/prospects");
    let task = provider.start_prospect_search(token, domain, &[]).await?;
    let result = poll_task(settings.prospect_poll, || provider.prospect_result(token, &task)).await?;
    Ok(result.data)
}

/// Builds a candidate from a raw prospect. Without a direct email the contact
/// stays unresolved and keeps the provider's follow-up search URL.
fn build_contact(prospect: RawProspect, company_domain: &str) -> Contact {
    let records = prospect
        .email_payload()
        .map(normalize_emails)
        .unwrap_or_default();

    let display_name = prospect.display_name().map(str::to_string);
    let linkedin_url = prospect.profile_url().map(str::to_string);

    let first_name = clean(prospect.first_name);
    let last_name = clean(prospect.last_name);
    let full_name = display_name
        .unwrap_or_else(|| format!("{first_name} {last_name}").trim().to_string());
    let position = match clean(prospect.position) {
        p if !p.is_empty() => p,
        _ => UNKNOWN_POSITION.to_string(),
    };

    let mut contact = Contact {
        first_name,
        last_name,
        full_name,
        position,
        location: clean(prospect.location),
        linkedin_url,
        company_domain: company_domain.to_string(),
        company: clean(prospect.company),
        domain: clean(prospect.domain),
        ..Default::default()
    };

    match best_email(&records) {
        Some(best) => {
            contact.email = best.email.clone();
            contact.confidence = email_confidence(best, ExtractionStage::Discovery);
            contact.email_status = Some(best.status.clone());
            contact.email_source = EmailSource::Provider;
        }
        None => {
            contact.search_emails_url = prospect
                .search_emails_start
                .filter(|u| !u.trim().is_empty());
        }
    }

    contact
}

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
