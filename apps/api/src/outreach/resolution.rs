//! Email Resolution Step: finds an address for a contact the user picked.
//!
//! Flow: already resolved → no-op; provider email search (when a search URL is
//! present) → `first.last@domain` pattern → `contact@<slug>.com` placeholder.
//! Never fails: the outreach flow always gets some address, and `confidence`
//! plus `email_source` tell the caller how much to trust it.

use tracing::{info, warn};

use crate::outreach::contact::{Contact, EmailSource};
use crate::outreach::emails::{
    best_email, email_confidence, normalize_emails, EmailRecord, ExtractionStage,
};
use crate::outreach::fallback::{
    generate_fallback_email, placeholder_email, PATTERN_EMAIL_CONFIDENCE,
    PLACEHOLDER_EMAIL_CONFIDENCE,
};
use crate::outreach::poller::{poll_task, PollBudget, PollError};
use crate::provider::ContactProvider;

pub async fn resolve_contact_email(
    provider: &dyn ContactProvider,
    contact: Contact,
    token: &str,
    budget: PollBudget,
) -> Contact {
    if contact.is_resolved() {
        return contact;
    }

    let search_url = contact
        .search_emails_url
        .clone()
        .filter(|url| !url.trim().is_empty());
    let Some(search_url) = search_url else {
        return apply_fallback(contact);
    };

    match search_emails(provider, token, &search_url, budget).await {
        Ok(records) => match best_email(&records) {
            Some(best) => {
                info!(
                    "Resolved email for {} via provider (status={})",
                    contact.display_name(),
                    best.status
                );
                let confidence = email_confidence(best, ExtractionStage::Resolution);
                let status = best.status.clone();
                let mut resolved =
                    contact.resolve(best.email.clone(), confidence, EmailSource::Provider);
                resolved.email_status = Some(status);
                resolved
            }
            None => {
                warn!(
                    "Email search for {} returned no addresses, using fallback",
                    contact.display_name()
                );
                apply_fallback(contact)
            }
        },
        Err(e) => {
            warn!(
                "Email search for {} failed ({e}), using fallback",
                contact.display_name()
            );
            apply_fallback(contact)
        }
    }
}

async fn search_emails(
    provider: &dyn ContactProvider,
    token: &str,
    search_url: &str,
    budget: PollBudget,
) -> Result<Vec<EmailRecord>, PollError> {
    let task = provider.start_email_search(token, search_url).await?;
    let result = poll_task(budget, || provider.email_search_result(token, &task)).await?;
    Ok(normalize_emails(&result.data))
}

/// Pattern address when name and domain allow it, else the placeholder.
fn apply_fallback(contact: Contact) -> Contact {
    let pattern = generate_fallback_email(
        &contact.first_name,
        &contact.last_name,
        &contact.company_domain,
    );
    if !pattern.is_empty() {
        return contact.resolve(pattern, PATTERN_EMAIL_CONFIDENCE, EmailSource::Pattern);
    }

    let placeholder = placeholder_email(&contact);
    contact.resolve(
        placeholder,
        PLACEHOLDER_EMAIL_CONFIDENCE,
        EmailSource::Placeholder,
    )
}
