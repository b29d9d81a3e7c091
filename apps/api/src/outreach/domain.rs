//! Domain Resolver: turns a company name into an internet domain.
//!
//! Asks the provider's company-domain search first and falls back to a slug
//! guess (`<name>.com`) on any failure. Resolution never fails.

use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::outreach::poller::{poll_task, PollBudget, PollError};
use crate::outreach::text::ascii_slug;
use crate::provider::ContactProvider;

/// Suffixes that are always a legal designator.
const DESIGNATOR_SUFFIXES: &[&str] = &["inc", "llc", "ltd"];
/// Suffixes that are often part of the brand; only stripped when written as a
/// designator ("Acme, Corp" or "Acme Co.").
const AMBIGUOUS_SUFFIXES: &[&str] = &["corp", "company", "co"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSource {
    /// Supplied by the caller.
    Explicit,
    /// Returned by the provider's company-domain search.
    Provider,
    /// Guessed from the company name.
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDomain {
    pub domain: String,
    pub source: DomainSource,
}

/// Resolves `company` to a domain. Provider failures are logged and absorbed.
pub async fn resolve_domain(
    provider: &dyn ContactProvider,
    token: &str,
    company: &str,
    budget: PollBudget,
) -> ResolvedDomain {
    match lookup_domain(provider, token, company, budget).await {
        Ok(Some(domain)) => {
            info!("Resolved domain for '{company}' via provider: {domain}");
            ResolvedDomain {
                domain,
                source: DomainSource::Provider,
            }
        }
        Ok(None) => {
            let domain = heuristic_domain(company);
            warn!("No provider domain match for '{company}', guessing {domain}");
            ResolvedDomain {
                domain,
                source: DomainSource::Heuristic,
            }
        }
        Err(e) => {
            let domain = heuristic_domain(company);
            warn!("Domain search for '{company}' failed ({e}), guessing {domain}");
            ResolvedDomain {
                domain,
                source: DomainSource::Heuristic,
            }
        }
    }
}

async fn lookup_domain(
    provider: &dyn ContactProvider,
    token: &str,
    company: &str,
    budget: PollBudget,
) -> Result<Option<String>, PollError> {
    let task = provider.start_company_domain_search(token, company).await?;
    let result = poll_task(budget, || provider.company_domain_result(token, &task)).await?;

    let wanted = company.trim().to_lowercase();
    debug!(
        "Company domain search returned {} entries for '{company}'",
        result.data.len()
    );

    Ok(result
        .data
        .into_iter()
        .find(|entry| entry.name.trim().to_lowercase() == wanted)
        .and_then(|entry| entry.result)
        .and_then(|m| m.domain)
        .and_then(|d| normalize_domain(&d)))
}

/// Deterministic `<slug>.com` guess for a company name.
pub fn heuristic_domain(company: &str) -> String {
    let slug = ascii_slug(strip_legal_designator(company));
    let slug = if slug.is_empty() {
        ascii_slug(company)
    } else {
        slug
    };
    format!("{slug}.com")
}

/// Removes a trailing legal designator ("Acme, Inc." → "Acme").
fn strip_legal_designator(name: &str) -> &str {
    let trimmed = name.trim();
    let Some(idx) = trimmed.rfind(|c: char| c.is_whitespace() || c == ',') else {
        return trimmed;
    };

    let (head, tail) = trimmed.split_at(idx);
    let mut tail_chars = tail.chars();
    let separator = tail_chars.next().unwrap_or(' ');
    let token = tail_chars.as_str().trim();
    let bare = token.trim_end_matches('.').to_lowercase();
    let head = head.trim_end();

    let marked = separator == ',' || head.ends_with(',') || token.ends_with('.');
    let strip = DESIGNATOR_SUFFIXES.contains(&bare.as_str())
        || (marked && AMBIGUOUS_SUFFIXES.contains(&bare.as_str()));

    if strip && !head.is_empty() {
        head.trim_end_matches(',').trim_end()
    } else {
        trimmed
    }
}

/// Normalizes a caller- or provider-supplied domain: drops scheme, path and
/// `www.`, lowercases. Returns `None` if nothing domain-like remains.
pub fn normalize_domain(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let host = Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))?;
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    if !host.contains('.') || host.starts_with('.') || host.ends_with('.') {
        return None;
    }
    Some(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use serde_json::json;
    use std::time::Duration;

    fn budget() -> PollBudget {
        PollBudget {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_heuristic_keeps_brand_suffix() {
        assert_eq!(heuristic_domain("Acme Corp"), "acmecorp.com");
        assert_eq!(heuristic_domain("Trading Co"), "tradingco.com");
    }

    #[test]
    fn test_heuristic_strips_designators() {
        assert_eq!(heuristic_domain("Acme, Inc."), "acme.com");
        assert_eq!(heuristic_domain("Acme Inc"), "acme.com");
        assert_eq!(heuristic_domain("Widgets LLC"), "widgets.com");
        assert_eq!(heuristic_domain("Globex Corp."), "globex.com");
        assert_eq!(heuristic_domain("Initech, Co"), "initech.com");
    }

    #[test]
    fn test_heuristic_strips_punctuation() {
        assert_eq!(heuristic_domain("  Ben & Jerry's  "), "benjerrys.com");
        assert_eq!(heuristic_domain("OpenAI"), "openai.com");
    }

    #[test]
    fn test_heuristic_lone_suffix_is_kept() {
        assert_eq!(heuristic_domain("Inc"), "inc.com");
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(
            normalize_domain("https://www.Example.com/careers").as_deref(),
            Some("example.com")
        );
        assert_eq!(normalize_domain("acme.io").as_deref(), Some("acme.io"));
        assert_eq!(normalize_domain("localhost"), None);
        assert_eq!(normalize_domain("  "), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_match_is_case_insensitive() {
        let provider = MockProvider::new()
            .with_domain_results(vec![
                json!({"status": "in_progress"}),
                json!({"status": "completed", "data": [
                    {"name": "Globex", "result": {"domain": "globex.com"}},
                    {"name": "ACME CORP", "result": {"domain": "www.acme.io"}}
                ]}),
            ]);

        let resolved = resolve_domain(&provider, "tok", "Acme Corp", budget()).await;

        assert_eq!(
            resolved,
            ResolvedDomain {
                domain: "acme.io".to_string(),
                source: DomainSource::Provider,
            }
        );
        assert_eq!(provider.domain_searches(), vec!["Acme Corp".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_match_falls_back_to_heuristic() {
        let provider = MockProvider::new().with_domain_results(vec![json!({
            "status": "completed",
            "data": [{"name": "Someone Else", "result": {"domain": "else.com"}}]
        })]);

        let resolved = resolve_domain(&provider, "tok", "Acme Corp", budget()).await;

        assert_eq!(resolved.domain, "acmecorp.com");
        assert_eq!(resolved.source, DomainSource::Heuristic);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_heuristic() {
        let provider = MockProvider::new().with_domain_results(vec![
            json!({"status": "in_progress"}),
            json!({"status": "in_progress"}),
            json!({"status": "in_progress"}),
        ]);

        let resolved = resolve_domain(&provider, "tok", "Initech", budget()).await;

        assert_eq!(resolved.domain, "initech.com");
        assert_eq!(resolved.source, DomainSource::Heuristic);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_and_missing_hash_fall_back() {
        let provider =
            MockProvider::new().with_domain_results(vec![json!({"status": "failed"})]);
        let resolved = resolve_domain(&provider, "tok", "Hooli", budget()).await;
        assert_eq!(resolved.source, DomainSource::Heuristic);

        let provider = MockProvider::new().failing_domain_start();
        let resolved = resolve_domain(&provider, "tok", "Hooli", budget()).await;
        assert_eq!(resolved.domain, "hooli.com");
        assert_eq!(resolved.source, DomainSource::Heuristic);
    }
}
