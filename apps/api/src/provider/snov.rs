//! `SnovClient`: reqwest implementation of `ContactProvider`.
//!
//! All requests go to `base_url`, which is either the provider itself or the
//! same-origin proxy path in front of it. Start calls are form-encoded, result
//! calls are plain GETs; both carry the caller's bearer token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{
    AccessTokenResponse, ContactProvider, DomainSearchResult, EmailSearchResult,
    ProspectSearchResult, ProviderError, TaskHandle, TaskStartResponse,
};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct SnovClient {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl SnovClient {
    pub fn new(
        base_url: &str,
        credentials: Option<(String, String)>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Rebases a provider-issued URL onto `base_url` so follow-up calls go
    /// through the configured proxy. Relative paths are joined as-is.
    fn rebase(&self, provider_url: &str) -> String {
        match Url::parse(provider_url) {
            Ok(parsed) => {
                let mut path = parsed.path().to_string();
                if let Some(query) = parsed.query() {
                    path.push('?');
                    path.push_str(query);
                }
                self.endpoint(&path)
            }
            Err(_) if provider_url.starts_with('/') => self.endpoint(provider_url),
            Err(_) => self.endpoint(&format!("/{provider_url}")),
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn start_task(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<TaskHandle, ProviderError> {
        let body: TaskStartResponse = self.send_json(request).await?;
        let handle = body.into_handle(operation)?;
        debug!("Started provider task {operation}: {handle}");
        Ok(handle)
    }
}

#[async_trait]
impl ContactProvider for SnovClient {
    async fn issue_access_token(&self) -> Result<String, ProviderError> {
        let (client_id, client_secret) = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::MissingCredentials)?;

        let request = self
            .client
            .post(self.endpoint("/v1/oauth/access_token"))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ]);

        let token: AccessTokenResponse = self.send_json(request).await?;
        debug!(
            "Issued provider access token (expires_in={:?})",
            token.expires_in
        );
        Ok(token.access_token)
    }

    async fn start_company_domain_search(
        &self,
        token: &str,
        company: &str,
    ) -> Result<TaskHandle, ProviderError> {
        let request = self
            .client
            .post(self.endpoint("/v2/company-domain-by-name/start"))
            .bearer_auth(token)
            .form(&[("names[]", company)]);
        self.start_task(request, "company-domain-by-name").await
    }

    async fn company_domain_result(
        &self,
        token: &str,
        task: &TaskHandle,
    ) -> Result<DomainSearchResult, ProviderError> {
        let request = self
            .client
            .get(self.endpoint("/v2/company-domain-by-name/result"))
            .bearer_auth(token)
            .query(&[("task_hash", task.as_str())]);
        self.send_json(request).await
    }

    async fn start_prospect_search(
        &self,
        token: &str,
        domain: &str,
        positions: &[String],
    ) -> Result<TaskHandle, ProviderError> {
        let mut form: Vec<(&str, &str)> = vec![("domain", domain)];
        form.extend(positions.iter().map(|p| ("positions[]", p.as_str())));

        let request = self
            .client
            .post(self.endpoint("/v2/domain-search/prospects/start"))
            .bearer_auth(token)
            .form(&form);
        self.start_task(request, "domain-search/prospects").await
    }

    async fn prospect_result(
        &self,
        token: &str,
        task: &TaskHandle,
    ) -> Result<ProspectSearchResult, ProviderError> {
        let request = self
            .client
            .get(self.endpoint(&format!(
                "/v2/domain-search/prospects/result/{}",
                task.as_str()
            )))
            .bearer_auth(token);
        self.send_json(request).await
    }

    async fn start_email_search(
        &self,
        token: &str,
        search_emails_url: &str,
    ) -> Result<TaskHandle, ProviderError> {
        let request = self
            .client
            .post(self.rebase(search_emails_url))
            .bearer_auth(token);
        self.start_task(request, "prospects/search-emails").await
    }

    async fn email_search_result(
        &self,
        token: &str,
        task: &TaskHandle,
    ) -> Result<EmailSearchResult, ProviderError> {
        let request = self
            .client
            .get(self.endpoint(&format!(
                "/v2/domain-search/prospects/search-emails/result/{}",
                task.as_str()
            )))
            .bearer_auth(token);
        self.send_json(request).await
    }
}
