//! Scripted in-memory `ContactProvider` for tests.
//!
//! Result calls pop the next scripted JSON payload; once a script is exhausted
//! they keep answering `in_progress`. Every call is recorded.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{
    ContactProvider, DomainSearchResult, EmailSearchResult, ProspectSearchResult, ProviderError,
    TaskHandle,
};

#[derive(Default)]
struct Script {
    domain_results: VecDeque<Value>,
    prospect_results: VecDeque<Value>,
    email_results: VecDeque<Value>,
    fail_domain_start: bool,
    fail_prospect_start: bool,
    fail_email_start: bool,
    fail_email_result: bool,
}

#[derive(Default)]
struct Calls {
    tokens_issued: u32,
    domain_searches: Vec<String>,
    domain_polls: u32,
    prospect_domains: Vec<String>,
    prospect_positions: Vec<Vec<String>>,
    prospect_polls: u32,
    email_search_urls: Vec<String>,
    email_polls: u32,
}

#[derive(Default)]
pub struct MockProvider {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain_results(self, results: Vec<Value>) -> Self {
        self.script.lock().unwrap().domain_results = results.into();
        self
    }

    pub fn with_prospect_results(self, results: Vec<Value>) -> Self {
        self.script.lock().unwrap().prospect_results = results.into();
        self
    }

    pub fn with_email_results(self, results: Vec<Value>) -> Self {
        self.script.lock().unwrap().email_results = results.into();
        self
    }

    pub fn failing_domain_start(self) -> Self {
        self.script.lock().unwrap().fail_domain_start = true;
        self
    }

    pub fn failing_prospect_start(self) -> Self {
        self.script.lock().unwrap().fail_prospect_start = true;
        self
    }

    pub fn failing_email_start(self) -> Self {
        self.script.lock().unwrap().fail_email_start = true;
        self
    }

    pub fn failing_email_result(self) -> Self {
        self.script.lock().unwrap().fail_email_result = true;
        self
    }

    pub fn tokens_issued(&self) -> u32 {
        self.calls.lock().unwrap().tokens_issued
    }

    pub fn domain_searches(&self) -> Vec<String> {
        self.calls.lock().unwrap().domain_searches.clone()
    }

    pub fn domain_polls(&self) -> u32 {
        self.calls.lock().unwrap().domain_polls
    }

    pub fn prospect_domains(&self) -> Vec<String> {
        self.calls.lock().unwrap().prospect_domains.clone()
    }

    pub fn prospect_positions(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().prospect_positions.clone()
    }

    pub fn prospect_polls(&self) -> u32 {
        self.calls.lock().unwrap().prospect_polls
    }

    pub fn email_search_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().email_search_urls.clone()
    }

    pub fn email_polls(&self) -> u32 {
        self.calls.lock().unwrap().email_polls
    }

    fn next<T: DeserializeOwned>(queue: &mut VecDeque<Value>) -> T {
        let payload = queue
            .pop_front()
            .unwrap_or_else(|| json!({"status": "in_progress"}));
        serde_json::from_value(payload).unwrap()
    }

    fn scripted_failure() -> ProviderError {
        ProviderError::Api {
            status: 500,
            body: "scripted failure".to_string(),
        }
    }
}

#[async_trait]
impl ContactProvider for MockProvider {
    async fn issue_access_token(&self) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().tokens_issued += 1;
        Ok("minted-token".to_string())
    }

    async fn start_company_domain_search(
        &self,
        _token: &str,
        company: &str,
    ) -> Result<TaskHandle, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .domain_searches
            .push(company.to_string());
        if self.script.lock().unwrap().fail_domain_start {
            return Err(ProviderError::MissingTaskHash {
                operation: "company-domain-by-name",
            });
        }
        Ok(TaskHandle("domain-task".to_string()))
    }

    async fn company_domain_result(
        &self,
        _token: &str,
        _task: &TaskHandle,
    ) -> Result<DomainSearchResult, ProviderError> {
        self.calls.lock().unwrap().domain_polls += 1;
        Ok(Self::next(&mut self.script.lock().unwrap().domain_results))
    }

    async fn start_prospect_search(
        &self,
        _token: &str,
        domain: &str,
        positions: &[String],
    ) -> Result<TaskHandle, ProviderError> {
        {
            let mut calls = self.calls.lock().unwrap();
            calls.prospect_domains.push(domain.to_string());
            calls.prospect_positions.push(positions.to_vec());
        }
        if self.script.lock().unwrap().fail_prospect_start {
            return Err(Self::scripted_failure());
        }
        Ok(TaskHandle("prospect-task".to_string()))
    }

    async fn prospect_result(
        &self,
        _token: &str,
        _task: &TaskHandle,
    ) -> Result<ProspectSearchResult, ProviderError> {
        self.calls.lock().unwrap().prospect_polls += 1;
        Ok(Self::next(&mut self.script.lock().unwrap().prospect_results))
    }

    async fn start_email_search(
        &self,
        _token: &str,
        search_emails_url: &str,
    ) -> Result<TaskHandle, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .email_search_urls
            .push(search_emails_url.to_string());
        if self.script.lock().unwrap().fail_email_start {
            return Err(Self::scripted_failure());
        }
        Ok(TaskHandle("email-task".to_string()))
    }

    async fn email_search_result(
        &self,
        _token: &str,
        _task: &TaskHandle,
    ) -> Result<EmailSearchResult, ProviderError> {
        self.calls.lock().unwrap().email_polls += 1;
        if self.script.lock().unwrap().fail_email_result {
            return Err(Self::scripted_failure());
        }
        Ok(Self::next(&mut self.script.lock().unwrap().email_results))
    }
}
