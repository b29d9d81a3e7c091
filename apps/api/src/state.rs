use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::outreach::discovery::DiscoverySettings;
use crate::outreach::poller::PollBudget;
use crate::provider::ContactProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Contact provider. Default: SnovClient. Tests swap in a scripted double.
    pub provider: Arc<dyn ContactProvider>,
    pub llm: LlmClient,
    /// Poll budgets, shortlist cap and scoring tables for discovery runs.
    pub discovery: DiscoverySettings,
    /// Wider budget for the per-contact email search.
    pub resolution_poll: PollBudget,
}
