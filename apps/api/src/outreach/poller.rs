//! Task Poller: drives an asynchronous provider task to a terminal status.
//!
//! The fetch closure is invoked up to `max_attempts` times. `completed` returns
//! the payload, `failed` raises immediately, anything else sleeps `delay` and
//! retries. There is no backoff growth and no cancellation token.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::provider::ProviderError;

/// Status reported by a provider task result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum TaskStatus {
    #[default]
    InProgress,
    Completed,
    Failed,
    /// Any status string the provider invents; treated as still pending.
    Other(String),
}

impl From<Option<String>> for TaskStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            None | Some("") | Some("in_progress") => TaskStatus::InProgress,
            Some("completed") => TaskStatus::Completed,
            Some("failed") => TaskStatus::Failed,
            Some(other) => TaskStatus::Other(other.to_string()),
        }
    }
}

/// Anything carrying a task status can be polled.
pub trait TaskPayload {
    fn status(&self) -> &TaskStatus;
}

/// Upper bound on polling for one use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub max_attempts: u32,
    pub delay: Duration,
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Provider task failed after {attempts} attempt(s)")]
    Failed { attempts: u32 },

    #[error("Provider task did not complete within {attempts} attempt(s)")]
    Timeout { attempts: u32 },
}

/// Polls `fetch` until it reports `completed`, `failed`, or the budget runs out.
///
/// Errors returned by `fetch` itself abort polling and are propagated.
pub async fn poll_task<T, F, Fut>(budget: PollBudget, mut fetch: F) -> Result<T, PollError>
where
    T: TaskPayload,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    for attempt in 1..=budget.max_attempts {
        let payload = fetch().await?;

        match payload.status() {
            TaskStatus::Completed => {
                debug!("Task completed on attempt {attempt}");
                return Ok(payload);
            }
            TaskStatus::Failed => return Err(PollError::Failed { attempts: attempt }),
            pending => {
                debug!(
                    "Task still pending ({:?}), attempt {}/{}",
                    pending, attempt, budget.max_attempts
                );
            }
        }

        if attempt < budget.max_attempts {
            tokio::time::sleep(budget.delay).await;
        }
    }

    Err(PollError::Timeout {
        attempts: budget.max_attempts,
    })
}
