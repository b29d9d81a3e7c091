use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::outreach::discovery::DiscoveryError;
use crate::outreach::poller::PollError;
use crate::provider::ProviderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Provider(ProviderError::MissingCredentials) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "A provider access token is required".to_string(),
            ),
            AppError::Discovery(DiscoveryError::MissingTarget) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                DiscoveryError::MissingTarget.to_string(),
            ),
            AppError::Discovery(DiscoveryError::ProspectSearch {
                domain,
                source: PollError::Timeout { attempts },
            }) => {
                tracing::error!("Prospect search for {domain} timed out after {attempts} attempts");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "PROVIDER_TIMEOUT",
                    format!("The contact provider did not finish searching {domain} in time"),
                )
            }
            AppError::Discovery(e) => {
                tracing::error!("Discovery error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROVIDER_ERROR",
                    "The contact provider request failed".to_string(),
                )
            }
            AppError::Provider(e) => {
                tracing::error!("Provider error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROVIDER_ERROR",
                    "The contact provider request failed".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(AppError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DiscoveryError::MissingTarget.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ProviderError::MissingCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Llm("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_prospect_timeout_is_gateway_timeout() {
        let err = DiscoveryError::ProspectSearch {
            domain: "acme.com".to_string(),
            source: PollError::Timeout { attempts: 10 },
        };
        assert_eq!(status_of(err.into()), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_other_prospect_failures_are_bad_gateway() {
        let failed = DiscoveryError::ProspectSearch {
            domain: "acme.com".to_string(),
            source: PollError::Failed { attempts: 2 },
        };
        assert_eq!(status_of(failed.into()), StatusCode::BAD_GATEWAY);

        let api = ProviderError::Api {
            status: 403,
            body: "no credits".to_string(),
        };
        assert_eq!(status_of(api.into()), StatusCode::BAD_GATEWAY);
    }
}
