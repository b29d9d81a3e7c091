pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::outreach::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Outreach API
        .route(
            "/api/v1/outreach/contacts",
            post(handlers::handle_find_contacts),
        )
        .route(
            "/api/v1/outreach/contacts/resolve",
            post(handlers::handle_resolve_contact),
        )
        .route("/api/v1/outreach/draft", post(handlers::handle_draft_email))
        .with_state(state)
}
