//! Cold-email outreach: contact discovery, shortlist selection, email
//! resolution and draft generation.

pub mod contact;
pub mod discovery;
pub mod domain;
pub mod draft;
pub mod emails;
pub mod fallback;
pub mod handlers;
pub mod poller;
pub mod prompts;
pub mod resolution;
pub mod scoring;
pub mod selector;
pub mod text;
