//! deck-tools: external collaborators for agentdeck
//!
//! Reference-page fetching with visible-text extraction, and the per-agent
//! JSON definition store.

pub mod store;
pub mod web;

pub use store::{sanitize_name, AgentStore};
pub use web::{visible_text, PageFetcher};
