//! deck-core: Core types and traits for agentdeck
//!
//! This crate provides the session data model (agents, transcript, shared
//! state), the outbound prompt builder, and the interaction orchestrator
//! that drives one agent "turn" against a completion API.

pub mod agent;
pub mod boundary;
pub mod error;
pub mod interaction;
pub mod prompt;
pub mod session;
pub mod transcript;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use agent::Agent;
pub use boundary::{Completion, ReferenceFetcher};
pub use error::Error;
pub use interaction::{regenerate_description, run_interaction};
pub use prompt::{build_prompt, PromptInputs, TAIL_CHARS};
pub use session::{RequestContext, SessionState};
pub use transcript::{Transcript, Turn};

pub type Result<T> = std::result::Result<T, Error>;
