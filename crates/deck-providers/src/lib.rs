//! deck-providers: Completion API implementations for agentdeck
//!
//! This crate provides implementations of the `Completion` boundary trait
//! for OpenAI-compatible chat APIs.

pub mod groq;

pub use groq::GroqCompletion;
