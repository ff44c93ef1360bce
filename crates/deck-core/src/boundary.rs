//! Boundary traits for the two external collaborators: the completion API
//! and the reference-page fetcher. Both are single-shot calls with no retry
//! or backoff anywhere in the pipeline.

use async_trait::async_trait;

use crate::Result;

/// The external LLM text-generation service.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Send one prompt on behalf of `agent_name` and return the reply text.
    ///
    /// The credential is resolved per call; implementations must not cache
    /// it across calls.
    async fn send(&self, agent_name: &str, prompt: &str, api_key: &str) -> Result<String>;
}

/// Fetches a reference page and extracts its visible text.
#[async_trait]
pub trait ReferenceFetcher: Send + Sync {
    /// Errors map to [`Error::ReferenceFetch`](crate::Error::ReferenceFetch);
    /// the prompt builder treats any failure as "no content".
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
