//! Test doubles shared across the workspace.
//! Only compiled when running tests or with the `testing` feature.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::boundary::{Completion, ReferenceFetcher};
use crate::error::Error;
use crate::Result;

/// One captured `Completion::send` call.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub agent_name: String,
    pub prompt: String,
    pub api_key: String,
}

/// A completion API that returns pre-queued replies and records every call.
pub struct MockCompletion {
    replies: Mutex<Vec<Result<String>>>,
    calls: Mutex<Vec<CapturedCall>>,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply for the next `send` call (FIFO).
    pub fn queue_reply(&self, text: &str) {
        self.replies.lock().unwrap().insert(0, Ok(text.to_string()));
    }

    /// Queue an error for the next `send` call (FIFO).
    pub fn queue_error(&self, error: Error) {
        self.replies.lock().unwrap().insert(0, Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<CapturedCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Completion for MockCompletion {
    async fn send(&self, agent_name: &str, prompt: &str, api_key: &str) -> Result<String> {
        self.calls.lock().unwrap().push(CapturedCall {
            agent_name: agent_name.to_string(),
            prompt: prompt.to_string(),
            api_key: api_key.to_string(),
        });
        match self.replies.lock().unwrap().pop() {
            Some(reply) => reply,
            None => Err(Error::Network("no mock reply queued".to_string())),
        }
    }
}

/// A reference fetcher that serves pre-queued pages and records requested
/// URLs. With nothing queued, every fetch fails.
pub struct MockFetcher {
    pages: Mutex<Vec<Result<String>>>,
    urls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Queue extracted page text for the next fetch (FIFO).
    pub fn queue_page(&self, text: &str) {
        self.pages.lock().unwrap().insert(0, Ok(text.to_string()));
    }

    /// Queue a fetch failure for the next fetch (FIFO).
    pub fn queue_failure(&self, message: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(0, Err(Error::reference_fetch("queued", message)));
    }

    pub fn call_count(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReferenceFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.urls.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().pop() {
            Some(page) => page,
            None => Err(Error::reference_fetch(url, "no mock page queued")),
        }
    }
}
