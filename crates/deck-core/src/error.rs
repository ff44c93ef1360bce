use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API key not found. Please enter your API key.")]
    MissingCredential,

    #[error("agent index {index} is stale (roster holds {len} agents)")]
    StaleSelection { index: usize, len: usize },

    #[error("failed to retrieve content from {url}: {message}")]
    ReferenceFetch { url: String, message: String },

    #[error("API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("completion returned no text")]
    EmptyCompletion,

    #[error("Store error: {0}")]
    Store(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn reference_fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ReferenceFetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn stale_selection(index: usize, len: usize) -> Self {
        Error::StaleSelection { index, len }
    }
}
