use serde::{Deserialize, Serialize};

/// A named persona, rendered into a prompt role when the user interacts
/// with it.
///
/// `pending_description` stages a regenerated description until the edit
/// form either commits or discards it; the committed `description` is what
/// interactions use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_description: Option<String>,
}

impl Agent {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            pending_description: None,
        }
    }

    /// Stage a candidate description without committing it.
    pub fn stage_description(&mut self, text: impl Into<String>) {
        self.pending_description = Some(text.into());
    }

    /// Promote the staged description, if any. Returns whether a commit
    /// happened.
    pub fn commit_pending(&mut self) -> bool {
        match self.pending_description.take() {
            Some(text) => {
                self.description = text;
                true
            }
            None => false,
        }
    }

    pub fn discard_pending(&mut self) {
        self.pending_description = None;
    }

    /// The description the edit form should display: the staged value when
    /// one exists, the committed one otherwise.
    pub fn display_description(&self) -> &str {
        self.pending_description
            .as_deref()
            .unwrap_or(&self.description)
    }
}
