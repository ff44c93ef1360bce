use serde::{Deserialize, Serialize};

/// One entry in the discussion: which agent spoke and what it said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub text: String,
}

/// The append-only record of all agent responses in a session.
///
/// Turns are never rewritten once pushed; readers only ever take a bounded
/// trailing window of the rendered text back into a new prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: impl Into<String>, text: impl Into<String>) {
        self.turns.push(Turn {
            speaker: speaker.into(),
            text: text.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Render the whole discussion as speaker-prefixed paragraphs.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.speaker, turn.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The last `max_chars` characters of the rendered discussion.
    ///
    /// The cap always drops the oldest content, never the most recent, and
    /// no truncation marker is inserted. Counted in characters so multi-byte
    /// text is never split.
    pub fn tail(&self, max_chars: usize) -> String {
        let rendered = self.render();
        let total = rendered.chars().count();
        if total <= max_chars {
            return rendered;
        }
        rendered.chars().skip(total - max_chars).collect()
    }
}
