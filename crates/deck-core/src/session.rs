//! Shared per-session state, passed explicitly to each handler.
//!
//! There is exactly one logical writer at a time (one user, one command run
//! to completion), so the state carries no locking; callers enforce the
//! single-writer discipline by holding the `&mut`.

use crate::agent::Agent;
use crate::error::Error;
use crate::transcript::Transcript;
use crate::Result;

/// The per-interaction snapshot of the four request fields. Read from the
/// session at the start of an interaction and discarded afterwards; absent
/// fields default to the empty string.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_request: String,
    pub rephrased_request: String,
    pub user_input: String,
    pub reference_url: String,
}

/// Mutable session state: the roster, the discussion, UI selection and
/// edit flags, and the cached form fields the sidebar displays.
#[derive(Debug, Default)]
pub struct SessionState {
    pub agents: Vec<Agent>,
    pub transcript: Transcript,

    /// Index of the agent the user last interacted with. Valid only while
    /// the roster is unchanged; roster mutations reconcile it.
    pub selected: Option<usize>,
    pub form_agent_name: String,
    pub form_agent_description: String,

    pub user_request: String,
    pub rephrased_request: String,
    pub user_input: String,
    pub reference_url: String,

    pub show_edit: bool,
    pub edit_index: Option<usize>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&self, index: usize) -> Result<&Agent> {
        self.agents
            .get(index)
            .ok_or_else(|| Error::stale_selection(index, self.agents.len()))
    }

    pub fn agent_mut(&mut self, index: usize) -> Result<&mut Agent> {
        let len = self.agents.len();
        self.agents
            .get_mut(index)
            .ok_or_else(|| Error::stale_selection(index, len))
    }

    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    /// Remove an agent and reconcile outstanding indices: an index pointing
    /// at the removed slot is cleared, later indices shift down by one.
    pub fn remove_agent(&mut self, index: usize) -> Result<Agent> {
        if index >= self.agents.len() {
            return Err(Error::stale_selection(index, self.agents.len()));
        }
        let removed = self.agents.remove(index);
        self.selected = reconcile(self.selected, index);
        self.edit_index = reconcile(self.edit_index, index);
        if self.edit_index.is_none() {
            self.show_edit = false;
        }
        Ok(removed)
    }

    /// Snapshot the request fields for one interaction.
    pub fn request_context(&self) -> RequestContext {
        RequestContext {
            user_request: self.user_request.clone(),
            rephrased_request: self.rephrased_request.clone(),
            user_input: self.user_input.clone(),
            reference_url: self.reference_url.clone(),
        }
    }
}

fn reconcile(slot: Option<usize>, removed: usize) -> Option<usize> {
    match slot {
        Some(i) if i == removed => None,
        Some(i) if i > removed => Some(i - 1),
        other => other,
    }
}
