//! Per-agent JSON persistence.
//!
//! Each agent definition lives in its own JSON document under the agents
//! directory, keyed by a sanitized file name. Downloads are surfaced as
//! base64 data links, matching what a browser front-end would embed.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::warn;

use deck_core::{Agent, Error, Result};

/// File-name key for an agent: non-alphanumerics stripped (whitespace
/// kept), lowercased, spaces mapped to underscores.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .replace(' ', "_")
}

pub struct AgentStore {
    dir: PathBuf,
}

impl AgentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_name(name)))
    }

    /// Write the agent's definition, creating the directory if needed.
    pub fn save(&self, agent: &Agent) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Store(format!("create {}: {e}", self.dir.display())))?;
        let json = serde_json::to_string_pretty(agent)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        let path = self.path_for(&agent.name);
        fs::write(&path, json).map_err(|e| Error::Store(format!("write {}: {e}", path.display())))
    }

    /// Load every agent definition in the directory, sorted by file name.
    /// A missing directory is an empty roster; unreadable documents are
    /// skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<Agent>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Store(format!("read {}: {e}", self.dir.display()))),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut agents = Vec::new();
        for path in paths {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<Agent>(&content) {
                    Ok(agent) => agents.push(agent),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable agent document"),
                },
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable agent document"),
            }
        }
        Ok(agents)
    }

    /// Delete the agent's document. A missing file is not an error; the
    /// return value says whether anything was removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::Store(format!("remove {}: {e}", path.display()))),
        }
    }

    /// Build a base64 data link for the agent's saved document.
    pub fn download_link(&self, agent: &Agent) -> Result<String> {
        let path = self.path_for(&agent.name);
        let content = fs::read(&path)
            .map_err(|e| Error::Store(format!("read {}: {e}", path.display())))?;
        let encoded = STANDARD.encode(content);
        let file_name = format!("{}.json", sanitize_name(&agent.name));
        Ok(format!(
            "<a href=\"data:application/json;base64,{encoded}\" download=\"{file_name}\">Download {file_name}</a>"
        ))
    }
}
