// src/state.rs
//! Durable seen-state: identity -> last-observed trending flag. This is the
//! entire persisted memory of the service; no timestamps, no post snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEntry {
    pub trending: bool,
}

/// Loaded once at startup, mutated in memory during a cycle, flushed by the
/// scheduler after a cycle that produced changes. Exclusively owned by the
/// scheduler; nothing else mutates it.
#[derive(Debug)]
pub struct SeenStore {
    entries: HashMap<String, SeenEntry>,
    path: PathBuf,
    dirty: bool,
}

impl SeenStore {
    /// A missing or unparsable file is not fatal: start with no history.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path).await {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(map) => {
                    tracing::debug!(path = %path.display(), "loaded seen-state");
                    map
                }
                Err(e) => {
                    tracing::warn!(error = ?e, path = %path.display(), "corrupt seen-state, starting fresh");
                    HashMap::new()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "no seen-state found, starting fresh");
                HashMap::new()
            }
        };
        Self {
            entries,
            path,
            dirty: false,
        }
    }

    #[cfg(test)]
    pub fn in_memory(path: impl AsRef<Path>) -> Self {
        Self {
            entries: HashMap::new(),
            path: path.as_ref().to_path_buf(),
            dirty: false,
        }
    }

    pub fn get(&self, identity: &str) -> Option<SeenEntry> {
        self.entries.get(identity).copied()
    }

    /// In-memory write; durability waits for `save`.
    pub fn record(&mut self, identity: &str, trending: bool) {
        self.entries
            .insert(identity.to_string(), SeenEntry { trending });
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whole-file overwrite. On failure the in-memory state stays
    /// authoritative and the dirty flag stays set for a later attempt.
    pub async fn save(&mut self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("creating state dir {}", dir.display()))?;
            }
        }
        let body = serde_json::to_vec(&self.entries).context("serializing seen-state")?;
        fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing seen-state to {}", self.path.display()))?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "saved seen-state");
        Ok(())
    }
}
