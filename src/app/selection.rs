//! Remembers the selected conversation between runs.

use color_eyre::{eyre::WrapErr, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::APP_DIR;

const SELECTION_FILE: &str = "selection.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSelection {
    conversation_id: String,
}

/// File-backed store for the selected conversation id.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    /// Store at `~/.parley/selection.json`, or `None` without a home directory.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::with_path(home.join(APP_DIR)))
    }

    /// Store its file under `dir`.
    pub fn with_path(dir: PathBuf) -> Self {
        Self {
            path: dir.join(SELECTION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The remembered conversation id, if any.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .wrap_err(format!("Failed to read selection from {:?}", self.path))?;
        let stored: StoredSelection =
            serde_json::from_str(&json).wrap_err("Failed to deserialize selection")?;
        Ok(Some(stored.conversation_id).filter(|id| !id.is_empty()))
    }

    /// Remember `conversation_id`, or forget the selection when `None`.
    pub fn save(&self, conversation_id: Option<&str>) -> Result<()> {
        let Some(conversation_id) = conversation_id else {
            return self.clear();
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).wrap_err("Failed to create app directory")?;
        }
        let json = serde_json::to_string(&StoredSelection {
            conversation_id: conversation_id.to_string(),
        })
        .wrap_err("Failed to serialize selection")?;
        fs::write(&self.path, json)
            .wrap_err(format!("Failed to write selection to {:?}", self.path))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).wrap_err(format!("Failed to remove {:?}", self.path)),
        }
    }
}
