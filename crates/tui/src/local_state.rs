use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_STATE_PATH: &str = "config/tui_state.json";

/// Per-backend local defaults, persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalState {
    pub defaults: Vec<DefaultsEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsEntry {
    pub base_url: String,
    pub default_account_id: Option<i64>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let parent = Path::new(path).parent();
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }

    pub fn default_account(&self, base_url: &str) -> Option<i64> {
        self.defaults
            .iter()
            .find(|entry| entry.base_url == base_url)
            .and_then(|entry| entry.default_account_id)
    }

    pub fn set_default_account(&mut self, base_url: &str, account_id: i64) {
        if let Some(entry) = self
            .defaults
            .iter_mut()
            .find(|entry| entry.base_url == base_url)
        {
            entry.default_account_id = Some(account_id);
            return;
        }

        self.defaults.push(DefaultsEntry {
            base_url: base_url.to_string(),
            default_account_id: Some(account_id),
        });
    }
}

pub fn default_state_path() -> &'static str {
    DEFAULT_STATE_PATH
}
