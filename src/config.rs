use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::{
    aggregation::TimeWindow,
    error::{DeskError, Result},
};

/// Support desk configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeskConfig {
    /// Window the dashboard chart opens with
    pub default_window: TimeWindow,
    /// Categories offered on the ticket form
    pub categories: Vec<String>,
    /// When false, create operations validate and notify but never write
    pub persist_writes: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            default_window: TimeWindow::Weekly,
            categories: vec![
                "Technical Support".to_string(),
                "Billing".to_string(),
                "Account Management".to_string(),
                "Training".to_string(),
                "General Inquiry".to_string(),
            ],
            persist_writes: true,
        }
    }
}

impl DeskConfig {
    /// Loads configuration from a JSON file, falling back to defaults when the
    /// file does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        serde_json::from_str(&contents).map_err(|e| {
            let message = format!("{}: {}", path.display(), e);
            DeskError::ConfigError(message)
        })
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        let category = category.trim();
        self.categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}
