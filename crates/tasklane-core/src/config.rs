//! Board configuration, loaded from TOML.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ColumnConfig, Result, default_columns};
use crate::impls::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Tasks per page fetch.
    pub page_size: u32,
    pub search_debounce_ms: u64,
    /// Pointer travel, in pixels, before a press becomes a drag.
    pub drag_activation_px: f64,
    /// Automatic retries for failed reads. Writes are never retried.
    pub read_retries: u32,
    pub retry_delay_ms: u64,
    pub allow_same_column_reorder: bool,
    pub columns: Vec<ColumnConfig>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            search_debounce_ms: 400,
            drag_activation_px: 5.0,
            read_retries: 1,
            retry_delay_ms: 200,
            allow_same_column_reorder: false,
            columns: default_columns(),
        }
    }
}

impl BoardConfig {
    /// Read `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading board config");
        if !path.exists() {
            debug!("config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        debug!(
            page_size = config.page_size,
            columns = config.columns.len(),
            "board config loaded"
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "board config saved");
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.read_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}
