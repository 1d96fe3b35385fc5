//! Configuration for the sync engine and the quake feed
//!
//! Every section deserializes from JSON with missing keys falling back to
//! the defaults in [`crate::core::constants`], so a config file only needs
//! to name what it changes.

use crate::core::constants::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_DISPLAYED_ENTITIES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_USER_AGENT, MAX_LOOKBACK_DAYS, USGS_QUERY_URL,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the ranking/reconciliation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Upper bound on markers kept after ranking a batch. Zero empties the map.
    pub max_displayed_entities: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_displayed_entities: DEFAULT_MAX_DISPLAYED_ENTITIES,
        }
    }
}

/// Where and how quakes are fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedConfig {
    pub base_url: String,
    /// Length of the time window ending at the moment of the request
    pub lookback_days: i64,
    /// Server-side magnitude floor, if any
    pub min_magnitude: Option<f64>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: USGS_QUERY_URL.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            min_magnitude: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FeedConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuakeMapConfig {
    pub sync: SyncConfig,
    pub feed: FeedConfig,
}

impl QuakeMapConfig {
    /// Parses and validates a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(Error::Serialization)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(Error::Io)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_json_str(&text)
    }

    /// Small limits and a short timeout
    pub fn for_testing() -> Self {
        Self {
            sync: SyncConfig {
                max_displayed_entities: 2,
            },
            feed: FeedConfig {
                lookback_days: 1,
                timeout_secs: 5,
                ..FeedConfig::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed.base_url.trim().is_empty() {
            return Err(Error::Config("feed.baseUrl must not be empty".to_string()).into());
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.feed.lookback_days) {
            return Err(Error::Config(format!(
                "feed.lookbackDays must be between 1 and {}, got {}",
                MAX_LOOKBACK_DAYS, self.feed.lookback_days
            ))
            .into());
        }
        if self.feed.timeout_secs == 0 {
            return Err(Error::Config("feed.timeoutSecs must be positive".to_string()).into());
        }
        if let Some(min) = self.feed.min_magnitude {
            if !min.is_finite() {
                return Err(Error::Config("feed.minMagnitude must be finite".to_string()).into());
            }
        }
        Ok(())
    }
}
