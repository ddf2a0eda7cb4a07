//! Event bus configuration.

use crate::error::{DispatchError, DispatchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default cap on subscribers per event type
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 64;

/// Configuration for [`crate::EventBus`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// Stop delivering an event at the first failing subscriber
    pub fail_fast: bool,
    /// Include the causal chain in dispatch logs
    pub log_chains: bool,
    /// Maximum subscribers for a single event type
    pub max_subscribers_per_event: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            log_chains: true,
            max_subscribers_per_event: DEFAULT_MAX_SUBSCRIBERS,
        }
    }
}

impl BusConfig {
    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Config`] on malformed JSON or invalid values
    pub fn from_json(json: &str) -> DispatchResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DispatchError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Config`] if the file cannot be read or is invalid
    pub fn from_file(path: impl AsRef<Path>) -> DispatchResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DispatchError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Check values
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Config`] if a value is out of range
    pub fn validate(&self) -> DispatchResult<()> {
        if self.max_subscribers_per_event == 0 {
            return Err(DispatchError::config(
                "max_subscribers_per_event must be at least 1",
            ));
        }
        Ok(())
    }

    /// Set fail-fast delivery
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the subscriber cap
    #[must_use]
    pub fn with_max_subscribers(mut self, limit: usize) -> Self {
        self.max_subscribers_per_event = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BusConfig::default();
        assert!(!config.fail_fast);
        assert!(config.log_chains);
        assert_eq!(config.max_subscribers_per_event, DEFAULT_MAX_SUBSCRIBERS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = BusConfig::from_json(r#"{"fail_fast": true}"#).unwrap();
        assert!(config.fail_fast);
        assert!(config.log_chains);
    }

    #[test]
    fn test_from_json_rejects_unknown_and_invalid() {
        assert!(BusConfig::from_json(r#"{"retries": 3}"#).is_err());
        assert!(BusConfig::from_json("not json").is_err());

        let err = BusConfig::from_json(r#"{"max_subscribers_per_event": 0}"#).unwrap_err();
        assert!(matches!(err, DispatchError::Config { .. }));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"log_chains": false, "max_subscribers_per_event": 2}}"#).unwrap();

        let config = BusConfig::from_file(file.path()).unwrap();
        assert!(!config.log_chains);
        assert_eq!(config.max_subscribers_per_event, 2);

        assert!(BusConfig::from_file("/nonexistent/causa.json").is_err());
    }
}
