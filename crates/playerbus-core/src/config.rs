use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Longest topic name, in bytes, a bus accepts unless configured otherwise.
pub const DEFAULT_MAX_TOPIC_LEN: usize = 256;

/// What `emit` does when a subscriber fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure, report it, keep notifying the remaining subscribers.
    #[default]
    Isolate,
    /// Abort the emission and hand the failure back to the emitter.
    Propagate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub failure_policy: FailurePolicy,
    pub log_failures: bool,
    pub max_topic_len: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            log_failures: true,
            max_topic_len: DEFAULT_MAX_TOPIC_LEN,
        }
    }
}

impl BusConfig {
    pub fn from_json_str(data: &str) -> CoreResult<Self> {
        let cfg: BusConfig = serde_json::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let cfg = Self::from_json_str(&data)?;
        tracing::debug!(
            path = %path.display(),
            policy = ?cfg.failure_policy,
            "bus config loaded"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.max_topic_len == 0 {
            return Err(CoreError::Config(
                "max_topic_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
