use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Ceiling on the number of paths extracted for a single stream event.
pub const DEFAULT_MAX_PATHS: usize = 100;

/// What to do when extraction stops at the path ceiling with flow left over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapPolicy {
    /// Emit the paths found so far, marked as a partial decomposition.
    #[default]
    Partial,
    /// Emit nothing and report `CapacityExceeded`.
    Reject,
}

impl FromStr for CapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partial" => Ok(CapPolicy::Partial),
            "reject" => Ok(CapPolicy::Reject),
            other => Err(format!(
                "unknown cap policy '{}', expected 'partial' or 'reject'",
                other
            )),
        }
    }
}

impl fmt::Display for CapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapPolicy::Partial => write!(f, "partial"),
            CapPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Tuning knobs for path reconstruction.
///
/// # Examples
///
/// ```
/// use stream_path_engine::core::config::{CapPolicy, ReconstructionConfig};
///
/// let config = ReconstructionConfig::from_json(r#"{ "cap_policy": "reject" }"#).unwrap();
/// assert_eq!(config.max_paths, 100);
/// assert_eq!(config.cap_policy, CapPolicy::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Maximum number of paths extracted per stream event.
    pub max_paths: usize,
    /// Treatment of decompositions that hit `max_paths`.
    pub cap_policy: CapPolicy,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            max_paths: DEFAULT_MAX_PATHS,
            cap_policy: CapPolicy::default(),
        }
    }
}

impl ReconstructionConfig {
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    pub fn with_cap_policy(mut self, cap_policy: CapPolicy) -> Self {
        self.cap_policy = cap_policy;
        self
    }

    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_paths == 0 {
            return Err(ConfigError::InvalidMaxPaths(self.max_paths));
        }
        Ok(())
    }
}
