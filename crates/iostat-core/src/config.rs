//! Agent configuration.

use std::fmt;
use std::time::Duration;

use crate::agent::oid::Oid;
use crate::collector::iostat::DEFAULT_PROGRAM;

/// Default root of the exposed subtree (`experimental.1`).
pub const DEFAULT_ROOT: &str = "1.3.6.1.3.1";

/// Configuration shared by the sampler and the responder.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Root OID the device table is registered under.
    pub root: Oid,
    /// Window each `iostat` measurement covers. Default: 5s.
    pub sample_window: Duration,
    /// Interval between measurements. Default: 10s.
    pub repeat_interval: Duration,
    /// Snapshots older than this are not served. Default: 60s.
    pub max_age: Duration,
    /// Minimum interval between OID tree rebuilds. Default: 3s.
    pub rebuild_throttle: Duration,
    /// Path or name of the `iostat` binary.
    pub program: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            root: Oid::new(vec![1, 3, 6, 1, 3, 1]),
            sample_window: Duration::from_secs(5),
            repeat_interval: Duration::from_secs(10),
            max_age: Duration::from_secs(60),
            rebuild_throttle: Duration::from_secs(3),
            program: DEFAULT_PROGRAM.to_string(),
        }
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyRoot,
    ZeroInterval(&'static str),
    EmptyProgram,
    /// The rebuild throttle must be shorter than the staleness threshold.
    ThrottleNotBelowMaxAge {
        throttle: Duration,
        max_age: Duration,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyRoot => write!(f, "root OID must not be empty"),
            ConfigError::ZeroInterval(name) => write!(f, "{} must be greater than zero", name),
            ConfigError::EmptyProgram => write!(f, "iostat program must not be empty"),
            ConfigError::ThrottleNotBelowMaxAge { throttle, max_age } => write!(
                f,
                "rebuild throttle ({:?}) must be shorter than max age ({:?})",
                throttle, max_age
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AgentConfig {
    /// Checks value ranges. Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.is_empty() {
            return Err(ConfigError::EmptyRoot);
        }
        if self.sample_window.is_zero() {
            return Err(ConfigError::ZeroInterval("sample window"));
        }
        if self.repeat_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("repeat interval"));
        }
        if self.max_age.is_zero() {
            return Err(ConfigError::ZeroInterval("max age"));
        }
        if self.program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        if self.rebuild_throttle >= self.max_age {
            return Err(ConfigError::ThrottleNotBelowMaxAge {
                throttle: self.rebuild_throttle,
                max_age: self.max_age,
            });
        }
        Ok(())
    }

    /// True when a measurement cannot finish before the next one is due.
    pub fn window_overlaps_interval(&self) -> bool {
        self.sample_window >= self.repeat_interval
    }
}
