//! iostat-core: disk I/O statistics exposed as an SNMP subagent tree.
//!
//! Provides:
//! - `collector` - `iostat` invocation, table extraction and parsing
//! - `storage` - device sample model and the shared stats cache
//! - `sampler` - background thread refreshing the cache on a fixed interval
//! - `agent` - OID type, tree builder, GET/GETNEXT responder, session seam
//! - `config` - agent configuration with validation

pub mod agent;
pub mod collector;
pub mod config;
pub mod sampler;
pub mod storage;

pub use config::{AgentConfig, ConfigError};

/// Crate version, reported by the daemon at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
