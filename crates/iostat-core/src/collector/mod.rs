//! Disk statistics collection through the `iostat` utility.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               IostatCollector                │
//! │  iostat -xkd <window> 2                      │
//! │  extract_device_table -> parse_device_table  │
//! └──────────────────────┬───────────────────────┘
//!                        │
//!                 ┌──────▼────────┐
//!                 │ CommandRunner │ (trait)
//!                 └──────┬────────┘
//!                        │
//!              ┌─────────┴─────────┐
//!       ┌──────▼────────┐   ┌──────▼──────┐
//!       │ SystemCommand │   │ MockCommand │
//!       │ (process)     │   │ (testing)   │
//!       └───────────────┘   └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use iostat_core::collector::{IostatCollector, MockCommand, mock::scenarios};
//!
//! let runner = MockCommand::with_output(scenarios::typical_output());
//! let collector = IostatCollector::new(runner, "iostat", Duration::from_secs(5));
//! let devices = collector.collect().unwrap();
//! assert_eq!(devices.len(), 3);
//! ```

pub mod iostat;
pub mod mock;
pub mod traits;

pub use iostat::{IostatCollector, SampleError};
pub use mock::MockCommand;
pub use traits::{CommandError, CommandRunner, SystemCommand};
