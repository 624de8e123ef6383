//! Collector for extended device statistics from the `iostat` utility.

pub mod parser;

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::collector::traits::{CommandError, CommandRunner};
use crate::storage::model::DeviceMap;

pub use parser::{ExtractError, ParseError, extract_device_table, parse_device_table};

/// Default program name, resolved through `PATH`.
pub const DEFAULT_PROGRAM: &str = "iostat";

/// Error type for a failed sampling cycle.
#[derive(Debug)]
pub enum SampleError {
    /// The command could not be run or failed.
    Command(CommandError),
    /// The output had no report header.
    Extract(ExtractError),
    /// A device row was malformed.
    Parse(ParseError),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::Command(e) => write!(f, "command error: {}", e),
            SampleError::Extract(e) => write!(f, "extract error: {}", e),
            SampleError::Parse(e) => write!(f, "parse error: {}", e),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Command(e) => Some(e),
            SampleError::Extract(e) => Some(e),
            SampleError::Parse(e) => Some(e),
        }
    }
}

impl From<CommandError> for SampleError {
    fn from(e: CommandError) -> Self {
        SampleError::Command(e)
    }
}

impl From<ExtractError> for SampleError {
    fn from(e: ExtractError) -> Self {
        SampleError::Extract(e)
    }
}

impl From<ParseError> for SampleError {
    fn from(e: ParseError) -> Self {
        SampleError::Parse(e)
    }
}

/// Runs `iostat -xkd <window> 2` and parses the second report.
pub struct IostatCollector<R: CommandRunner> {
    runner: R,
    program: String,
    sample_window: Duration,
}

impl<R: CommandRunner> IostatCollector<R> {
    /// Creates a collector.
    ///
    /// # Arguments
    /// * `runner` - Command runner (real or mock)
    /// * `program` - Path or name of the `iostat` binary
    /// * `sample_window` - Interval covered by the reported rates
    pub fn new(runner: R, program: impl Into<String>, sample_window: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            sample_window,
        }
    }

    /// Command-line arguments passed to `iostat`.
    ///
    /// Sub-second windows are rounded up, `iostat` only accepts whole seconds.
    pub fn args(&self) -> Vec<String> {
        let mut secs = self.sample_window.as_secs();
        if self.sample_window.subsec_nanos() > 0 || secs == 0 {
            secs += 1;
        }
        vec!["-xkd".to_string(), secs.to_string(), "2".to_string()]
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs one measurement. Blocks for about one sample window.
    pub fn collect(&self) -> Result<DeviceMap, SampleError> {
        let output = self.runner.run(&self.program, &self.args())?;
        trace!(program = %self.program, bytes = output.len(), "command finished");
        let table = extract_device_table(&output)?;
        Ok(parse_device_table(table)?)
    }
}
