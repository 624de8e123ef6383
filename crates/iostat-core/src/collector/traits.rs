//! Abstraction over external command execution to enable testing and mocking.
//!
//! The `CommandRunner` trait allows the collector to run the real `iostat`
//! binary in production and a scripted mock in tests.

use std::fmt;
use std::io;
use std::process::Command;

/// Error type for command execution failures.
#[derive(Debug)]
pub enum CommandError {
    /// The process could not be started or waited on.
    Spawn { program: String, source: io::Error },
    /// The process exited unsuccessfully.
    Status {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    /// The process wrote something other than UTF-8 to stdout.
    Utf8 { program: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Spawn { program, source } => {
                write!(f, "failed to run {}: {}", program, source)
            }
            CommandError::Status {
                program,
                code: Some(code),
                stderr,
            } => write!(f, "{} exited with status {}: {}", program, code, stderr),
            CommandError::Status {
                program,
                code: None,
                stderr,
            } => write!(f, "{} terminated by signal: {}", program, stderr),
            CommandError::Utf8 { program } => write!(f, "{} produced non-UTF-8 output", program),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Runs an external program to completion and captures its standard output.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, waits for it, and returns its stdout.
    ///
    /// A non-zero exit status is an error.
    fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}

/// Runner that spawns real processes via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommand;

impl SystemCommand {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommand {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Status {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| CommandError::Utf8 {
            program: program.to_string(),
        })
    }
}
