//! Scripted command runner for testing collectors without a real `iostat`.
//!
//! `MockCommand` replays queued responses in order. The last queued response
//! repeats forever, so a single response behaves like a stable system.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::collector::traits::{CommandError, CommandRunner};

#[derive(Debug, Clone)]
enum Response {
    Output(String),
    Failure { code: i32, stderr: String },
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<Response>,
    calls: Vec<(String, Vec<String>)>,
}

/// In-memory command runner. Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockCommand {
    state: Arc<Mutex<MockState>>,
}

impl MockCommand {
    /// Creates a runner with no responses; every call fails to spawn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner that always prints `output`.
    pub fn with_output(output: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.push_output(output);
        mock
    }

    /// Creates a runner that always exits with `code`.
    pub fn with_failure(code: i32, stderr: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.push_failure(code, stderr);
        mock
    }

    /// Queues a successful run printing `output`.
    pub fn push_output(&self, output: impl Into<String>) {
        self.lock()
            .responses
            .push_back(Response::Output(output.into()));
    }

    /// Queues a run exiting with `code`.
    pub fn push_failure(&self, code: i32, stderr: impl Into<String>) {
        self.lock().responses.push_back(Response::Failure {
            code,
            stderr: stderr.into(),
        });
    }

    /// Program and arguments of every call so far.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommandRunner for MockCommand {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let mut state = self.lock();
        state.calls.push((program.to_string(), args.to_vec()));

        let response = if state.responses.len() > 1 {
            state.responses.pop_front()
        } else {
            state.responses.front().cloned()
        };

        match response {
            Some(Response::Output(out)) => Ok(out),
            Some(Response::Failure { code, stderr }) => Err(CommandError::Status {
                program: program.to_string(),
                code: Some(code),
                stderr,
            }),
            None => Err(CommandError::Spawn {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no scripted response"),
            }),
        }
    }
}
