//! Mock command runner and captured outputs for testing.

mod runner;
pub mod scenarios;

pub use runner::MockCommand;
