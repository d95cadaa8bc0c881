//! Stepwise execution drivers.
//!
//! Each driver is stateless across invocations: everything that must
//! survive a call (the pending iteration plan, a test's step cursor) is
//! passed in and handed back for the caller to persist. The hosting
//! orchestrator — an external workflow engine, or the in-process
//! [`runner::GroupRunner`] — owns continuity.

pub mod finish;
pub mod iteration;
pub mod outcome;
pub mod runner;
pub mod step;

pub use finish::{log_group_complete, log_test_complete};
pub use iteration::{next_iteration, IterationOutcome};
pub use outcome::log_step_result;
pub use runner::{GroupReport, GroupRunner, RunError, TestRow};
pub use step::{next_step, CompletionMarker, StepDescriptor, StepOutcome};
