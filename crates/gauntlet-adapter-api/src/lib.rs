//! Adapter contracts for Gauntlet resource operations.
//!
//! A resource adapter is a one-shot passthrough to some cloud service:
//! "create this table", "publish this message", "does this bucket exist".
//! The orchestration core never knows which services exist; it dispatches a
//! step's operation tag through an [`AdapterRegistry`] and records whatever
//! outcome comes back. Adapters therefore report failures as data
//! ([`AdapterOutcome`] with status `FAILED`), not as Rust errors — an
//! adapter error must never abort the campaign on its own.

pub mod outcome;
pub mod registry;

pub use outcome::{AdapterOutcome, OutcomeStatus};
pub use registry::{AdapterRegistry, ResourceAdapter, StaticAdapter};
