//! Audit trail identifiers and records.
//!
//! Every event in a campaign's trail is keyed by (group id, scenario id).
//! The scenario id grammar is `T<{test_ref}>:S<{suffix}>` and is part of the
//! wire contract with downstream log consumers — the constructors below are
//! the only way to mint one, so the grammar cannot drift.

use chrono::{DateTime, Utc};
use gauntlet_adapter_api::OutcomeStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-event identifier encoding test and step position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Group bootstrap event: `T<Null>:S<Null>`.
    pub fn bootstrap() -> Self {
        Self("T<Null>:S<Null>".into())
    }

    /// Start of an iteration, tagged with the count still pending:
    /// `T<Started>:S<{remaining}>`.
    pub fn iteration_started(remaining: usize) -> Self {
        Self(format!("T<Started>:S<{remaining}>"))
    }

    /// Start of a step within a test, tagged with the count still pending:
    /// `T<{test}>:S<{remaining}>`.
    pub fn step_started(test: &str, remaining: usize) -> Self {
        Self(format!("T<{test}>:S<{remaining}>"))
    }

    /// A dispatched step, tagged with its operation: `T<{test}>:S<{operation}>`.
    pub fn step(test: &str, operation: &str) -> Self {
        Self(format!("T<{test}>:S<{operation}>"))
    }

    /// Terminal event for one test: `T<{test}>:S<Completed>`.
    pub fn test_completed(test: &str) -> Self {
        Self(format!("T<{test}>:S<Completed>"))
    }

    /// Terminal event for the whole group: `T<Completed>:S<Completed>`.
    pub fn group_completed() -> Self {
        Self("T<Completed>:S<Completed>".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status column of a scenario record.
///
/// START/FINISH mark lifecycle transitions written by the drivers; adapter
/// statuses are recorded verbatim by the step-result logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    #[serde(rename = "START")]
    Start,
    #[serde(rename = "FINISH")]
    Finish,
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

impl From<OutcomeStatus> for ScenarioStatus {
    fn from(status: OutcomeStatus) -> Self {
        match status {
            OutcomeStatus::Success => Self::Success,
            OutcomeStatus::Failed => Self::Failed,
        }
    }
}

/// One append-only audit row. Never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRecord {
    #[serde(rename = "TestGroupID")]
    pub group_id: String,
    #[serde(rename = "TestScenarioID")]
    pub scenario_id: ScenarioId,
    #[serde(rename = "Status")]
    pub status: ScenarioStatus,
    #[serde(rename = "Input")]
    pub input: Value,
    #[serde(rename = "Output")]
    pub output: Value,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl ScenarioRecord {
    /// Build a record stamped with the current wall clock.
    pub fn new(
        group_id: impl Into<String>,
        scenario_id: ScenarioId,
        status: ScenarioStatus,
        input: Value,
        output: Value,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            scenario_id,
            status,
            input,
            output,
            timestamp: Utc::now(),
        }
    }
}
