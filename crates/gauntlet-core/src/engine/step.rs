//! Step driver: advances one test's cursor through its ordered operations.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::audit::{AuditError, AuditLog};
use crate::model::TestPlan;
use crate::scenario::{ScenarioId, ScenarioRecord, ScenarioStatus};

/// A step handed out for dispatch, together with the cursor the caller must
/// persist for the next call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StepDescriptor {
    pub scenario_id: ScenarioId,
    pub operation: String,
    pub input: Value,
    pub cursor: i64,
}

/// Terminal marker: the test has no further steps. Carries the scenario id
/// under which the caller logs the test's completion.
#[derive(Debug, Clone)]
pub struct CompletionMarker {
    pub scenario_id: ScenarioId,
}

#[derive(Debug)]
pub enum StepOutcome {
    Step(StepDescriptor),
    Completed(CompletionMarker),
}

/// Advance the cursor and hand out the step it now points at.
///
/// The cursor starts at −1; each call increments it first. Reaching the
/// step count is terminal and irreversible — every call at or past it
/// returns the completion marker and writes nothing. Otherwise the step's
/// START record (noting the remaining-step count) gates handing it out.
pub async fn next_step(
    audit: &Arc<dyn AuditLog>,
    group_id: &str,
    test: &TestPlan,
    cursor: i64,
) -> Result<StepOutcome, AuditError> {
    let cursor = cursor + 1;
    let total = test.step_count() as i64;
    if cursor >= total {
        return Ok(StepOutcome::Completed(CompletionMarker {
            scenario_id: ScenarioId::test_completed(&test.test_id),
        }));
    }

    let step = &test.steps[cursor as usize];
    let remaining = (total - cursor - 1) as usize;
    debug!(
        group = group_id,
        test = %test.test_id,
        operation = %step.operation,
        remaining,
        "step started"
    );
    audit
        .append(ScenarioRecord::new(
            group_id,
            ScenarioId::step_started(&test.test_id, remaining),
            ScenarioStatus::Start,
            json!({ "remaining_steps": remaining }),
            json!("Step Started"),
        ))
        .await?;

    Ok(StepOutcome::Step(StepDescriptor {
        scenario_id: ScenarioId::step(&test.test_id, &step.operation),
        operation: step.operation.clone(),
        input: step.input.clone(),
        cursor,
    }))
}
