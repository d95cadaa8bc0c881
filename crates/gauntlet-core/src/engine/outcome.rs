//! Step-result logger: records a dispatched step's outcome.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::audit::{append_best_effort, AuditLog};
use crate::engine::step::StepDescriptor;
use crate::scenario::{ScenarioRecord, ScenarioStatus};

/// Record an adapter outcome under the originating descriptor's scenario id.
///
/// The outcome is taken as a raw `Value` on purpose: adapters are plugins
/// and their output shape cannot be trusted. A missing or unrecognized
/// `status` field defaults to FAILED rather than raising — downstream
/// consumers must never see a crash caused by a malformed outcome. The
/// remainder of the outcome (status stripped) becomes the output snapshot;
/// the descriptor is the input snapshot.
///
/// The write trails an adapter call that already happened, so it is
/// best-effort.
pub async fn log_step_result(
    audit: &Arc<dyn AuditLog>,
    group_id: &str,
    descriptor: &StepDescriptor,
    outcome: Value,
) -> ScenarioStatus {
    let mut output = outcome;
    let status = match output.as_object_mut().and_then(|o| o.remove("status")) {
        Some(raw) => serde_json::from_value::<ScenarioStatus>(raw).unwrap_or(ScenarioStatus::Failed),
        None => ScenarioStatus::Failed,
    };
    debug!(
        group = group_id,
        scenario = %descriptor.scenario_id,
        ?status,
        "step result"
    );
    append_best_effort(
        audit,
        ScenarioRecord::new(
            group_id,
            descriptor.scenario_id.clone(),
            status,
            serde_json::to_value(descriptor).unwrap_or(Value::Null),
            output,
        ),
    )
    .await;
    status
}
