//! Terminal writers for a finished test and a finished group.
//!
//! Both trail side effects that already happened, so their writes are
//! best-effort: a failed append is reported and dropped, never raised.

use std::sync::Arc;

use gauntlet_adapter_api::AdapterOutcome;
use serde_json::json;
use tracing::info;

use crate::audit::{append_best_effort, AuditLog};
use crate::engine::step::CompletionMarker;
use crate::scenario::{ScenarioId, ScenarioRecord, ScenarioStatus};

/// Record one test's completion under the marker's scenario id.
pub async fn log_test_complete(
    audit: &Arc<dyn AuditLog>,
    group_id: &str,
    marker: &CompletionMarker,
) -> AdapterOutcome {
    info!(group = group_id, scenario = %marker.scenario_id, "test completed");
    append_best_effort(
        audit,
        ScenarioRecord::new(
            group_id,
            marker.scenario_id.clone(),
            ScenarioStatus::Finish,
            json!({ "scenario_id": marker.scenario_id }),
            json!("Test Completed Successfully"),
        ),
    )
    .await;
    AdapterOutcome::success_with("Test Execution Completed")
}

/// Record the whole group's completion. Written once, after the iteration
/// driver first reports `Done`.
pub async fn log_group_complete(audit: &Arc<dyn AuditLog>, group_id: &str) -> AdapterOutcome {
    info!(group = group_id, "test group completed");
    append_best_effort(
        audit,
        ScenarioRecord::new(
            group_id,
            ScenarioId::group_completed(),
            ScenarioStatus::Finish,
            json!({ "group_id": group_id }),
            json!("Test Group Completed Successfully"),
        ),
    )
    .await;
    AdapterOutcome::success_with("Test Group Execution Completed")
}
