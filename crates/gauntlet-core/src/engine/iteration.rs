//! Iteration driver: delivers one parallel-eligible batch per call.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::audit::{AuditError, AuditLog};
use crate::scenario::{ScenarioId, ScenarioRecord, ScenarioStatus};

/// What the driver handed back: either the next batch plus the state the
/// caller must persist, or `Done` when nothing is pending.
#[derive(Debug)]
pub enum IterationOutcome<T> {
    Done,
    Batch {
        tests: Vec<T>,
        remaining: Vec<Vec<T>>,
    },
}

/// Pop the next batch from `pending`, recording the iteration start.
///
/// The driver retains no memory across calls — the caller must thread the
/// returned `remaining` back in, which guarantees each batch is delivered
/// at most once. An exhausted plan returns `Done` without writing anything.
/// Empty batches are skipped rather than delivered.
///
/// The START record gates delivery: if it cannot be written, the batch is
/// not handed out.
pub async fn next_iteration<T: Send>(
    audit: &Arc<dyn AuditLog>,
    group_id: &str,
    mut pending: Vec<Vec<T>>,
) -> Result<IterationOutcome<T>, AuditError> {
    loop {
        if pending.is_empty() {
            return Ok(IterationOutcome::Done);
        }
        let batch = pending.remove(0);
        if batch.is_empty() {
            continue;
        }
        let remaining = pending.len();
        debug!(group = group_id, batch_size = batch.len(), remaining, "iteration started");
        audit
            .append(ScenarioRecord::new(
                group_id,
                ScenarioId::iteration_started(remaining),
                ScenarioStatus::Start,
                json!({ "remaining_iterations": remaining }),
                json!("Iteration Started"),
            ))
            .await?;
        return Ok(IterationOutcome::Batch {
            tests: batch,
            remaining: pending,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditLog;

    fn ready_log() -> (Arc<MemoryAuditLog>, Arc<dyn AuditLog>) {
        let log = Arc::new(MemoryAuditLog::ready());
        (log.clone(), log as Arc<dyn AuditLog>)
    }

    #[tokio::test]
    async fn empty_plan_is_done_and_writes_nothing() {
        let (mem, log) = ready_log();
        let out = next_iteration::<String>(&log, "g", vec![]).await.unwrap();
        assert!(matches!(out, IterationOutcome::Done));
        assert!(mem.records().is_empty());
    }

    #[tokio::test]
    async fn plan_of_empty_batches_is_done() {
        let (mem, log) = ready_log();
        let out = next_iteration::<String>(&log, "g", vec![vec![], vec![]])
            .await
            .unwrap();
        assert!(matches!(out, IterationOutcome::Done));
        assert!(mem.records().is_empty());
    }

    #[tokio::test]
    async fn single_batch_is_delivered_then_exhausted() {
        let (mem, log) = ready_log();
        let out = next_iteration(&log, "g", vec![vec!["x".to_string()]])
            .await
            .unwrap();
        let IterationOutcome::Batch { tests, remaining } = out else {
            panic!("expected a batch");
        };
        assert_eq!(tests, vec!["x"]);
        assert!(remaining.is_empty());

        let records = mem.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].scenario_id, ScenarioId::iteration_started(0));
        assert_eq!(records[0].status, ScenarioStatus::Start);

        let out = next_iteration::<String>(&log, "g", remaining).await.unwrap();
        assert!(matches!(out, IterationOutcome::Done));
    }

    #[tokio::test]
    async fn remaining_count_decrements_across_calls() {
        let (mem, log) = ready_log();
        let plan = vec![vec![1], vec![2], vec![3]];
        let IterationOutcome::Batch { remaining, .. } =
            next_iteration(&log, "g", plan).await.unwrap()
        else {
            panic!()
        };
        let IterationOutcome::Batch { remaining, .. } =
            next_iteration(&log, "g", remaining).await.unwrap()
        else {
            panic!()
        };
        let IterationOutcome::Batch { remaining, .. } =
            next_iteration(&log, "g", remaining).await.unwrap()
        else {
            panic!()
        };
        assert!(remaining.is_empty());

        let ids: Vec<_> = mem.records().iter().map(|r| r.scenario_id.clone()).collect();
        assert_eq!(
            ids,
            vec![
                ScenarioId::iteration_started(2),
                ScenarioId::iteration_started(1),
                ScenarioId::iteration_started(0),
            ]
        );
    }
}
