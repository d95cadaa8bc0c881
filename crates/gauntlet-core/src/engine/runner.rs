//! In-process group runner.
//!
//! Plays the external orchestrator's role for local and integration use:
//! resolves the group, pulls one iteration at a time, fans the batch out as
//! tokio tasks, and drives each test's step loop to completion. All
//! scheduling decisions stay in the stateless cores — the runner only
//! threads their state between calls and dispatches descriptors.

use std::sync::Arc;

use gauntlet_adapter_api::AdapterRegistry;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info};
use uuid::Uuid;

use crate::audit::{AuditError, AuditLog, ProvisionPolicy};
use crate::blob::BlobFetcher;
use crate::delay::{wait_seconds, DelayError, DelayGate, DelayToken, TaskResumer};
use crate::engine::finish::{log_group_complete, log_test_complete};
use crate::engine::iteration::{next_iteration, IterationOutcome};
use crate::engine::outcome::log_step_result;
use crate::engine::step::{next_step, StepDescriptor, StepOutcome};
use crate::model::{GroupRequest, TestPlan};
use crate::scenario::ScenarioStatus;
use crate::schedule::{ResolutionError, Resolver};

/// Operation tag routed to the delay gate instead of a resource adapter.
pub const WAIT_OPERATION: &str = "Wait";

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Delay(#[from] DelayError),

    #[error("test task failed: {message}")]
    Task { message: String },
}

/// Per-test result row.
#[derive(Debug, Clone)]
pub struct TestRow {
    pub test_id: String,
    pub steps_run: usize,
    pub failed_steps: usize,
}

/// Summary of one campaign run.
#[derive(Debug)]
pub struct GroupReport {
    pub group_id: String,
    pub iterations: usize,
    pub tests: Vec<TestRow>,
}

impl GroupReport {
    pub fn failed_steps(&self) -> usize {
        self.tests.iter().map(|t| t.failed_steps).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed_steps() == 0
    }
}

pub struct GroupRunner {
    audit: Arc<dyn AuditLog>,
    blobs: Arc<dyn BlobFetcher>,
    registry: Arc<AdapterRegistry>,
    resumer: Arc<dyn TaskResumer>,
    provisioning: ProvisionPolicy,
}

impl GroupRunner {
    pub fn new(
        audit: Arc<dyn AuditLog>,
        blobs: Arc<dyn BlobFetcher>,
        registry: Arc<AdapterRegistry>,
        resumer: Arc<dyn TaskResumer>,
    ) -> Self {
        Self {
            audit,
            blobs,
            registry,
            resumer,
            provisioning: ProvisionPolicy::default(),
        }
    }

    pub fn with_provisioning(mut self, policy: ProvisionPolicy) -> Self {
        self.provisioning = policy;
        self
    }

    /// Run the whole group. Adapter failures are recorded and stepping
    /// continues; only pre-flight, audit-gating, and resume-delivery
    /// failures abort. Result rows are sorted by test id for deterministic
    /// output.
    pub async fn run_group(&self, req: &GroupRequest) -> Result<GroupReport, RunError> {
        let resolver = Resolver::new(self.audit.clone(), self.blobs.clone())
            .with_provisioning(self.provisioning.clone());
        let mut pending = resolver.prepare(req).await?;

        let group_id = req.group.id.clone();
        let mut iterations = 0usize;
        let mut rows: Vec<TestRow> = Vec::new();

        loop {
            match next_iteration(&self.audit, &group_id, pending).await? {
                IterationOutcome::Done => break,
                IterationOutcome::Batch { tests, remaining } => {
                    pending = remaining;
                    iterations += 1;
                    let mut join_set = JoinSet::new();
                    for test in tests {
                        let audit = self.audit.clone();
                        let registry = self.registry.clone();
                        let resumer = self.resumer.clone();
                        let group_id = group_id.clone();
                        join_set.spawn(async move {
                            run_test(&audit, &registry, &resumer, &group_id, test).await
                        });
                    }
                    while let Some(joined) = join_set.join_next().await {
                        let row = joined.map_err(|e| RunError::Task {
                            message: e.to_string(),
                        })??;
                        rows.push(row);
                    }
                }
            }
        }

        log_group_complete(&self.audit, &group_id).await;
        rows.sort_by(|a, b| a.test_id.cmp(&b.test_id));
        info!(group = %group_id, iterations, tests = rows.len(), "group run complete");
        Ok(GroupReport {
            group_id,
            iterations,
            tests: rows,
        })
    }
}

async fn run_test(
    audit: &Arc<dyn AuditLog>,
    registry: &AdapterRegistry,
    resumer: &Arc<dyn TaskResumer>,
    group_id: &str,
    test: TestPlan,
) -> Result<TestRow, RunError> {
    let mut row = TestRow {
        test_id: test.test_id.clone(),
        steps_run: 0,
        failed_steps: 0,
    };
    let mut cursor = -1;
    loop {
        match next_step(audit, group_id, &test, cursor).await? {
            StepOutcome::Completed(marker) => {
                log_test_complete(audit, group_id, &marker).await;
                return Ok(row);
            }
            StepOutcome::Step(desc) => {
                cursor = desc.cursor;
                let outcome = dispatch(registry, resumer, &desc).await?;
                let status = log_step_result(audit, group_id, &desc, outcome).await;
                row.steps_run += 1;
                if status == ScenarioStatus::Failed {
                    row.failed_steps += 1;
                }
            }
        }
    }
}

/// Route one descriptor: `Wait` goes to the delay gate with a fresh token,
/// everything else through the adapter registry.
async fn dispatch(
    registry: &AdapterRegistry,
    resumer: &Arc<dyn TaskResumer>,
    desc: &StepDescriptor,
) -> Result<Value, RunError> {
    if desc.operation == WAIT_OPERATION {
        let seconds = match wait_seconds(&desc.input) {
            Ok(s) => s,
            // A malformed wait payload fails the step, not the campaign.
            Err(e) => return Ok(serde_json::json!({ "status": "FAILED", "message": e.to_string() })),
        };
        let token = DelayToken::new(format!("wait-{}", Uuid::new_v4()));
        debug!(token = token.as_str(), seconds, "pacing step through delay gate");
        DelayGate::new(resumer.clone()).wait(seconds, token).await?;
        return Ok(serde_json::json!({ "status": "SUCCESS", "response": "Wait Complete" }));
    }
    Ok(registry.dispatch(&desc.operation, desc.input.clone()).await.to_value())
}
