//! In-memory audit log for tests and local runs.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AuditError, AuditLog};
use crate::scenario::{ScenarioId, ScenarioRecord};

/// Records appends in order; can simulate a provisioning delay by requiring
/// a number of readiness polls after `provision` before reporting ready.
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<ScenarioRecord>>,
    provisioned: Mutex<bool>,
    polls_until_ready: AtomicU32,
}

impl MemoryAuditLog {
    /// A store that already exists and is immediately ready.
    pub fn ready() -> Self {
        let log = Self::default();
        *log.provisioned.lock().unwrap() = true;
        log
    }

    /// A store that does not exist yet and, once provisioned, reports
    /// not-ready for the next `polls` readiness checks.
    pub fn unprovisioned(polls: u32) -> Self {
        let log = Self::default();
        log.polls_until_ready.store(polls, Ordering::SeqCst);
        log
    }

    pub fn records(&self) -> Vec<ScenarioRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn records_for(&self, scenario_id: &ScenarioId) -> Vec<ScenarioRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.scenario_id == scenario_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, record: ScenarioRecord) -> Result<(), AuditError> {
        if !*self.provisioned.lock().unwrap() {
            return Err(AuditError::Write {
                scenario_id: record.scenario_id.to_string(),
                message: "store does not exist".into(),
            });
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn is_ready(&self) -> Result<bool, AuditError> {
        if !*self.provisioned.lock().unwrap() {
            return Ok(false);
        }
        let remaining = self.polls_until_ready.load(Ordering::SeqCst);
        if remaining > 0 {
            self.polls_until_ready.store(remaining - 1, Ordering::SeqCst);
            return Ok(false);
        }
        Ok(true)
    }

    async fn provision(&self) -> Result<(), AuditError> {
        *self.provisioned.lock().unwrap() = true;
        Ok(())
    }
}

/// Audit log whose appends always fail, for exercising write-failure paths.
pub struct FailingAuditLog;

#[async_trait]
impl AuditLog for FailingAuditLog {
    async fn append(&self, record: ScenarioRecord) -> Result<(), AuditError> {
        Err(AuditError::Write {
            scenario_id: record.scenario_id.to_string(),
            message: "injected failure".into(),
        })
    }

    async fn is_ready(&self) -> Result<bool, AuditError> {
        Ok(true)
    }

    async fn provision(&self) -> Result<(), AuditError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::audit::{ensure_provisioned, ProvisionPolicy};
    use crate::scenario::{ScenarioId, ScenarioStatus};

    fn record() -> ScenarioRecord {
        ScenarioRecord::new(
            "g",
            ScenarioId::bootstrap(),
            ScenarioStatus::Start,
            serde_json::json!({}),
            serde_json::json!("ok"),
        )
    }

    #[tokio::test]
    async fn append_fails_until_provisioned() {
        let log = MemoryAuditLog::default();
        assert!(log.append(record()).await.is_err());
        log.provision().await.unwrap();
        log.append(record()).await.unwrap();
        assert_eq!(log.records().len(), 1);
    }

    #[tokio::test]
    async fn ensure_provisioned_polls_through_creation_delay() {
        let log: Arc<dyn AuditLog> = Arc::new(MemoryAuditLog::unprovisioned(3));
        let policy = ProvisionPolicy {
            poll_interval: Duration::from_millis(1),
            max_polls: 5,
        };
        ensure_provisioned(&log, &policy).await.unwrap();
        assert!(log.is_ready().await.unwrap());
    }

    #[tokio::test]
    async fn ensure_provisioned_times_out() {
        let log: Arc<dyn AuditLog> = Arc::new(MemoryAuditLog::unprovisioned(10));
        let policy = ProvisionPolicy {
            poll_interval: Duration::from_millis(1),
            max_polls: 2,
        };
        let err = ensure_provisioned(&log, &policy).await.unwrap_err();
        assert!(matches!(err, AuditError::ProvisioningTimeout { polls: 2 }));
    }
}
