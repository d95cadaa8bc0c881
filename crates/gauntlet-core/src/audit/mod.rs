//! Append-only audit trail abstraction.
//!
//! The trail lives in an external durable store keyed by
//! (group id, scenario id). Distinct writers use distinct composite keys, so
//! cross-writer ordering is irrelevant and last-write-wins per key is
//! sufficient. The store may not exist yet when a campaign starts; the
//! bootstrap path provisions it and polls until it is queryable.

pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::scenario::ScenarioRecord;

pub use memory::MemoryAuditLog;

/// Errors from the audit store.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Creating the backing store failed.
    #[error("audit store provisioning failed: {message}")]
    Provisioning { message: String },

    /// The store did not become queryable within the allowed polls.
    #[error("audit store not ready after {polls} polls")]
    ProvisioningTimeout { polls: u32 },

    /// Appending a record failed.
    #[error("audit append failed for {scenario_id}: {message}")]
    Write { scenario_id: String, message: String },
}

/// The append-only event sink.
///
/// `provision` creates the store with the fixed two-attribute composite key
/// (group id partition, scenario id sort); `is_ready` reports whether the
/// store is queryable yet.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, record: ScenarioRecord) -> Result<(), AuditError>;
    async fn is_ready(&self) -> Result<bool, AuditError>;
    async fn provision(&self) -> Result<(), AuditError>;
}

/// How long to keep polling a freshly provisioned store.
#[derive(Debug, Clone)]
pub struct ProvisionPolicy {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for ProvisionPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_polls: 15,
        }
    }
}

/// Make sure the store exists before the first write.
///
/// Creation is not instantaneous on managed stores; after issuing the
/// create, poll `is_ready` up to `policy.max_polls` times. Failure here is
/// fatal to the group — nothing has run yet and nothing may run unlogged.
pub async fn ensure_provisioned(
    audit: &Arc<dyn AuditLog>,
    policy: &ProvisionPolicy,
) -> Result<(), AuditError> {
    if audit.is_ready().await? {
        return Ok(());
    }
    debug!("audit store missing, provisioning");
    audit.provision().await?;
    for _ in 0..policy.max_polls {
        if audit.is_ready().await? {
            return Ok(());
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
    Err(AuditError::ProvisioningTimeout {
        polls: policy.max_polls,
    })
}

/// Append a record that trails an already-succeeded side effect.
///
/// The side effect cannot be undone, so a failed write must not crash the
/// caller; it is reported and dropped.
pub async fn append_best_effort(audit: &Arc<dyn AuditLog>, record: ScenarioRecord) {
    let scenario_id = record.scenario_id.clone();
    if let Err(e) = audit.append(record).await {
        warn!(scenario_id = %scenario_id, error = %e, "dropping audit record after failed append");
    }
}
