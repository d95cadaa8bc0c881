//! Minimum-delay gate between step operations.
//!
//! The hosting workflow engine parks a task and hands us a resume token;
//! we sleep at least the requested time, then signal resumption through the
//! orchestrator's resume primitive. The sleep is a lower bound only — no
//! upper bound is guaranteed. Tokens are single-use, but enforcing that is
//! the orchestrator's job: a reused token is rejected on its side.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DelayError {
    /// The resume signal could not be delivered. Fatal: the parked task
    /// would otherwise hang until the orchestrator's own timeout fires.
    #[error("resume delivery failed: {message}")]
    ResumeDelivery { message: String },

    /// Negative or non-finite wait time.
    #[error("invalid wait time: {seconds}")]
    InvalidDuration { seconds: f64 },
}

/// Opaque single-use resume handle issued by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelayToken(String);

impl DelayToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Resume-with-success primitive of the hosting orchestrator.
#[async_trait]
pub trait TaskResumer: Send + Sync {
    async fn resume_success(&self, token: &DelayToken, payload: Value) -> Result<(), DelayError>;
}

/// Enforces a minimum pause, then signals resumption.
pub struct DelayGate {
    resumer: Arc<dyn TaskResumer>,
}

impl DelayGate {
    pub fn new(resumer: Arc<dyn TaskResumer>) -> Self {
        Self { resumer }
    }

    /// Block the calling context at least `min_seconds`, then deliver the
    /// fixed success payload through `token`. Zero is valid and still
    /// resumes. Delivery failure is fatal; there is no retry.
    pub async fn wait(&self, min_seconds: f64, token: DelayToken) -> Result<(), DelayError> {
        if !min_seconds.is_finite() || min_seconds < 0.0 {
            return Err(DelayError::InvalidDuration {
                seconds: min_seconds,
            });
        }
        if min_seconds > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(min_seconds)).await;
        }
        debug!(token = token.as_str(), min_seconds, "wait complete, resuming");
        self.resumer
            .resume_success(
                &token,
                json!({ "status": "SUCCESS", "response": "Wait Complete" }),
            )
            .await
    }
}

/// Extract the minimum wait from a `Wait` step payload.
///
/// Workflow-engine path expressions deliver `wait_time` as either a number
/// or a numeric string; both are accepted.
pub fn wait_seconds(payload: &Value) -> Result<f64, DelayError> {
    let raw = payload.get("wait_time").unwrap_or(&Value::Null);
    let seconds = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match seconds {
        Some(s) if s.is_finite() && s >= 0.0 => Ok(s),
        _ => Err(DelayError::InvalidDuration {
            seconds: seconds.unwrap_or(f64::NAN),
        }),
    }
}

/// Records every resumption, for tests and local runs.
#[derive(Default)]
pub struct MemoryResumer {
    resumed: std::sync::Mutex<Vec<(DelayToken, Value)>>,
}

impl MemoryResumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resumptions(&self) -> Vec<(DelayToken, Value)> {
        self.resumed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskResumer for MemoryResumer {
    async fn resume_success(&self, token: &DelayToken, payload: Value) -> Result<(), DelayError> {
        self.resumed.lock().unwrap().push((token.clone(), payload));
        Ok(())
    }
}
