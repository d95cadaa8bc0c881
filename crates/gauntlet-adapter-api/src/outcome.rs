//! Wire shape of an adapter invocation result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal status of one resource operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Result of invoking a resource adapter.
///
/// `response` carries service output on success; `message` carries the
/// service error on failure. Both are optional — consumers must tolerate
/// either or both being absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterOutcome {
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AdapterOutcome {
    /// Successful outcome with no service output.
    pub fn success() -> Self {
        Self {
            status: OutcomeStatus::Success,
            response: None,
            message: None,
        }
    }

    /// Successful outcome carrying service output.
    pub fn success_with(response: impl Into<Value>) -> Self {
        Self {
            status: OutcomeStatus::Success,
            response: Some(response.into()),
            message: None,
        }
    }

    /// Failed outcome carrying the service error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            response: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// Serialize to the wire `Value` handed to the audit trail.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_upper_case() {
        let out = AdapterOutcome::success_with("mocked");
        let v = out.to_value();
        assert_eq!(v["status"], "SUCCESS");
        assert_eq!(v["response"], "mocked");
        assert!(v.get("message").is_none());
    }

    #[test]
    fn failed_carries_message_only() {
        let out = AdapterOutcome::failed("Error: AccessDenied");
        let v = out.to_value();
        assert_eq!(v["status"], "FAILED");
        assert_eq!(v["message"], "Error: AccessDenied");
        assert!(v.get("response").is_none());
    }
}
