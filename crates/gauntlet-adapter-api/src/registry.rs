//! Operation-tag dispatch to registered adapters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::outcome::AdapterOutcome;

/// One pluggable resource operation.
///
/// Implementations perform a single cloud-SDK call and translate its result
/// into an [`AdapterOutcome`]. Returning `Err` is allowed for transport-level
/// surprises; the registry converts it into a `FAILED` outcome so the
/// campaign keeps stepping.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    async fn invoke(&self, payload: Value) -> anyhow::Result<AdapterOutcome>;
}

/// String-keyed registry mapping operation tags to adapters.
///
/// Dispatching an unregistered tag does not fail: it yields the fixed
/// `Unknown Operation Requested` outcome, which the caller records like any
/// other step result.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ResourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under an operation tag, replacing any previous one.
    pub fn register(mut self, tag: impl Into<String>, adapter: Arc<dyn ResourceAdapter>) -> Self {
        self.adapters.insert(tag.into(), adapter);
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.adapters.contains_key(tag)
    }

    /// Invoke the adapter registered for `tag`.
    pub async fn dispatch(&self, tag: &str, payload: Value) -> AdapterOutcome {
        let Some(adapter) = self.adapters.get(tag) else {
            warn!(operation = tag, "no adapter registered for operation");
            return AdapterOutcome::failed(format!("Unknown Operation Requested: {tag}"));
        };
        match adapter.invoke(payload).await {
            Ok(outcome) => outcome,
            Err(e) => AdapterOutcome::failed(format!("Error: {e:#}")),
        }
    }
}

/// Adapter returning a fixed outcome, for wiring tests and dry runs.
pub struct StaticAdapter(pub AdapterOutcome);

#[async_trait]
impl ResourceAdapter for StaticAdapter {
    async fn invoke(&self, _payload: Value) -> anyhow::Result<AdapterOutcome> {
        Ok(self.0.clone())
    }
}
