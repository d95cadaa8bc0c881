//! Declarative inputs and materialized plans for a campaign.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel dependency marking a test that runs after all non-wildcard tests.
pub const WILDCARD: &str = "*";

/// A named group of tests with their declared dependencies.
///
/// Keys are test names (also the blob keys their step lists live under);
/// values are the names each test waits for. Names absent from the key set
/// unblock dependents without being scheduled themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestGroup {
    pub id: String,
    pub tests: BTreeMap<String, Vec<String>>,
}

impl TestGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tests: BTreeMap::new(),
        }
    }

    /// Add a test with its dependency list.
    pub fn with_test<I, S>(mut self, name: impl Into<String>, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tests
            .insert(name.into(), deps.into_iter().map(Into::into).collect());
        self
    }
}

/// One operation within a test: a dispatch tag plus its payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub operation: String,
    pub input: Value,
}

/// A test's materialized step list, fetched from blob storage by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPlan {
    pub test_id: String,
    pub steps: Vec<Step>,
}

impl TestPlan {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Request to prepare and run one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRequest {
    /// Bucket the per-test step-list blobs live in.
    pub bucket: String,
    pub group: TestGroup,
}

/// Wire shape of a stored test blob: `{"steps": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct TestBlobBody {
    pub steps: Vec<Step>,
}
