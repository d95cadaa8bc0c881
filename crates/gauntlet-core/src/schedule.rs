//! Dependency resolution: test group -> ordered parallel-eligible batches.
//!
//! The resolver runs once per group. Its output is a list of iterations:
//! every test in iteration k depends only on tests scheduled in iterations
//! strictly before k, so all members of one iteration may run concurrently.
//! Wildcard-tagged tests (`"*"` dependency) form exactly one final
//! iteration and never mix into earlier ones.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::audit::{ensure_provisioned, AuditError, AuditLog, ProvisionPolicy};
use crate::blob::{BlobError, BlobFetcher};
use crate::model::{GroupRequest, TestBlobBody, TestGroup, TestPlan, WILDCARD};
use crate::scenario::{ScenarioId, ScenarioRecord, ScenarioStatus};

/// Fatal pre-flight failures. Surfaced before any iteration begins.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The dependency map cannot make progress: some subset of tests waits
    /// on each other (mutual cycles and self-dependencies both land here).
    #[error("dependency cycle detected among tests: {stuck:?}")]
    CycleDetected { stuck: Vec<String> },

    /// A scheduled test has no step-list blob under its name.
    #[error("no test definition blob for '{test}'")]
    MissingTestBlob {
        test: String,
        #[source]
        source: BlobError,
    },

    /// A test blob exists but is not a valid step list.
    #[error("test definition blob for '{test}' is invalid: {reason}")]
    InvalidTestBlob { test: String, reason: String },

    /// The audit store could not be provisioned or written during bootstrap.
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Partition a group's tests into ordered parallel-eligible batches.
///
/// Dependencies naming nothing schedulable (neither a normal nor a wildcard
/// test of this group) are treated as externally pre-satisfied: they unblock
/// their dependents but are not themselves scheduled. A dependency on a
/// wildcard test is likewise struck, since wildcards run last by definition.
///
/// Fails fast with [`ResolutionError::CycleDetected`] when a pass over the
/// remaining tests removes none of them.
pub fn resolve(group: &TestGroup) -> Result<Vec<Vec<String>>, ResolutionError> {
    let mut wildcard: Vec<String> = Vec::new();
    let mut pending: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (name, deps) in &group.tests {
        if deps.iter().any(|d| d == WILDCARD) {
            wildcard.push(name.clone());
        } else {
            pending.insert(name.clone(), deps.iter().cloned().collect());
        }
    }

    // Strike dependencies that will never be scheduled ahead of their
    // dependents. Unknown names are accepted as externally pre-satisfied,
    // but surfaced: a typo here silently reorders the campaign.
    let schedulable: BTreeSet<String> = pending.keys().cloned().collect();
    for (name, deps) in pending.iter_mut() {
        deps.retain(|dep| {
            if schedulable.contains(dep) {
                return true;
            }
            if group.tests.contains_key(dep) {
                warn!(test = %name, dependency = %dep, "dependency on wildcard test ignored");
            } else {
                warn!(test = %name, dependency = %dep, "dependency not in group, assuming externally satisfied");
            }
            false
        });
    }

    let mut plan: Vec<Vec<String>> = Vec::new();
    while !pending.is_empty() {
        let ready: Vec<String> = pending
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        if ready.is_empty() {
            return Err(ResolutionError::CycleDetected {
                stuck: pending.keys().cloned().collect(),
            });
        }
        for name in &ready {
            pending.remove(name);
        }
        for deps in pending.values_mut() {
            for name in &ready {
                deps.remove(name);
            }
        }
        plan.push(ready);
    }

    if !wildcard.is_empty() {
        plan.push(wildcard);
    }
    debug!(group = %group.id, iterations = plan.len(), "resolved iteration plan");
    Ok(plan)
}

/// Bootstrap front-end: provisions the audit store, logs the group start,
/// and materializes every scheduled test's step list from blob storage.
pub struct Resolver {
    audit: Arc<dyn AuditLog>,
    blobs: Arc<dyn BlobFetcher>,
    provisioning: ProvisionPolicy,
}

impl Resolver {
    pub fn new(audit: Arc<dyn AuditLog>, blobs: Arc<dyn BlobFetcher>) -> Self {
        Self {
            audit,
            blobs,
            provisioning: ProvisionPolicy::default(),
        }
    }

    pub fn with_provisioning(mut self, policy: ProvisionPolicy) -> Self {
        self.provisioning = policy;
        self
    }

    /// Resolve the group and fetch each scheduled test's steps, preserving
    /// iteration structure. The group-start record gates everything after
    /// it: a write failure here is fatal.
    pub async fn prepare(&self, req: &GroupRequest) -> Result<Vec<Vec<TestPlan>>, ResolutionError> {
        ensure_provisioned(&self.audit, &self.provisioning).await?;

        let names = resolve(&req.group)?;

        self.audit
            .append(ScenarioRecord::new(
                req.group.id.clone(),
                ScenarioId::bootstrap(),
                ScenarioStatus::Start,
                serde_json::to_value(req).unwrap_or_default(),
                json!({
                    "message": "input parsing finished, created iteration plan",
                    "iterations": names,
                }),
            ))
            .await?;

        let mut plan: Vec<Vec<TestPlan>> = Vec::with_capacity(names.len());
        for iteration in &names {
            let mut tests = Vec::with_capacity(iteration.len());
            for name in iteration {
                tests.push(self.fetch_plan(&req.bucket, name).await?);
            }
            plan.push(tests);
        }
        Ok(plan)
    }

    async fn fetch_plan(&self, bucket: &str, name: &str) -> Result<TestPlan, ResolutionError> {
        let bytes = self
            .blobs
            .fetch(bucket, name)
            .await
            .map_err(|source| ResolutionError::MissingTestBlob {
                test: name.to_string(),
                source,
            })?;
        let body: TestBlobBody =
            serde_json::from_slice(&bytes).map_err(|e| ResolutionError::InvalidTestBlob {
                test: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(TestPlan {
            test_id: name.to_string(),
            steps: body.steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn group(tests: &[(&str, &[&str])]) -> TestGroup {
        let mut g = TestGroup::new("g");
        for (name, deps) in tests {
            g = g.with_test(*name, deps.iter().copied());
        }
        g
    }

    #[test]
    fn independent_tests_share_iteration_zero() {
        let plan = resolve(&group(&[("a", &[]), ("b", &[]), ("c", &[])])).unwrap();
        assert_eq!(plan, vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn chain_resolves_one_per_iteration() {
        let plan = resolve(&group(&[("a", &[]), ("b", &["a"]), ("c", &["b"])])).unwrap();
        assert_eq!(plan, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn wildcard_forms_final_iteration() {
        // {A: [], B: ["A"], C: ["*"]} -> [[A], [B], [C]]
        let plan = resolve(&group(&[("A", &[]), ("B", &["A"]), ("C", &["*"])])).unwrap();
        assert_eq!(plan, vec![vec!["A"], vec!["B"], vec!["C"]]);
    }

    #[test]
    fn wildcards_share_the_final_iteration() {
        let plan = resolve(&group(&[("a", &[]), ("z1", &["*"]), ("z2", &["*"])])).unwrap();
        assert_eq!(plan, vec![vec!["a"], vec!["z1", "z2"]]);
    }

    #[test]
    fn wildcard_only_group_is_one_iteration() {
        let plan = resolve(&group(&[("z", &["*"])])).unwrap();
        assert_eq!(plan, vec![vec!["z"]]);
    }

    #[test]
    fn mutual_cycle_is_detected() {
        // {A: ["B"], B: ["A"]} -> CycleDetected
        let err = resolve(&group(&[("A", &["B"]), ("B", &["A"])])).unwrap_err();
        match err {
            ResolutionError::CycleDetected { stuck } => {
                assert_eq!(stuck, vec!["A".to_string(), "B".to_string()]);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_detected() {
        let err = resolve(&group(&[("a", &["a"])])).unwrap_err();
        assert!(matches!(err, ResolutionError::CycleDetected { .. }));
    }

    #[test]
    fn cycle_behind_valid_prefix_is_detected() {
        let err = resolve(&group(&[("a", &[]), ("b", &["a", "c"]), ("c", &["b"])])).unwrap_err();
        match err {
            ResolutionError::CycleDetected { stuck } => {
                assert_eq!(stuck, vec!["b".to_string(), "c".to_string()]);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dependency_is_pre_satisfied_not_scheduled() {
        let plan = resolve(&group(&[("a", &["external-fixture"]), ("b", &["a"])])).unwrap();
        assert_eq!(plan, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn dependency_on_wildcard_test_is_ignored() {
        let plan = resolve(&group(&[("a", &["z"]), ("z", &["*"])])).unwrap();
        assert_eq!(plan, vec![vec!["a"], vec!["z"]]);
    }

    #[test]
    fn empty_group_resolves_to_empty_plan() {
        let plan = resolve(&TestGroup::new("g")).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn diamond_dependencies_batch_correctly() {
        let plan = resolve(&group(&[
            ("top", &[]),
            ("left", &["top"]),
            ("right", &["top"]),
            ("bottom", &["left", "right"]),
        ]))
        .unwrap();
        assert_eq!(plan, vec![vec!["top"], vec!["left", "right"], vec!["bottom"]]);
    }

    #[test]
    fn union_of_iterations_equals_input_set_without_duplicates() {
        let g = group(&[
            ("a", &[]),
            ("b", &["a"]),
            ("c", &["a", "ghost"]),
            ("d", &["b", "c"]),
            ("end", &["*"]),
        ]);
        let plan = resolve(&g).unwrap();
        let mut seen = BTreeSet::new();
        for batch in &plan {
            for name in batch {
                assert!(seen.insert(name.clone()), "duplicate scheduling of {name}");
            }
        }
        let input: BTreeSet<String> = g.tests.keys().cloned().collect();
        assert_eq!(seen, input);
    }

    #[test]
    fn resolution_is_deterministic() {
        let g = group(&[("m", &[]), ("k", &[]), ("z", &["m"]), ("a", &["k"])]);
        let first = resolve(&g).unwrap();
        for _ in 0..10 {
            assert_eq!(resolve(&g).unwrap(), first);
        }
    }
}
