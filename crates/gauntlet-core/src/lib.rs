//! Gauntlet core: dependency-aware orchestration of cloud-resource test
//! campaigns.
//!
//! A campaign is a named group of tests with declared dependencies. The
//! [`schedule`] resolver turns the dependency map into ordered
//! parallel-eligible batches; the [`engine`] drivers advance each batch and
//! each test's step cursor one call at a time, recording an audit trail of
//! every transition; the [`delay`] gate paces invocations with a minimum
//! pause. All components are stateless across calls and receive their
//! collaborators (audit log, blob fetch, adapters, resume primitive) as
//! explicit arguments — state that must survive a call is passed in and
//! returned, never retained.
//!
//! ```no_run
//! use std::sync::Arc;
//! use gauntlet_adapter_api::{AdapterOutcome, AdapterRegistry, StaticAdapter};
//! use gauntlet_core::audit::MemoryAuditLog;
//! use gauntlet_core::blob::MemoryBlobStore;
//! use gauntlet_core::delay::MemoryResumer;
//! use gauntlet_core::engine::GroupRunner;
//! use gauntlet_core::model::{GroupRequest, TestGroup};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let blobs = Arc::new(MemoryBlobStore::new());
//! blobs.put_json("tests", "smoke.json", &serde_json::json!({
//!     "steps": [{ "operation": "CreateBucket", "input": { "bucket_name": "b" } }]
//! }));
//!
//! let registry = AdapterRegistry::new()
//!     .register("CreateBucket", Arc::new(StaticAdapter(AdapterOutcome::success())));
//!
//! let runner = GroupRunner::new(
//!     Arc::new(MemoryAuditLog::ready()),
//!     blobs,
//!     Arc::new(registry),
//!     Arc::new(MemoryResumer::new()),
//! );
//! let request = GroupRequest {
//!     bucket: "tests".into(),
//!     group: TestGroup::new("nightly").with_test("smoke.json", Vec::<String>::new()),
//! };
//! let report = runner.run_group(&request).await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod blob;
pub mod delay;
pub mod engine;
pub mod model;
pub mod scenario;
pub mod schedule;

pub use audit::{AuditError, AuditLog, ProvisionPolicy};
pub use blob::{BlobError, BlobFetcher};
pub use delay::{DelayError, DelayGate, DelayToken, TaskResumer};
pub use engine::{
    next_iteration, next_step, CompletionMarker, GroupReport, GroupRunner, IterationOutcome,
    RunError, StepDescriptor, StepOutcome, TestRow,
};
pub use model::{GroupRequest, Step, TestGroup, TestPlan, WILDCARD};
pub use scenario::{ScenarioId, ScenarioRecord, ScenarioStatus};
pub use schedule::{resolve, ResolutionError, Resolver};
