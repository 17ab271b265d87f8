//! Trait boundaries the Runner depends on: persistence, event
//! publication, and ID generation. Grounded on
//! `gateway::runtime::runs::RunStore` (insert/update/get/persist/
//! subscribe/emit) and `approval::ApprovalStore`, generalized into
//! traits so `reactor-adapters` supplies in-memory reference
//! implementations while leaving room for a durable backend later —
//! exactly the boundary `sa_providers::LlmProvider` draws between the
//! gateway and concrete provider adapters.

use async_trait::async_trait;
use reactor_domain::{Event, OrchestratorError, RunId, RunState};

/// Optimistic-concurrency persistence for run state. Grounded on
/// `RunStore::update`'s closure-based mutation, reshaped into an
/// explicit save/load pair since the Runner needs to distinguish "no
/// such run" from "version conflict" as two different errors.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Load the current state of a run, if it exists.
    async fn load(&self, run_id: &RunId) -> Result<Option<RunState>, OrchestratorError>;

    /// Persist a brand-new run. Fails if a run with this id already
    /// exists.
    async fn insert(&self, state: RunState) -> Result<RunState, OrchestratorError>;

    /// Persist an update to an existing run, enforcing optimistic
    /// concurrency: `state.version` must equal the currently stored
    /// version, or this fails with `RunVersionConflict`. On success the
    /// returned state has `version` incremented by exactly one.
    async fn save(&self, state: RunState) -> Result<RunState, OrchestratorError>;
}

/// Event publication. Grounded on `RunStore::emit`'s broadcast-channel
/// fan-out, generalized into its own trait since the spec's `EventSink`
/// contract (validate-before-delegate, non-fatal failure wrapping) is
/// independent of where runs are persisted.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: Event) -> Result<(), OrchestratorError>;
}

/// Generates opaque, unique identifiers for runs and commands.
/// Grounded on the teacher's blanket use of `uuid::Uuid::new_v4()` at
/// every `Run::new`/cancel-token-registration call site.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}
