//! A scripted `Model` double. Grounded on the hand-rolled fixtures in
//! `runs.rs`/`approval.rs`/`cancel.rs` (`make_store`, `make_pending`):
//! deterministic, pre-scripted responses rather than a real provider
//! call, so integration tests can assert on exact engine behavior.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use reactor_domain::OrchestratorError;
use reactor_engine::{Model, ModelRequest, ModelResponse};

/// Replays a fixed queue of responses, one per `generate` call, in
/// order. Panics with a clear message if the script runs out — a
/// scenario under-scripting its model turns is a test bug, not
/// something to paper over.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<ModelResponse, OrchestratorError>>>,
    requests_seen: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<ModelResponse, OrchestratorError>>) -> Self {
        Self { responses: Mutex::new(results.into_iter().collect()), requests_seen: Mutex::new(Vec::new()) }
    }

    /// Every `ModelRequest` this double has received, in call order —
    /// lets a test assert on the exact transcript the engine built.
    pub fn requests_seen(&self) -> Vec<ModelRequest> {
        self.requests_seen.lock().clone()
    }
}

#[async_trait]
impl Model for ScriptedModel {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, OrchestratorError> {
        self.requests_seen.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedModel: script exhausted, no response left to replay"))
    }
}
