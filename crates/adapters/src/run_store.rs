//! An in-memory, version-checked `RunStore`. Grounded on
//! `gateway::runtime::runs::{RunStore, RunStoreInner}`'s bounded ring
//! (`VecDeque` + `HashMap` index, `base_seq` offset) — generalized from
//! the teacher's JSONL-backed persistence (out of scope here; see
//! SPEC_FULL.md §1) down to the pure in-memory shape, keeping the same
//! O(1)-eviction data structure.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::RwLock;
use reactor_domain::{OrchestratorError, RunId, RunState};
use reactor_runner::RunStore;

const DEFAULT_CAPACITY: usize = 2000;

struct Inner {
    runs: VecDeque<RunState>,
    index: HashMap<RunId, usize>,
    base_seq: usize,
    capacity: usize,
}

impl Inner {
    fn new(capacity: usize) -> Self {
        Self { runs: VecDeque::new(), index: HashMap::new(), base_seq: 0, capacity }
    }

    fn deque_idx(&self, seq: usize) -> usize {
        seq - self.base_seq
    }

    fn get(&self, run_id: &RunId) -> Option<&RunState> {
        let seq = *self.index.get(run_id)?;
        self.runs.get(self.deque_idx(seq))
    }

    fn get_mut(&mut self, run_id: &RunId) -> Option<&mut RunState> {
        let seq = *self.index.get(run_id)?;
        let idx = self.deque_idx(seq);
        self.runs.get_mut(idx)
    }

    fn push_back(&mut self, state: RunState) {
        let seq = self.base_seq + self.runs.len();
        self.index.insert(state.run_id.clone(), seq);
        self.runs.push_back(state);
        while self.runs.len() > self.capacity {
            if let Some(evicted) = self.runs.pop_front() {
                self.index.remove(&evicted.run_id);
                self.base_seq += 1;
            }
        }
    }
}

/// Reference `RunStore` implementation: an in-memory bounded ring, no
/// durability across process restarts. Suitable for tests and as a
/// drop-in for hosts that don't need a durable backend.
pub struct InMemoryRunStore {
    inner: RwLock<Inner>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { inner: RwLock::new(Inner::new(capacity.max(1))) }
    }
}

impl Default for InMemoryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn load(&self, run_id: &RunId) -> Result<Option<RunState>, OrchestratorError> {
        // Deep-clone at the boundary: callers must never be able to
        // mutate the store's copy through the value they read back.
        Ok(self.inner.read().get(run_id).cloned())
    }

    async fn insert(&self, state: RunState) -> Result<RunState, OrchestratorError> {
        if state.version != 0 {
            return Err(OrchestratorError::RunStateInvalid {
                run_id: state.run_id.as_str().to_string(),
                reason: "insert requires version 0 on an unknown run id".into(),
            });
        }
        let mut inner = self.inner.write();
        if inner.get(&state.run_id).is_some() {
            return Err(OrchestratorError::RunStateInvalid {
                run_id: state.run_id.as_str().to_string(),
                reason: "a run with this id already exists".into(),
            });
        }
        let mut stored = state;
        stored.version = 1;
        inner.push_back(stored.clone());
        Ok(stored)
    }

    async fn save(&self, state: RunState) -> Result<RunState, OrchestratorError> {
        let mut inner = self.inner.write();
        let existing = inner
            .get(&state.run_id)
            .ok_or_else(|| OrchestratorError::RunNotFound { run_id: state.run_id.as_str().to_string() })?;
        if existing.version != state.version {
            return Err(OrchestratorError::RunVersionConflict {
                run_id: state.run_id.as_str().to_string(),
                expected: state.version,
                actual: existing.version,
            });
        }
        let mut next = state;
        next.version += 1;
        if let Some(slot) = inner.get_mut(&next.run_id) {
            *slot = next.clone();
        }
        Ok(next)
    }
}
