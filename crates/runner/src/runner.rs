//! The Runner: command dispatch, precondition checks, optimistic-
//! concurrency persistence, idempotent replay, and event choreography.
//! Grounded on `run_turn`/`run_turn_inner`'s top-level shape (create or
//! load a run, call into the engine, persist, emit, clean up) and on
//! `cancel.rs`'s `CancelMap` for why cancellation bypasses the engine
//! entirely rather than being threaded through it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reactor_domain::{
    CommandKind, Event, OrchestratorConfig, OrchestratorError, RequirementKind, RequirementOrigin,
    ResolutionOutcome, RunId, RunState, RunStatus, ToolDefinition,
};
use reactor_engine::{EngineInput, ReactEngine};

use crate::bounded::BoundedMap;
use crate::command::Command;
use crate::traits::{EventSink, IdGenerator, RunStore};

/// The outcome of one dispatched command.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub run_id: RunId,
    pub state: RunState,
}

/// The full result of a `dispatch` call. `error` carries a run-level
/// terminal failure (e.g. the engine's own `RunFailed`) or a non-fatal
/// `EventPublish` failure, joined via `OrchestratorError::combine` when
/// both occur; `Err` from `dispatch` itself is reserved for
/// preconditions that left no side effect (validation, lifecycle
/// gating, engine-output-contract violations, save conflicts the
/// caller must retry).
#[derive(Debug)]
pub struct Dispatched {
    pub result: RunResult,
    pub error: Option<OrchestratorError>,
}

struct ToolCatalog {
    tools: RwLock<HashMap<RunId, Vec<ToolDefinition>>>,
}

impl ToolCatalog {
    fn new() -> Self {
        Self { tools: RwLock::new(HashMap::new()) }
    }

    fn set(&self, run_id: RunId, tools: Vec<ToolDefinition>) {
        self.tools.write().insert(run_id, tools);
    }

    fn get(&self, run_id: &RunId) -> Vec<ToolDefinition> {
        self.tools.read().get(run_id).cloned().unwrap_or_default()
    }
}

pub struct Runner {
    store: Arc<dyn RunStore>,
    sink: Arc<dyn EventSink>,
    id_gen: Arc<dyn IdGenerator>,
    engine: Arc<ReactEngine>,
    config: OrchestratorConfig,
    tools_by_run: ToolCatalog,
    /// Keyed by run id; only `Continue` commands consult or populate
    /// this, since only `Continue` carries a `command_id` at all.
    idempotency: RwLock<BoundedMap<RunId, (String, RunResult)>>,
}

impl Runner {
    pub fn new(
        store: Arc<dyn RunStore>,
        sink: Arc<dyn EventSink>,
        id_gen: Arc<dyn IdGenerator>,
        engine: Arc<ReactEngine>,
        config: OrchestratorConfig,
    ) -> Self {
        let capacity = config.idempotency_cache_capacity;
        Self {
            store,
            sink,
            id_gen,
            engine,
            config,
            tools_by_run: ToolCatalog::new(),
            idempotency: RwLock::new(BoundedMap::new(capacity.max(1))),
        }
    }

    /// Dispatch one command. See [`Dispatched`] for the error-boundary
    /// contract.
    pub async fn dispatch(&self, command: Command) -> Result<Dispatched, OrchestratorError> {
        if let Some(run_id) = command.run_id() {
            if run_id.as_str().is_empty() {
                return Err(OrchestratorError::InvalidRunId);
            }
        }

        if let Command::Continue { run_id, command_id: Some(command_id), .. } = &command {
            if let Some((cached_cmd_id, cached)) = self.idempotency.read().get(run_id).cloned() {
                if &cached_cmd_id == command_id {
                    return Ok(Dispatched { result: cached, error: None });
                }
            }
        }

        let dispatched = match command.clone() {
            Command::Start { run_id, system_prompt, user_prompt, max_steps, tools } => {
                self.dispatch_start(run_id, system_prompt, user_prompt, max_steps, tools).await?
            }
            Command::Continue { run_id, max_steps, tools, resolution, .. } => {
                self.dispatch_continue(run_id, max_steps, tools, resolution).await?
            }
            Command::Cancel { run_id } => self.dispatch_cancel(run_id).await?,
            Command::Steer { run_id, instruction } => self.dispatch_steer(run_id, instruction).await?,
            Command::FollowUp { run_id, user_prompt, max_steps, tools } => {
                self.dispatch_follow_up(run_id, user_prompt, max_steps, tools).await?
            }
        };

        if let Command::Continue { command_id: Some(command_id), .. } = &command {
            self.idempotency.write().put(dispatched.result.run_id.clone(), (command_id.clone(), dispatched.result.clone()));
        }

        Ok(dispatched)
    }

    /// Persist `state`, normalizing a `RunVersionConflict` from the
    /// store into `CommandConflict` so callers can discover the
    /// underlying conflict via `Is` while reacting to the normalized
    /// kind, per the spec's save-conflict normalization rule. Any other
    /// save failure is returned unchanged.
    async fn save(&self, state: RunState) -> Result<RunState, OrchestratorError> {
        let run_id = state.run_id.clone();
        self.store.save(state).await.map_err(|err| {
            if err.is(reactor_domain::ErrorKind::RunVersionConflict) {
                OrchestratorError::CommandConflict { run_id: run_id.as_str().to_string(), source: Box::new(err) }
            } else {
                err
            }
        })
    }

    async fn publish(&self, event: Event) -> Option<OrchestratorError> {
        if let Err(err) = reactor_domain::event::validate_event(&event) {
            return Some(err);
        }
        match self.sink.publish(event).await {
            Ok(()) => None,
            Err(err) => Some(err),
        }
    }

    async fn publish_all(&self, events: Vec<Event>) -> Option<OrchestratorError> {
        let mut combined: Option<OrchestratorError> = None;
        for event in events {
            if let Some(err) = self.publish(event).await {
                combined = Some(match combined {
                    Some(existing) => existing.combine(err),
                    None => err,
                });
            }
        }
        combined
    }

    /// Run one engine slice, enforce the engine-output contract against
    /// the state it was handed, persist, and publish the ordering
    /// `leading_events ++ engine events ++ [RunCheckpoint, CommandApplied]`.
    async fn run_slice(
        &self,
        prev: RunState,
        engine_input: EngineInput,
        kind: CommandKind,
        leading_events: Vec<Event>,
    ) -> Result<Dispatched, OrchestratorError> {
        let run_id = prev.run_id.clone();
        let prev_for_contract = prev.clone();
        let output = self.engine.execute(prev, engine_input).await?;
        validate_engine_output_contract(&prev_for_contract, &output.state)?;

        let saved = self.save(output.state).await?;

        let mut events = leading_events;
        events.extend(output.events);
        events.push(Event::RunCheckpoint { run_id: run_id.clone(), step: saved.step });
        events.push(Event::CommandApplied { run_id: run_id.clone(), step: saved.step, command: kind });

        let publish_err = self.publish_all(events).await;
        let result = RunResult { run_id, state: saved };
        Ok(Dispatched { result, error: publish_err })
    }

    async fn dispatch_start(
        &self,
        run_id: Option<RunId>,
        system_prompt: Option<String>,
        user_prompt: Option<String>,
        max_steps: usize,
        tools: Vec<ToolDefinition>,
    ) -> Result<Dispatched, OrchestratorError> {
        reactor_domain::validate::validate_tool_definitions(&tools)?;

        let run_id = match run_id {
            Some(run_id) => run_id,
            None => {
                let generated = self.id_gen.generate();
                if generated.is_empty() {
                    return Err(OrchestratorError::InvalidRunId);
                }
                RunId::new(generated)
            }
        };
        tracing::info!(%run_id, "starting run");
        let state = RunState::new_pending(run_id.clone(), system_prompt, user_prompt);
        let inserted = self.store.insert(state).await?;
        self.tools_by_run.set(run_id.clone(), tools.clone());

        let leading = vec![Event::RunStarted { run_id: run_id.clone(), step: 0 }];
        let engine_input = EngineInput { max_steps, tools, resolution: None, replay: None };
        self.run_slice(inserted, engine_input, CommandKind::Start, leading).await
    }

    async fn dispatch_continue(
        &self,
        run_id: RunId,
        max_steps: usize,
        tools: Option<Vec<ToolDefinition>>,
        resolution: Option<reactor_domain::Resolution>,
    ) -> Result<Dispatched, OrchestratorError> {
        let mut state = self.load_required(&run_id).await?;
        if state.status.is_terminal() {
            tracing::warn!(%run_id, status = %state.status, "continue rejected, run is terminal");
            return Err(OrchestratorError::RunNotContinuable { run_id: run_id.as_str().to_string(), status: state.status.to_string() });
        }
        reactor_domain::validate::validate_requirement(state.pending.as_ref(), resolution.as_ref())?;

        let effective_tools = match tools {
            Some(tools) => {
                reactor_domain::validate::validate_tool_definitions(&tools)?;
                self.tools_by_run.set(run_id.clone(), tools.clone());
                tools
            }
            None => self.tools_by_run.get(&run_id),
        };

        // The Runner performs the Suspended/MaxStepsExceeded -> Running
        // move itself before invoking the engine, which then finds the
        // run already Running (an identity transition, see
        // `lifecycle::is_allowed_transition`). The engine clears
        // `pending` once it applies the resolution. A tool-origin
        // requirement replays its original call once resolved, with one
        // exception: an `Approval` requirement the caller rejected must
        // not re-execute the call it was blocking.
        let replay = match (&state.pending, &resolution) {
            (Some(pending), Some(resolution)) if pending.tool_call_id.is_some() => {
                let rejected_approval = pending.kind == RequirementKind::Approval && resolution.outcome == ResolutionOutcome::Rejected;
                if rejected_approval {
                    None
                } else {
                    Some(reactor_engine::ApprovedReplay {
                        tool_call_id: pending.tool_call_id.clone().unwrap(),
                        fingerprint: pending.fingerprint.clone().unwrap_or_default(),
                    })
                }
            }
            _ => None,
        };
        state.status = reactor_domain::lifecycle::transition(&run_id, state.status, RunStatus::Running)?;

        let engine_input = EngineInput { max_steps, tools: effective_tools, resolution, replay };
        self.run_slice(state, engine_input, CommandKind::Continue, Vec::new()).await
    }

    async fn dispatch_cancel(&self, run_id: RunId) -> Result<Dispatched, OrchestratorError> {
        let mut state = self.load_required(&run_id).await?;
        if state.status.is_terminal() {
            return Err(OrchestratorError::RunNotCancellable { run_id: run_id.as_str().to_string(), status: state.status.to_string() });
        }
        let from = state.status;
        tracing::info!(%run_id, %from, "cancelling run");
        state.status = reactor_domain::lifecycle::transition(&run_id, from, RunStatus::Cancelled)?;
        state.pending = None;
        let saved = self.save(state).await?;
        // Cancel's ordering guarantee is exactly RunCancelled ->
        // CommandApplied: no RunCheckpoint, and no engine slice runs.
        let publish_err = self
            .publish_all(vec![
                Event::RunCancelled { run_id: run_id.clone(), step: saved.step },
                Event::CommandApplied { run_id: run_id.clone(), step: saved.step, command: CommandKind::Cancel },
            ])
            .await;
        Ok(Dispatched { result: RunResult { run_id, state: saved }, error: publish_err })
    }

    async fn dispatch_steer(&self, run_id: RunId, instruction: String) -> Result<Dispatched, OrchestratorError> {
        let mut state = self.load_required(&run_id).await?;
        // Steer requires the run be neither terminal nor suspended: a
        // suspended run must be resolved via Continue, not steered.
        if state.status.is_terminal() {
            return Err(OrchestratorError::RunNotContinuable { run_id: run_id.as_str().to_string(), status: state.status.to_string() });
        }
        if state.status == RunStatus::Suspended {
            return Err(OrchestratorError::ResolutionRequired { run_id: run_id.as_str().to_string() });
        }
        state.transcript.push(reactor_domain::Message::user(instruction));
        let saved = self.save(state).await?;
        // Steer never invokes the engine: it only appends a message and
        // checkpoints, the way the spec's ordering guarantee pins its
        // event sequence to RunCheckpoint -> CommandApplied with no
        // engine-sourced events in between.
        let publish_err = self
            .publish_all(vec![
                Event::RunCheckpoint { run_id: run_id.clone(), step: saved.step },
                Event::CommandApplied { run_id: run_id.clone(), step: saved.step, command: CommandKind::Steer },
            ])
            .await;
        Ok(Dispatched { result: RunResult { run_id, state: saved }, error: publish_err })
    }

    async fn dispatch_follow_up(
        &self,
        run_id: RunId,
        user_prompt: String,
        max_steps: usize,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<Dispatched, OrchestratorError> {
        let mut state = self.load_required(&run_id).await?;
        // FollowUp's gates are exactly Steer's: terminal is not
        // continuable, and a suspended run still needs its resolution
        // via Continue first. FollowUp differs from Steer only in that
        // it runs an engine slice after appending the message.
        if state.status.is_terminal() {
            return Err(OrchestratorError::RunNotContinuable { run_id: run_id.as_str().to_string(), status: state.status.to_string() });
        }
        if state.status == RunStatus::Suspended {
            return Err(OrchestratorError::ResolutionRequired { run_id: run_id.as_str().to_string() });
        }

        let effective_tools = match tools {
            Some(tools) => {
                reactor_domain::validate::validate_tool_definitions(&tools)?;
                self.tools_by_run.set(run_id.clone(), tools.clone());
                tools
            }
            None => self.tools_by_run.get(&run_id),
        };

        state.transcript.push(reactor_domain::Message::user(user_prompt));
        state.status = reactor_domain::lifecycle::transition(&run_id, state.status, RunStatus::Running)?;

        let engine_input = EngineInput { max_steps, tools: effective_tools, resolution: None, replay: None };
        self.run_slice(state, engine_input, CommandKind::FollowUp, Vec::new()).await
    }

    async fn load_required(&self, run_id: &RunId) -> Result<RunState, OrchestratorError> {
        self.store
            .load(run_id)
            .await?
            .ok_or_else(|| OrchestratorError::RunNotFound { run_id: run_id.as_str().to_string() })
    }
}

/// The Runner's independent check on every engine-returned state,
/// regardless of how much the engine itself already validates: the id
/// must be unchanged, `step` must not regress, the transcript may only
/// grow and never rewrite an already-recorded prefix, and a
/// newly-suspended run must carry a `pending` requirement consistent
/// with its origin. A violation discards the engine's output entirely
/// — nothing is persisted or published.
fn validate_engine_output_contract(prev: &RunState, next: &RunState) -> Result<(), OrchestratorError> {
    let violation = |reason: &str| {
        OrchestratorError::EngineOutputContractViolation { run_id: prev.run_id.as_str().to_string(), reason: reason.to_string() }
    };

    if next.run_id != prev.run_id {
        return Err(violation("engine output run_id does not match the state it was given"));
    }
    if next.step < prev.step {
        return Err(violation("engine output step regressed"));
    }
    if next.transcript.len() < prev.transcript.len() {
        return Err(violation("engine output transcript shrank"));
    }
    if next.transcript[..prev.transcript.len()] != prev.transcript[..] {
        return Err(violation("engine output rewrote an already-recorded transcript prefix"));
    }
    if next.status == RunStatus::Suspended {
        match &next.pending {
            None => return Err(violation("engine output is suspended but carries no pending requirement")),
            Some(pending) => {
                reactor_domain::validate::validate_pending_requirement_contract(&next.run_id, pending)?;
                match pending.origin {
                    RequirementOrigin::Model => {
                        let carries_match = next
                            .transcript
                            .last()
                            .and_then(|m| m.requirement())
                            .is_some_and(|r| r.id == pending.id);
                        if !carries_match {
                            return Err(violation(
                                "suspended with origin=model but the last assistant message does not carry a matching requirement",
                            ));
                        }
                    }
                    RequirementOrigin::Tool => {
                        let Some(tool_call_id) = &pending.tool_call_id else {
                            return Err(violation("suspended with origin=tool but the pending requirement has no tool_call_id"));
                        };
                        let linked = next.transcript.iter().rev().any(|m| matches!(m, reactor_domain::Message::Tool { result } if &result.call_id == tool_call_id));
                        if !linked {
                            return Err(violation(
                                "suspended with origin=tool but no tool-observation message links to the pending requirement",
                            ));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
