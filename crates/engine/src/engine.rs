//! The ReAct engine — one dispatched slice of a run's execution.
//! Grounded on `gateway::runtime::turn::{run_turn_inner, TurnContext,
//! TurnEvent}`: the `for loop_idx in 0..MAX_TOOL_LOOPS` structure, the
//! concurrent tool dispatch via `futures_util::future::join_all`, and
//! the "only one hard error path, everything else normalizes to a
//! terminal run state" shape are all carried over from there.

use std::sync::Arc;

use reactor_domain::{
    tool_call_fingerprint, Event, FailureReason, Message, OrchestratorConfig, OrchestratorError,
    PendingRequirement, RequirementOrigin, Resolution, RunState, RunStatus, ToolCall,
    ToolDefinition, ToolResult,
};

use crate::model::{Model, ModelRequest};
use crate::schema::validate_arguments;
use crate::tool_executor::{ToolExecutor, ToolOutcome};

/// The engine's default step budget, used whenever a caller supplies
/// `max_steps == 0`.
pub const DEFAULT_MAX_STEPS: usize = 8;

/// Identifies the one tool call an approved-tool-call replay must
/// re-execute before the model is invoked again. The engine always
/// reconstructs the call's arguments from the transcript's original
/// assistant message, never from the `PendingRequirement`, and verifies
/// `fingerprint` still matches before dispatching anything.
#[derive(Debug, Clone)]
pub struct ApprovedReplay {
    pub tool_call_id: String,
    pub fingerprint: String,
}

/// What the engine needs beyond the run's own persisted state: the
/// tool catalog in effect for this slice, the effective step budget (0
/// meaning "use the default"), a resolution to apply first if the run
/// was suspended, and an optional approved-tool-call replay.
pub struct EngineInput {
    pub max_steps: usize,
    pub tools: Vec<ToolDefinition>,
    pub resolution: Option<Resolution>,
    pub replay: Option<ApprovedReplay>,
}

/// The result of running one slice: the updated run state plus the
/// ordered events that occurred, which the caller (the Runner) is
/// responsible for forwarding to an `EventSink` in this exact order.
pub struct EngineOutput {
    pub state: RunState,
    pub events: Vec<Event>,
}

/// Grounded on `TurnContext` holding `provider: Arc<dyn
/// sa_providers::LlmProvider>`: the engine is wired against trait
/// objects, not generics, so a `Runner` can hold one `ReactEngine`
/// regardless of which concrete model/tool adapters are plugged in.
pub struct ReactEngine {
    model: Arc<dyn Model>,
    tool_executor: Arc<dyn ToolExecutor>,
    #[allow(dead_code)]
    config: OrchestratorConfig,
}

impl ReactEngine {
    pub fn new(model: Arc<dyn Model>, tool_executor: Arc<dyn ToolExecutor>, config: OrchestratorConfig) -> Self {
        Self { model, tool_executor, config }
    }

    /// Run one slice to completion, suspension, or max-steps exhaustion.
    /// `Err` is reserved for precondition violations that leave `state`
    /// untouched — every other outcome (model/tool failure, suspension,
    /// max-steps, success) comes back as `Ok` with the appropriate
    /// status set on `state`.
    pub async fn execute(&self, mut state: RunState, input: EngineInput) -> Result<EngineOutput, OrchestratorError> {
        reactor_domain::validate::validate_run_state(&state)?;
        reactor_domain::validate::validate_tool_definitions(&input.tools)?;
        reactor_domain::validate::validate_requirement(state.pending.as_ref(), input.resolution.as_ref())?;

        if let Some(resolution) = &input.resolution {
            let pending = state.pending.as_ref().expect("checked by validate_requirement");
            reactor_domain::validate::validate_resolution(pending, resolution)?;
        }

        let mut events = Vec::new();
        let from_status = state.status;
        state.status = reactor_domain::lifecycle::transition(&state.run_id, from_status, RunStatus::Running)?;

        if let Some(resolution) = input.resolution {
            state.pending = None;
            state.transcript.push(Message::user(resolution.encode()));
        }

        if let Some(replay) = input.replay {
            self.replay_approved_tool_call(&mut state, &input.tools, &replay, &mut events).await?;
        }

        let effective_max_steps = if input.max_steps == 0 { DEFAULT_MAX_STEPS } else { input.max_steps };

        while state.step < effective_max_steps {
            state.step += 1;

            let request = ModelRequest { messages: state.transcript.clone(), tools: input.tools.clone() };
            let response = match self.model.generate(request).await {
                Ok(r) => r,
                Err(err) => {
                    state.status = RunStatus::Failed;
                    state.error = Some(err.to_string());
                    tracing::warn!(run_id = %state.run_id, step = state.step, error = %err, "run failed, model generate returned an error");
                    events.push(Event::RunFailed { run_id: state.run_id.clone(), step: state.step, message: state.error.clone().unwrap() });
                    return Ok(EngineOutput { state, events });
                }
            };

            let requirement_for_message = response.requirement.as_ref().map(|draft| PendingRequirement {
                id: format!("{}-req-{}", state.run_id, state.step),
                kind: draft.kind,
                origin: RequirementOrigin::Model,
                tool_call_id: None,
                fingerprint: None,
                prompt: draft.prompt.clone(),
            });

            let assistant_message = match &requirement_for_message {
                Some(requirement) => {
                    Message::assistant_with_requirement(response.content.clone(), response.tool_calls.clone(), requirement.clone())
                }
                None => Message::assistant_tool_calls(response.content.clone(), response.tool_calls.clone()),
            };
            state.transcript.push(assistant_message.clone());
            events.push(Event::AssistantMessage { run_id: state.run_id.clone(), step: state.step, message: assistant_message });

            if requirement_for_message.is_some() && !response.tool_calls.is_empty() {
                state.status = RunStatus::Failed;
                state.error = Some("model response cannot carry both tool calls and a requirement".to_string());
                tracing::warn!(run_id = %state.run_id, step = state.step, "run failed, assistant message carried both tool calls and a requirement");
                events.push(Event::RunFailed { run_id: state.run_id.clone(), step: state.step, message: state.error.clone().unwrap() });
                return Ok(EngineOutput { state, events });
            }

            if let Some(requirement) = requirement_for_message {
                reactor_domain::validate::validate_pending_requirement_contract(&state.run_id, &requirement)?;
                tracing::info!(run_id = %state.run_id, step = state.step, kind = ?requirement.kind, "suspending run, model raised a requirement");
                state.pending = Some(requirement);
                state.status = RunStatus::Suspended;
                events.push(Event::RunSuspended { run_id: state.run_id.clone(), step: state.step });
                return Ok(EngineOutput { state, events });
            }

            if response.tool_calls.is_empty() {
                state.status = RunStatus::Completed;
                state.output = response.content.clone();
                events.push(Event::RunCompleted { run_id: state.run_id.clone(), step: state.step });
                return Ok(EngineOutput { state, events });
            }

            if self.dispatch_tool_batch(&mut state, &input.tools, &response.tool_calls, &mut events).await? {
                // dispatch_tool_batch returns true when a suspension
                // occurred and already updated `state`/`events`.
                return Ok(EngineOutput { state, events });
            }
        }

        state.status = RunStatus::MaxStepsExceeded;
        state.error = Some(format!("max steps exceeded: step={} max_steps={}", state.step, effective_max_steps));
        tracing::warn!(run_id = %state.run_id, step = state.step, max_steps = effective_max_steps, "run exceeded its step budget");
        events.push(Event::RunFailed { run_id: state.run_id.clone(), step: state.step, message: state.error.clone().unwrap() });
        Ok(EngineOutput { state, events })
    }

    /// Replay exactly one tool execution after a tool-origin suspension
    /// is approved, reconstructing its arguments from the transcript's
    /// original assistant message rather than the `PendingRequirement`.
    async fn replay_approved_tool_call(
        &self,
        state: &mut RunState,
        tools: &[ToolDefinition],
        replay: &ApprovedReplay,
        events: &mut Vec<Event>,
    ) -> Result<(), OrchestratorError> {
        let call = state
            .transcript
            .iter()
            .rev()
            .find_map(|m| m.tool_calls().iter().find(|tc| tc.call_id == replay.tool_call_id))
            .cloned()
            .ok_or_else(|| OrchestratorError::RunStateInvalid {
                run_id: state.run_id.as_str().to_string(),
                reason: format!("approved replay references unknown tool_call_id={}", replay.tool_call_id),
            })?;

        if tool_call_fingerprint(&call) != replay.fingerprint {
            return Err(OrchestratorError::RunStateInvalid {
                run_id: state.run_id.as_str().to_string(),
                reason: "approved replay fingerprint does not match the original tool call".into(),
            });
        }

        let outcome = self.dispatch_one(tools, &call).await;
        let result = match outcome {
            ToolOutcome::Completed(result) => Self::normalize_tool_result(&call, result),
            ToolOutcome::Suspend { .. } => {
                return Err(OrchestratorError::EngineOutputContractViolation {
                    run_id: state.run_id.as_str().to_string(),
                    reason: "tool suspended again immediately after its approval was replayed".into(),
                });
            }
        };
        state.transcript.push(Message::tool_result(result.clone()));
        events.push(Event::ToolResult { run_id: state.run_id.clone(), step: state.step, result });
        Ok(())
    }

    /// Fills an empty `call_id`/`tool_name` on the executor's result
    /// from the originating call; a non-empty mismatch on either field
    /// is not trusted and is turned into a synthesized
    /// `FailureReason::ExecutorError` instead of being recorded as-is.
    fn normalize_tool_result(call: &ToolCall, result: ToolResult) -> ToolResult {
        let call_id = if result.call_id.is_empty() { call.call_id.clone() } else { result.call_id };
        let tool_name = if result.tool_name.is_empty() { call.tool_name.clone() } else { result.tool_name };

        if call_id != call.call_id || tool_name != call.tool_name {
            return ToolResult::failed(
                call.call_id.clone(),
                call.tool_name.clone(),
                FailureReason::ExecutorError {
                    detail: format!(
                        "executor returned call_id={call_id:?} tool_name={tool_name:?}, expected call_id={:?} tool_name={:?}",
                        call.call_id, call.tool_name
                    ),
                },
            );
        }

        ToolResult { call_id, tool_name, output: result.output, failure: result.failure }
    }

    async fn dispatch_one(&self, tools: &[ToolDefinition], call: &ToolCall) -> ToolOutcome {
        let known = tools.iter().any(|t| t.name == call.tool_name);
        if !known {
            return ToolOutcome::Completed(crate::tool_executor::unknown_tool_result(call));
        }
        self.tool_executor.execute(call).await
    }

    /// Dispatch every tool call in one assistant message's batch
    /// concurrently, then fold the results back in call order. Returns
    /// `Ok(true)` if the run is now suspended (caller should stop the
    /// loop), `Ok(false)` if the loop should continue to the next
    /// model-generate iteration.
    async fn dispatch_tool_batch(
        &self,
        state: &mut RunState,
        tools: &[ToolDefinition],
        calls: &[ToolCall],
        events: &mut Vec<Event>,
    ) -> Result<bool, OrchestratorError> {
        tracing::debug!(run_id = %state.run_id, step = state.step, batch_size = calls.len(), "dispatching tool call batch");

        // Pre-flight argument validation happens before any dispatch;
        // calls that fail it are never handed to the executor.
        let mut futures = Vec::with_capacity(calls.len());
        for call in calls {
            let def = tools.iter().find(|t| t.name == call.tool_name);
            match def {
                None => futures.push(precomputed(ToolOutcome::Completed(crate::tool_executor::unknown_tool_result(call)))),
                Some(def) if !validate_arguments(&def.input_schema, &call.arguments) => {
                    let failure = ToolResult::failed(
                        call.call_id.clone(),
                        call.tool_name.clone(),
                        FailureReason::InvalidArguments { detail: "arguments do not match tool input_schema".into() },
                    );
                    futures.push(precomputed(ToolOutcome::Completed(failure)));
                }
                Some(_) => futures.push(dispatch(self, call)),
            }
        }

        let results = futures_util::future::join_all(futures).await;

        // Find the first call that requires suspension, in call order;
        // calls after it in the same batch are discarded entirely.
        let suspend_at = results.iter().position(|r| matches!(r, ToolOutcome::Suspend { .. }));
        let take_through = suspend_at.map(|i| i + 1).unwrap_or(calls.len());

        for (call, outcome) in calls.iter().zip(results.into_iter()).take(take_through) {
            match outcome {
                ToolOutcome::Completed(result) => {
                    let result = Self::normalize_tool_result(call, result);
                    state.transcript.push(Message::tool_result(result.clone()));
                    events.push(Event::ToolResult { run_id: state.run_id.clone(), step: state.step, result });
                }
                ToolOutcome::Suspend { kind, fingerprint, prompt } => {
                    let fingerprint = fingerprint.unwrap_or_else(|| tool_call_fingerprint(call));
                    let marker = ToolResult::failed(call.call_id.clone(), call.tool_name.clone(), FailureReason::Suspended);
                    state.transcript.push(Message::tool_result(marker.clone()));
                    events.push(Event::ToolResult { run_id: state.run_id.clone(), step: state.step, result: marker });

                    let requirement = PendingRequirement {
                        id: format!("{}-req-{}", state.run_id, state.step),
                        kind,
                        origin: RequirementOrigin::Tool,
                        tool_call_id: Some(call.call_id.clone()),
                        fingerprint: Some(fingerprint),
                        prompt,
                    };
                    reactor_domain::validate::validate_pending_requirement_contract(&state.run_id, &requirement)?;
                    tracing::info!(run_id = %state.run_id, step = state.step, call_id = %call.call_id, "suspending run, tool raised a requirement");
                    state.pending = Some(requirement);
                    state.status = RunStatus::Suspended;
                    events.push(Event::RunSuspended { run_id: state.run_id.clone(), step: state.step });
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

// Small helpers keeping `dispatch_tool_batch`'s future list homogeneous
// without boxing every branch explicitly at each call site.
fn precomputed(outcome: ToolOutcome) -> std::pin::Pin<Box<dyn std::future::Future<Output = ToolOutcome> + Send>> {
    Box::pin(async move { outcome })
}

fn dispatch<'a>(engine: &'a ReactEngine, call: &'a ToolCall) -> std::pin::Pin<Box<dyn std::future::Future<Output = ToolOutcome> + Send + 'a>> {
    Box::pin(async move { engine.tool_executor.execute(call).await })
}
