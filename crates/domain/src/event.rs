//! The event vocabulary emitted through an `EventSink`. Grounded on
//! `gateway::runtime::runs::RunEvent`, a tagged enum shaped for direct
//! SSE/JSON emission; this version is pinned to the closed nine-type
//! set this system publishes, with per-variant field presence the
//! orchestrator's transcript consumers can rely on.

use crate::error::OrchestratorError;
use crate::message::Message;
use crate::run::RunId;
use crate::tool::ToolResult;
use serde::{Deserialize, Serialize};

/// The command family a `CommandApplied` event reports on, used for
/// observability without re-deriving it from the command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Start,
    Continue,
    Cancel,
    Steer,
    FollowUp,
}

/// One observable occurrence during a run's lifetime. Every variant
/// carries `run_id` so a subscriber fanning in multiple runs never has
/// to thread it separately. The ordering guarantee within one
/// dispatched slice is `RunStarted? -> (AssistantMessage | ToolResult)*
/// -> (RunCompleted | RunFailed | RunSuspended | RunCancelled)? ->
/// RunCheckpoint -> CommandApplied`, except `Cancel`, which emits only
/// `RunCancelled -> CommandApplied`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RunStarted { run_id: RunId, step: usize },
    AssistantMessage { run_id: RunId, step: usize, message: Message },
    ToolResult { run_id: RunId, step: usize, result: ToolResult },
    RunCompleted { run_id: RunId, step: usize },
    RunFailed { run_id: RunId, step: usize, message: String },
    RunSuspended { run_id: RunId, step: usize },
    RunCancelled { run_id: RunId, step: usize },
    RunCheckpoint { run_id: RunId, step: usize },
    CommandApplied { run_id: RunId, step: usize, command: CommandKind },
}

impl Event {
    pub fn run_id(&self) -> &RunId {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::AssistantMessage { run_id, .. }
            | Event::ToolResult { run_id, .. }
            | Event::RunCompleted { run_id, .. }
            | Event::RunFailed { run_id, .. }
            | Event::RunSuspended { run_id, .. }
            | Event::RunCancelled { run_id, .. }
            | Event::RunCheckpoint { run_id, .. }
            | Event::CommandApplied { run_id, .. } => run_id,
        }
    }

    pub fn step(&self) -> usize {
        match self {
            Event::RunStarted { step, .. }
            | Event::AssistantMessage { step, .. }
            | Event::ToolResult { step, .. }
            | Event::RunCompleted { step, .. }
            | Event::RunFailed { step, .. }
            | Event::RunSuspended { step, .. }
            | Event::RunCancelled { step, .. }
            | Event::RunCheckpoint { step, .. }
            | Event::CommandApplied { step, .. } => *step,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run_started",
            Event::AssistantMessage { .. } => "assistant_message",
            Event::ToolResult { .. } => "tool_result",
            Event::RunCompleted { .. } => "run_completed",
            Event::RunFailed { .. } => "run_failed",
            Event::RunSuspended { .. } => "run_suspended",
            Event::RunCancelled { .. } => "run_cancelled",
            Event::RunCheckpoint { .. } => "run_checkpoint",
            Event::CommandApplied { .. } => "command_applied",
        }
    }
}

/// Structural validation beyond what the type system already
/// guarantees: `run_id` must be non-empty, `RunStarted` must report
/// `step == 0`, an `AssistantMessage` must actually wrap an assistant
/// role message, and a `ToolResult` event's result must carry a
/// non-empty `call_id`/`tool_name`.
pub fn validate_event(event: &Event) -> Result<(), OrchestratorError> {
    if event.run_id().as_str().is_empty() {
        return Err(OrchestratorError::EventInvalid {
            event_type: event.type_name().into(),
            reason: "run_id must not be empty".into(),
        });
    }
    match event {
        Event::RunStarted { step, .. } if *step != 0 => {
            return Err(OrchestratorError::EventInvalid {
                event_type: event.type_name().into(),
                reason: "run_started must report step 0".into(),
            });
        }
        Event::AssistantMessage { message, .. } if message.role() != crate::message::Role::Assistant => {
            return Err(OrchestratorError::EventInvalid {
                event_type: event.type_name().into(),
                reason: "assistant_message must wrap an assistant-role message".into(),
            });
        }
        Event::ToolResult { result, .. } if result.call_id.is_empty() || result.tool_name.is_empty() => {
            return Err(OrchestratorError::EventInvalid {
                event_type: event.type_name().into(),
                reason: "tool_result must carry a non-empty call_id and tool_name".into(),
            });
        }
        _ => {}
    }
    Ok(())
}
