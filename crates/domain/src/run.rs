//! The run state machine's data model: `RunId`, `RunStatus`,
//! `PendingRequirement`, `Resolution`, and `RunState` itself. Grounded
//! on `gateway::runtime::runs::{Run, RunStatus}`, generalized from the
//! teacher's five-status set to the richer suspended/resolvable model
//! this system needs.

use crate::message::Message;
use crate::tool::ToolCall;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        RunId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        RunId(s)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        RunId(s.to_string())
    }
}

/// The run's current lifecycle position. `Running` is transient —
/// observers never persist a run while it sits in `Running`, it only
/// appears mid-slice. `MaxStepsExceeded` is deliberately non-terminal:
/// a run that hit its step budget is still continuable, unlike
/// `Failed`. See [`crate::lifecycle`] for the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Suspended,
    Cancelled,
    Completed,
    Failed,
    MaxStepsExceeded,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Suspended => "suspended",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::MaxStepsExceeded => "max_steps_exceeded",
        };
        write!(f, "{s}")
    }
}

/// Who raised the requirement that suspended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementOrigin {
    Model,
    Tool,
}

/// What kind of input is needed to unblock the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Approval,
    UserInput,
    ExternalExecution,
}

impl std::fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequirementKind::Approval => "approval",
            RequirementKind::UserInput => "user_input",
            RequirementKind::ExternalExecution => "external_execution",
        };
        write!(f, "{s}")
    }
}

/// A single outstanding requirement blocking a run in `Suspended`.
/// When `origin = Tool`, both `tool_call_id` and `fingerprint` must be
/// present so a later approved-tool-call replay can confirm it is
/// replaying the exact call that was blocked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRequirement {
    pub id: String,
    pub kind: RequirementKind,
    pub origin: RequirementOrigin,
    pub tool_call_id: Option<String>,
    pub fingerprint: Option<String>,
    pub prompt: Option<String>,
}

/// The outcome a caller supplies in a `Continue` command to resolve a
/// pending requirement. Which outcomes are legal depends on the
/// requirement's kind: `Approval` accepts `Approved`/`Rejected`,
/// `UserInput` accepts `Provided`, `ExternalExecution` accepts
/// `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Approved,
    Rejected,
    Provided,
    Completed,
}

impl std::fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResolutionOutcome::Approved => "approved",
            ResolutionOutcome::Rejected => "rejected",
            ResolutionOutcome::Provided => "provided",
            ResolutionOutcome::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub requirement_id: String,
    pub kind: RequirementKind,
    pub outcome: ResolutionOutcome,
    pub value: Option<String>,
}

impl Resolution {
    /// The user-visible transcript line appended when a suspended run
    /// resumes, so the conversation records what unblocked it.
    pub fn encode(&self) -> String {
        let mut s = format!(
            "[resolution] requirement_id=\"{}\" kind={} outcome={}",
            self.requirement_id, self.kind, self.outcome
        );
        if let Some(value) = &self.value {
            s.push_str(&format!(" value=\"{value}\""));
        }
        s
    }
}

/// The full persisted state of one run. `version` is the optimistic
/// concurrency token: every successful save increments it by exactly
/// one, and a save whose expected version does not match the stored
/// version fails with `RunVersionConflict` rather than overwriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: RunId,
    pub status: RunStatus,
    pub version: i64,
    pub step: usize,
    pub transcript: Vec<Message>,
    pub pending: Option<PendingRequirement>,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl RunState {
    pub fn new_pending(run_id: RunId, system_prompt: Option<String>, user_prompt: Option<String>) -> Self {
        let mut transcript = Vec::new();
        if let Some(system_prompt) = system_prompt {
            transcript.push(Message::system(system_prompt));
        }
        if let Some(user_prompt) = user_prompt {
            transcript.push(Message::user(user_prompt));
        }
        RunState {
            run_id,
            status: RunStatus::Pending,
            version: 0,
            step: 0,
            transcript,
            pending: None,
            output: None,
            error: None,
        }
    }

    /// The tool call a pending requirement refers to, if any,
    /// reconstructed from the transcript. Per the pinned design
    /// decision (see DESIGN.md), replay always reads the call's
    /// arguments from the original assistant message, never from the
    /// `PendingRequirement` itself.
    pub fn pending_tool_call(&self) -> Option<&ToolCall> {
        let call_id = self.pending.as_ref()?.tool_call_id.as_ref()?;
        self.transcript.iter().rev().find_map(|m| m.tool_calls().iter().find(|tc| &tc.call_id == call_id))
    }
}
