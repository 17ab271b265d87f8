//! The `ToolExecutor` trait boundary. Grounded on
//! `sa_tools::manager::ProcessManager`'s dispatch shape, narrowed to a
//! single async call per tool invocation plus an explicit suspension
//! signal, since the spec requires tools to be able to raise a
//! requirement of any kind rather than only succeed or fail outright.

use async_trait::async_trait;
use reactor_domain::{FailureReason, RequirementKind, ToolCall, ToolResult};

/// What happened when a tool call was handed to its executor.
pub enum ToolOutcome {
    /// The tool ran to completion, successfully or not.
    Completed(ToolResult),
    /// The tool requires some external input before it may actually
    /// run; no side effect has occurred yet. The engine records this
    /// as a `PendingRequirement` with `RequirementOrigin::Tool` and
    /// suspends the run. `fingerprint` lets the executor supply its own
    /// stable identity for the call; when `None` the engine falls back
    /// to `tool_call_fingerprint`.
    Suspend { kind: RequirementKind, fingerprint: Option<String>, prompt: Option<String> },
}

/// Dispatches one validated tool call. Implementations never see
/// unvalidated arguments — the engine checks them against the tool's
/// `ToolDefinition::input_schema` first and synthesizes a
/// `FailureReason::InvalidArguments` result without ever calling this
/// trait when validation fails.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> ToolOutcome;
}

/// Helper for executors that only ever fail, used by adapters wiring
/// up tools that turned out to be unknown at registration time.
pub fn unknown_tool_result(call: &ToolCall) -> ToolResult {
    ToolResult::failed(
        call.call_id.clone(),
        call.tool_name.clone(),
        FailureReason::UnknownTool { tool_name: call.tool_name.clone() },
    )
}
