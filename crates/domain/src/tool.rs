//! Tool call/result/definition types shared between the engine and its
//! adapters. Grounded on `sa_domain::tool`, generalized so a
//! `ToolCall` always carries a `call_id` correlating it to exactly one
//! `ToolResult`, and a `ToolDefinition` carries a JSON Schema rather
//! than the teacher's looser `serde_json::Value` "parameters" blob.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One tool invocation requested by the model within a single
/// assistant turn. `arguments` is the raw, unvalidated JSON the model
/// produced; validation against the matching `ToolDefinition` happens
/// in the engine, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

/// A stable identifier for one tool call's identity and arguments,
/// used to confirm that an approved-tool-call replay after a
/// suspension is still replaying the call it was approved for, not a
/// different one that happens to share an id.
pub fn tool_call_fingerprint(call: &ToolCall) -> String {
    let mut hasher = DefaultHasher::new();
    call.call_id.hash(&mut hasher);
    call.tool_name.hash(&mut hasher);
    call.arguments.to_string().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Why a tool call did not produce a normal result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum FailureReason {
    UnknownTool { tool_name: String },
    InvalidArguments { detail: String },
    ExecutorError { detail: String },
    Suspended,
}

/// The outcome of dispatching a `ToolCall`. Exactly one of `output` or
/// `failure` is populated; a tool-initiated suspension is signaled via
/// `ToolOutcome::Suspend` at the executor boundary, but still lands in
/// the transcript as a `ToolResult` with `FailureReason::Suspended` so
/// the requirement stays linked to its originating call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub output: Option<serde_json::Value>,
    pub failure: Option<FailureReason>,
}

impl ToolResult {
    pub fn ok(call_id: impl Into<String>, tool_name: impl Into<String>, output: serde_json::Value) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: Some(output),
            failure: None,
        }
    }

    pub fn failed(call_id: impl Into<String>, tool_name: impl Into<String>, failure: FailureReason) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: None,
            failure: Some(failure),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// A tool's name, description, and JSON Schema for its arguments, as
/// advertised to the model on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
