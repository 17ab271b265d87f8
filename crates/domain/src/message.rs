//! Transcript message types. Grounded on `sa_domain::tool::Message` but
//! reshaped from a single struct with optional fields into a closed sum
//! type, since a `System`/`User` message can never carry tool calls and
//! a `Tool` message can never carry anything but a result.

use crate::run::PendingRequirement;
use crate::tool::{ToolCall, ToolResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One transcript entry. `Assistant` carries zero or more tool calls
/// alongside optional text, matching the common "model emits prose and
/// calls tools in the same turn" shape, and may instead carry a
/// `requirement` when the model itself raised a blocking requirement
/// rather than calling a tool. `Tool` carries exactly one result,
/// correlated to its call by `call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System { content: String },
    User { content: String },
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        requirement: Option<PendingRequirement>,
    },
    Tool { result: ToolResult },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System { content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User { content: content.into() }
    }

    pub fn assistant_text(content: impl Into<String>) -> Self {
        Message::Assistant { content: Some(content.into()), tool_calls: Vec::new(), requirement: None }
    }

    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant { content, tool_calls, requirement: None }
    }

    /// An assistant message that raised a requirement instead of (or,
    /// transiently, alongside) calling a tool. `tool_calls` is normally
    /// empty here; a non-empty batch carried alongside a requirement is
    /// rejected by the engine before the run is allowed to suspend.
    pub fn assistant_with_requirement(
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
        requirement: PendingRequirement,
    ) -> Self {
        Message::Assistant { content, tool_calls, requirement: Some(requirement) }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Message::Tool { result }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
            Message::Tool { .. } => Role::Tool,
        }
    }

    /// The tool calls carried by this message, if it is an `Assistant`
    /// message with any.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// The requirement carried by this message, if it is an `Assistant`
    /// message that raised one.
    pub fn requirement(&self) -> Option<&PendingRequirement> {
        match self {
            Message::Assistant { requirement, .. } => requirement.as_ref(),
            _ => None,
        }
    }

    /// Best-effort plain text extraction, used for logging/snapshots.
    /// Unicode-safe: callers that truncate this for display must do so
    /// on a char boundary, see `util::truncate_str`.
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::System { content } | Message::User { content } => Some(content.as_str()),
            Message::Assistant { content, .. } => content.as_deref(),
            Message::Tool { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_with_tool_calls_round_trips() {
        let m = Message::assistant_tool_calls(
            Some("let me check".into()),
            vec![ToolCall { call_id: "c1".into(), tool_name: "search".into(), arguments: serde_json::json!({}) }],
        );
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["role"], "assistant");
        let back: Message = serde_json::from_value(v).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn tool_message_has_no_text() {
        let r = crate::tool::ToolResult::ok("c1", "search", serde_json::json!(1));
        let m = Message::tool_result(r);
        assert_eq!(m.role(), Role::Tool);
        assert!(m.text().is_none());
    }

    #[test]
    fn empty_tool_calls_omitted_from_json() {
        let m = Message::assistant_text("hi");
        let v = serde_json::to_value(&m).unwrap();
        assert!(v.get("tool_calls").is_none());
    }
}
