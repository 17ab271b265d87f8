//! The `Model` trait boundary. Grounded on
//! `sa_providers::traits::LlmProvider`, narrowed to the one call shape
//! the engine actually needs (no embeddings, no streaming — spec
//! Non-goals exclude token streaming inside one model turn).

use async_trait::async_trait;
use reactor_domain::{Message, OrchestratorError, RequirementKind, ToolDefinition};

/// One model-generate request: the transcript so far and the tools it
/// may call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

/// A requirement the model itself raises instead of (or alongside)
/// returning no tool calls — e.g. it needs approval to proceed, or it
/// needs a human to answer a question, without having called any tool.
#[derive(Debug, Clone)]
pub struct RequirementDraft {
    pub kind: RequirementKind,
    pub prompt: Option<String>,
}

/// One model-generate response. `content` and `tool_calls` mirror the
/// teacher's `ChatResponse`; `requirement` models a model-raised
/// requirement (spec's `RequirementOrigin::Model`), which can be any
/// `RequirementKind`, not only a clarification question.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<reactor_domain::ToolCall>,
    pub requirement: Option<RequirementDraft>,
}

/// The engine's sole dependency on an LLM. Concrete adapters
/// (OpenAI-compatible, Anthropic, etc.) live outside this workspace,
/// the same way `LlmProvider` implementations live in `sa-providers`
/// rather than `sa-domain`.
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, OrchestratorError>;
}
