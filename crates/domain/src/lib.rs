//! Shared data model, lifecycle rules, validators, error taxonomy, and
//! configuration for the agent run orchestrator. Nothing in this crate
//! talks to a model, a tool, or a store — those are trait boundaries
//! owned by `reactor-engine`, `reactor-runner`, and `reactor-adapters`.

pub mod config;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod message;
pub mod run;
pub mod tool;
pub mod util;
pub mod validate;

pub use config::OrchestratorConfig;
pub use error::{ErrorKind, OrchestratorError, Result};
pub use event::{CommandKind, Event};
pub use message::{Message, Role};
pub use run::{
    PendingRequirement, RequirementKind, RequirementOrigin, Resolution, ResolutionOutcome, RunId,
    RunState, RunStatus,
};
pub use tool::{tool_call_fingerprint, FailureReason, ToolCall, ToolDefinition, ToolResult};
