//! The ReAct execution engine: trait boundaries for the model and tool
//! dispatch, and the per-slice loop that drives a `RunState` from
//! `Running` to its next terminal or suspended status.

pub mod engine;
pub mod model;
pub mod schema;
pub mod tool_executor;

pub use engine::{ApprovedReplay, EngineInput, EngineOutput, ReactEngine, DEFAULT_MAX_STEPS};
pub use model::{Model, ModelRequest, ModelResponse, RequirementDraft};
pub use tool_executor::{ToolExecutor, ToolOutcome};
