//! Test doubles shared across the workspace's integration tests:
//! scripted stand-ins for `Model` and `ToolExecutor` that let a
//! scenario pin down exactly what the engine sees without a real
//! provider or tool process.

pub mod model;
pub mod tool_executor;

pub use model::ScriptedModel;
pub use tool_executor::ScriptedToolExecutor;
