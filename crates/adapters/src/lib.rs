//! In-process reference adapters for the orchestrator's trait
//! boundaries: run persistence, event publication, tool dispatch, and
//! id generation. None of these are required — any host may supply its
//! own `RunStore`/`EventSink`/`ToolExecutor`/`IdGenerator` — but every
//! seed-scenario integration test in `reactor-runner` wires up these.

pub mod event_sink;
pub mod id_gen;
pub mod run_store;
pub mod tool_registry;

pub use event_sink::BroadcastEventSink;
pub use id_gen::UuidIdGenerator;
pub use run_store::InMemoryRunStore;
pub use tool_registry::ToolRegistry;
