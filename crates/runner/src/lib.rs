//! The Runner: the orchestrator's outermost component. Accepts
//! `Command`s, enforces preconditions, drives the `ReactEngine` for one
//! slice per dispatch, persists through a `RunStore`, and publishes
//! through an `EventSink` — the composition root the rest of a hosting
//! application wires concrete adapters into.

pub mod bounded;
pub mod command;
pub mod runner;
pub mod traits;

pub use command::Command;
pub use runner::{Dispatched, RunResult, Runner};
pub use traits::{EventSink, IdGenerator, RunStore};
