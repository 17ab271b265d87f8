//! The closed error taxonomy shared by every orchestrator crate.
//!
//! Every sentinel kind below is a distinct `OrchestratorError` variant.
//! Variants that wrap an underlying cause (`CommandConflict` around
//! `RunVersionConflict`, the `Combined` variant joining a run-level
//! error with a publish failure) use `#[source]` so the chain is
//! walkable with [`std::error::Error::source`]. [`OrchestratorError::is`]
//! is the `errors.Is`-equivalent: it checks the error itself and then
//! walks `source()` looking for a matching [`ErrorKind`].

use std::fmt;

/// A tag identifying which taxonomy entry an [`OrchestratorError`] is,
/// independent of the structured fields it carries. Used for `Is`-style
/// chain matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Input errors (client-visible, no state change)
    ContextNil,
    CommandNil,
    CommandInvalid,
    CommandUnsupported,
    InvalidRunId,
    ToolDefinitionsInvalid,
    ResolutionRequired,
    ResolutionInvalid,
    ResolutionUnexpected,
    // Lifecycle errors
    RunNotFound,
    RunNotContinuable,
    RunNotCancellable,
    InvalidRunStateTransition,
    RunStateInvalid,
    // Concurrency errors
    RunVersionConflict,
    CommandConflict,
    // Engine contract errors
    EngineOutputContractViolation,
    MaxStepsExceeded,
    // Observability errors
    EventInvalid,
    EventPublish,
    // Wiring errors
    MissingIdGenerator,
    MissingRunStore,
    MissingEngine,
    MissingModel,
    MissingToolExecutor,
    // Engine-internal
    ToolCallInvalid,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The closed taxonomy. Each variant embeds `key=value` diagnostic
/// hints in its message the way the teacher's `sa_domain::error::Error`
/// embeds provider/context info.
#[derive(thiserror::Error, Debug)]
pub enum OrchestratorError {
    #[error("context_nil: a nil context was passed to a command boundary")]
    ContextNil,

    #[error("command_nil: command={0:?}")]
    CommandNil(Option<&'static str>),

    #[error("command_invalid: {reason}")]
    CommandInvalid { reason: String },

    #[error("command_unsupported: tag={tag}")]
    CommandUnsupported { tag: String },

    #[error("invalid_run_id: run_id must be non-empty")]
    InvalidRunId,

    #[error("tool_definitions_invalid: {reason}")]
    ToolDefinitionsInvalid { reason: String },

    #[error("resolution_required: run_id={run_id}")]
    ResolutionRequired { run_id: String },

    #[error("resolution_invalid: run_id={run_id} reason={reason}")]
    ResolutionInvalid { run_id: String, reason: String },

    #[error("resolution_unexpected: run_id={run_id} status={status}")]
    ResolutionUnexpected { run_id: String, status: String },

    #[error("run_not_found: run_id={run_id}")]
    RunNotFound { run_id: String },

    #[error("run_not_continuable: run_id={run_id} status={status}")]
    RunNotContinuable { run_id: String, status: String },

    #[error("run_not_cancellable: run_id={run_id} status={status}")]
    RunNotCancellable { run_id: String, status: String },

    #[error("invalid_run_state_transition: run_id={run_id} from={from} to={to}")]
    InvalidRunStateTransition {
        run_id: String,
        from: String,
        to: String,
    },

    #[error("run_state_invalid: run_id={run_id} reason={reason}")]
    RunStateInvalid { run_id: String, reason: String },

    #[error("run_version_conflict: run_id={run_id} expected={expected} actual={actual}")]
    RunVersionConflict {
        run_id: String,
        expected: i64,
        actual: i64,
    },

    #[error("command_conflict: run_id={run_id}")]
    CommandConflict {
        run_id: String,
        #[source]
        source: Box<OrchestratorError>,
    },

    #[error("engine_output_contract_violation: run_id={run_id} reason={reason}")]
    EngineOutputContractViolation { run_id: String, reason: String },

    #[error("max_steps_exceeded: run_id={run_id} step={step} max_steps={max_steps}")]
    MaxStepsExceeded {
        run_id: String,
        step: usize,
        max_steps: usize,
    },

    #[error("event_invalid: type={event_type} reason={reason}")]
    EventInvalid { event_type: String, reason: String },

    #[error("event_publish: run_id={run_id}: {message}")]
    EventPublish {
        run_id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("missing_id_generator")]
    MissingIdGenerator,

    #[error("missing_run_store")]
    MissingRunStore,

    #[error("missing_engine")]
    MissingEngine,

    #[error("missing_model")]
    MissingModel,

    #[error("missing_tool_executor")]
    MissingToolExecutor,

    #[error("tool_call_invalid: run_id={run_id} reason={reason}")]
    ToolCallInvalid { run_id: String, reason: String },

    /// Joins a run-level outcome with a non-fatal event-publish failure,
    /// the way the spec's `EventPublish` combines with e.g.
    /// `MaxStepsExceeded` in the final returned error.
    #[error("{primary}; also: {secondary}")]
    Combined {
        #[source]
        primary: Box<OrchestratorError>,
        secondary: Box<OrchestratorError>,
    },
}

impl OrchestratorError {
    /// The sentinel kind of this variant, ignoring structured fields.
    pub fn kind(&self) -> ErrorKind {
        use OrchestratorError::*;
        match self {
            ContextNil => ErrorKind::ContextNil,
            CommandNil(_) => ErrorKind::CommandNil,
            CommandInvalid { .. } => ErrorKind::CommandInvalid,
            CommandUnsupported { .. } => ErrorKind::CommandUnsupported,
            InvalidRunId => ErrorKind::InvalidRunId,
            ToolDefinitionsInvalid { .. } => ErrorKind::ToolDefinitionsInvalid,
            ResolutionRequired { .. } => ErrorKind::ResolutionRequired,
            ResolutionInvalid { .. } => ErrorKind::ResolutionInvalid,
            ResolutionUnexpected { .. } => ErrorKind::ResolutionUnexpected,
            RunNotFound { .. } => ErrorKind::RunNotFound,
            RunNotContinuable { .. } => ErrorKind::RunNotContinuable,
            RunNotCancellable { .. } => ErrorKind::RunNotCancellable,
            InvalidRunStateTransition { .. } => ErrorKind::InvalidRunStateTransition,
            RunStateInvalid { .. } => ErrorKind::RunStateInvalid,
            RunVersionConflict { .. } => ErrorKind::RunVersionConflict,
            CommandConflict { .. } => ErrorKind::CommandConflict,
            EngineOutputContractViolation { .. } => ErrorKind::EngineOutputContractViolation,
            MaxStepsExceeded { .. } => ErrorKind::MaxStepsExceeded,
            EventInvalid { .. } => ErrorKind::EventInvalid,
            EventPublish { .. } => ErrorKind::EventPublish,
            MissingIdGenerator => ErrorKind::MissingIdGenerator,
            MissingRunStore => ErrorKind::MissingRunStore,
            MissingEngine => ErrorKind::MissingEngine,
            MissingModel => ErrorKind::MissingModel,
            MissingToolExecutor => ErrorKind::MissingToolExecutor,
            ToolCallInvalid { .. } => ErrorKind::ToolCallInvalid,
            // A `Combined` error reports the primary's kind; `is` below
            // still finds the secondary by walking the chain.
            Combined { primary, .. } => primary.kind(),
        }
    }

    /// `errors.Is`-equivalent: true if this error or anything in its
    /// `source()` chain has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        if self.kind() == kind {
            return true;
        }
        if let OrchestratorError::Combined { secondary, .. } = self {
            if secondary.is(kind) {
                return true;
            }
        }
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            if let Some(oe) = err.downcast_ref::<OrchestratorError>() {
                if oe.kind() == kind {
                    return true;
                }
            }
            cause = err.source();
        }
        false
    }

    /// Join a secondary (typically non-fatal) error onto this one,
    /// preserving both for inspection via [`OrchestratorError::is`].
    pub fn combine(self, secondary: OrchestratorError) -> OrchestratorError {
        OrchestratorError::Combined {
            primary: Box::new(self),
            secondary: Box::new(secondary),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
