//! Validator functions used at every command and event boundary.
//! Grounded on `gateway::runtime::runs`'s `truncate_unicode_safe` and
//! test-heavy validation style: small, pure, independently testable
//! functions rather than validation folded into constructors.

use crate::error::OrchestratorError;
use crate::run::{PendingRequirement, RequirementOrigin, Resolution, ResolutionOutcome, RunState};
use crate::tool::ToolDefinition;

/// A `RunState` is well-formed if its `pending` field is present iff
/// its status is `Suspended`, and `version` is non-negative (`step` is
/// enforced by the type, `usize`). Unlike a plain conversation log, an
/// empty transcript is legal: a `Start` command with neither a system
/// nor a user prompt produces one.
pub fn validate_run_state(state: &RunState) -> Result<(), OrchestratorError> {
    let suspended = state.status == crate::run::RunStatus::Suspended;
    if suspended && state.pending.is_none() {
        return Err(OrchestratorError::RunStateInvalid {
            run_id: state.run_id.as_str().to_string(),
            reason: "status is suspended but no pending requirement is set".into(),
        });
    }
    if !suspended && state.pending.is_some() {
        return Err(OrchestratorError::RunStateInvalid {
            run_id: state.run_id.as_str().to_string(),
            reason: "pending requirement set but status is not suspended".into(),
        });
    }
    if let Some(pending) = &state.pending {
        validate_pending_requirement_contract(&state.run_id, pending)?;
    }
    if state.version < 0 {
        return Err(OrchestratorError::RunStateInvalid {
            run_id: state.run_id.as_str().to_string(),
            reason: "version must be non-negative".into(),
        });
    }
    Ok(())
}

/// A tool-origin requirement must carry both `tool_call_id` and
/// `fingerprint`, so an approved-tool-call replay can later confirm it
/// is replaying exactly the call that was blocked.
pub fn validate_pending_requirement_contract(
    run_id: &crate::run::RunId,
    pending: &PendingRequirement,
) -> Result<(), OrchestratorError> {
    if pending.origin == RequirementOrigin::Tool
        && (pending.tool_call_id.as_deref().unwrap_or("").is_empty() || pending.fingerprint.as_deref().unwrap_or("").is_empty())
    {
        return Err(OrchestratorError::RunStateInvalid {
            run_id: run_id.as_str().to_string(),
            reason: "tool-origin requirement must carry tool_call_id and fingerprint".into(),
        });
    }
    Ok(())
}

/// Tool definitions must have unique, non-empty names and a JSON
/// Schema `input_schema` whose top-level type is `object` (the engine
/// validates individual tool call arguments against this schema; this
/// function only validates the schema's own shape).
pub fn validate_tool_definitions(defs: &[ToolDefinition]) -> Result<(), OrchestratorError> {
    let mut seen = std::collections::HashSet::new();
    for d in defs {
        if d.name.is_empty() {
            return Err(OrchestratorError::ToolDefinitionsInvalid {
                reason: "tool name must not be empty".into(),
            });
        }
        if !seen.insert(d.name.as_str()) {
            return Err(OrchestratorError::ToolDefinitionsInvalid {
                reason: format!("duplicate tool name: {}", d.name),
            });
        }
        let type_ok = d.input_schema.get("type").and_then(|t| t.as_str()) == Some("object");
        if !type_ok {
            return Err(OrchestratorError::ToolDefinitionsInvalid {
                reason: format!("tool {} input_schema must have type \"object\"", d.name),
            });
        }
    }
    Ok(())
}

/// A resolution must target the pending requirement it claims to
/// resolve, and its outcome must be one the requirement's kind accepts:
/// `Approval` -> `{Approved, Rejected}`, `UserInput` -> `{Provided}`,
/// `ExternalExecution` -> `{Completed}`.
pub fn validate_resolution(pending: &PendingRequirement, resolution: &Resolution) -> Result<(), OrchestratorError> {
    if resolution.requirement_id != pending.id {
        return Err(OrchestratorError::ResolutionInvalid {
            run_id: String::new(),
            reason: format!(
                "resolution targets requirement_id={} but pending requirement is {}",
                resolution.requirement_id, pending.id
            ),
        });
    }
    if resolution.kind != pending.kind {
        return Err(OrchestratorError::ResolutionInvalid {
            run_id: String::new(),
            reason: format!("resolution kind {:?} does not match pending requirement kind {:?}", resolution.kind, pending.kind),
        });
    }
    use crate::run::RequirementKind::*;
    let ok = match (pending.kind, resolution.outcome) {
        (Approval, ResolutionOutcome::Approved) => true,
        (Approval, ResolutionOutcome::Rejected) => true,
        (UserInput, ResolutionOutcome::Provided) => true,
        (ExternalExecution, ResolutionOutcome::Completed) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(OrchestratorError::ResolutionInvalid {
            run_id: String::new(),
            reason: format!("outcome {:?} is not valid for requirement kind {:?}", resolution.outcome, pending.kind),
        })
    }
}

/// A `Continue` command must supply a resolution whenever the run is
/// suspended, and must not supply one otherwise.
pub fn validate_requirement(pending: Option<&PendingRequirement>, resolution: Option<&Resolution>) -> Result<(), OrchestratorError> {
    match (pending, resolution) {
        (Some(_), None) => Err(OrchestratorError::ResolutionRequired { run_id: String::new() }),
        (None, Some(_)) => Err(OrchestratorError::ResolutionUnexpected {
            run_id: String::new(),
            status: "not suspended".into(),
        }),
        _ => Ok(()),
    }
}
