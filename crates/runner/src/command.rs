//! The Runner's closed command vocabulary. Grounded on `TurnInput`
//! (the teacher's single "start a turn" request shape), expanded into
//! a closed sum since this system's Runner accepts five distinct
//! intents rather than one. Only `Continue` carries an (optional)
//! `command_id` for idempotent replay — `Start`, `Cancel`, `Steer`, and
//! `FollowUp` have no such field.

use reactor_domain::{CommandKind, Resolution, RunId, ToolDefinition};

/// One request to the Runner.
#[derive(Debug, Clone)]
pub enum Command {
    /// Begin a brand-new run. `run_id` lets a caller supply its own
    /// identifier; when absent the Runner generates one via its
    /// `IdGenerator`.
    Start {
        run_id: Option<RunId>,
        system_prompt: Option<String>,
        user_prompt: Option<String>,
        max_steps: usize,
        tools: Vec<ToolDefinition>,
    },
    /// Resolve a suspended or max-steps-exceeded run and resume it.
    /// `command_id`, when supplied, is used for idempotent replay:
    /// dispatching the same `command_id` against the same run twice
    /// returns the cached result of the first dispatch.
    Continue {
        run_id: RunId,
        command_id: Option<String>,
        max_steps: usize,
        tools: Option<Vec<ToolDefinition>>,
        resolution: Option<Resolution>,
    },
    /// Abort a run that has not already reached a terminal status.
    Cancel { run_id: RunId },
    /// Inject a steering message into a run that is neither terminal
    /// nor suspended — a user-initiated course correction.
    Steer { run_id: RunId, instruction: String },
    /// Continue the conversation on an already-completed run with a
    /// new user message, carrying over its transcript.
    FollowUp {
        run_id: RunId,
        user_prompt: String,
        max_steps: usize,
        tools: Option<Vec<ToolDefinition>>,
    },
}

impl Command {
    /// The idempotency key, when this command carries one. Only
    /// `Continue` does.
    pub fn command_id(&self) -> Option<&str> {
        match self {
            Command::Continue { command_id, .. } => command_id.as_deref(),
            _ => None,
        }
    }

    pub fn run_id(&self) -> Option<&RunId> {
        match self {
            Command::Start { run_id, .. } => run_id.as_ref(),
            Command::Continue { run_id, .. }
            | Command::Cancel { run_id, .. }
            | Command::Steer { run_id, .. }
            | Command::FollowUp { run_id, .. } => Some(run_id),
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Start { .. } => CommandKind::Start,
            Command::Continue { .. } => CommandKind::Continue,
            Command::Cancel { .. } => CommandKind::Cancel,
            Command::Steer { .. } => CommandKind::Steer,
            Command::FollowUp { .. } => CommandKind::FollowUp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_has_no_command_id() {
        let c = Command::Start { run_id: None, system_prompt: None, user_prompt: Some("hi".into()), max_steps: 0, tools: vec![] };
        assert!(c.run_id().is_none());
        assert!(c.command_id().is_none());
        assert_eq!(c.kind(), CommandKind::Start);
    }

    #[test]
    fn continue_carries_an_optional_command_id() {
        let c = Command::Continue { run_id: RunId::new("r1"), command_id: Some("cmd2".into()), max_steps: 0, tools: None, resolution: None };
        assert_eq!(c.command_id(), Some("cmd2"));
        assert_eq!(c.run_id().unwrap().as_str(), "r1");
        assert_eq!(c.kind(), CommandKind::Continue);
    }

    #[test]
    fn cancel_carries_run_id_and_no_command_id() {
        let c = Command::Cancel { run_id: RunId::new("r1") };
        assert_eq!(c.run_id().unwrap().as_str(), "r1");
        assert!(c.command_id().is_none());
        assert_eq!(c.kind(), CommandKind::Cancel);
    }
}
