//! Seed-scenario integration tests wiring a `Runner` against the
//! reference adapters (`reactor-adapters`) and scripted doubles
//! (`reactor-testkit`). Grounded on the hand-rolled scenario fixtures
//! in `runs.rs`/`approval.rs`/`cancel.rs`, generalized from direct
//! `RunStore` manipulation to dispatching `Command`s through a real
//! `Runner`.

use std::sync::Arc;

use reactor_adapters::{BroadcastEventSink, InMemoryRunStore, UuidIdGenerator};
use reactor_domain::{
    OrchestratorConfig, RequirementKind, Resolution, ResolutionOutcome, RunStatus, ToolCall,
    ToolDefinition, ToolResult,
};
use reactor_engine::{ModelResponse, ReactEngine, RequirementDraft, ToolOutcome};
use reactor_runner::{Command, Runner};
use reactor_testkit::{ScriptedModel, ScriptedToolExecutor};

fn search_tool() -> ToolDefinition {
    ToolDefinition::new("search", "search the web", serde_json::json!({"type": "object", "properties": {"q": {"type": "string"}}, "required": ["q"]}))
}

fn runner(model: ScriptedModel, executor: ScriptedToolExecutor) -> Runner {
    let engine = Arc::new(ReactEngine::new(Arc::new(model), Arc::new(executor), OrchestratorConfig::default()));
    Runner::new(
        Arc::new(InMemoryRunStore::new()),
        Arc::new(BroadcastEventSink::new()),
        Arc::new(UuidIdGenerator),
        engine,
        OrchestratorConfig::default(),
    )
}

#[tokio::test]
async fn start_completes_without_any_tool_calls() {
    let model = ScriptedModel::new(vec![ModelResponse { content: Some("hello there".into()), tool_calls: vec![], requirement: None }]);
    let r = runner(model, ScriptedToolExecutor::new());

    let dispatched = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("hi".into()), max_steps: 0, tools: vec![] })
        .await
        .unwrap();

    assert!(dispatched.error.is_none());
    assert_eq!(dispatched.result.state.status, RunStatus::Completed);
    assert_eq!(dispatched.result.state.output.as_deref(), Some("hello there"));
}

#[tokio::test]
async fn start_dispatches_a_tool_call_then_completes() {
    let model = ScriptedModel::new(vec![
        ModelResponse {
            content: None,
            tool_calls: vec![ToolCall { call_id: "c1".into(), tool_name: "search".into(), arguments: serde_json::json!({"q": "rust"}) }],
            requirement: None,
        },
        ModelResponse { content: Some("found it".into()), tool_calls: vec![], requirement: None },
    ]);
    let executor = ScriptedToolExecutor::new();
    executor.push("search", ToolOutcome::Completed(ToolResult::ok("c1", "search", serde_json::json!({"hits": 3}))));
    let r = runner(model, executor);

    let dispatched = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("look this up".into()), max_steps: 0, tools: vec![search_tool()] })
        .await
        .unwrap();

    assert_eq!(dispatched.result.state.status, RunStatus::Completed);
    assert_eq!(dispatched.result.state.output.as_deref(), Some("found it"));
}

#[tokio::test]
async fn approval_required_then_continue_resumes_to_completion() {
    let model = ScriptedModel::new(vec![
        ModelResponse {
            content: None,
            tool_calls: vec![ToolCall { call_id: "c1".into(), tool_name: "delete_file".into(), arguments: serde_json::json!({"path": "/tmp/x"}) }],
            requirement: None,
        },
        ModelResponse { content: Some("deleted".into()), tool_calls: vec![], requirement: None },
    ]);
    let executor = ScriptedToolExecutor::new();
    executor.push("delete_file", ToolOutcome::Suspend { kind: RequirementKind::Approval, fingerprint: None, prompt: Some("delete /tmp/x?".into()) });
    executor.push("delete_file", ToolOutcome::Completed(ToolResult::ok("c1", "delete_file", serde_json::json!({"deleted": true}))));
    let delete_tool = ToolDefinition::new("delete_file", "delete a file", serde_json::json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]}));
    let r = runner(model, executor);

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("clean up".into()), max_steps: 0, tools: vec![delete_tool] })
        .await
        .unwrap();
    assert_eq!(started.result.state.status, RunStatus::Suspended);
    let pending = started.result.state.pending.clone().expect("pending requirement");
    assert_eq!(pending.kind, RequirementKind::Approval);

    let resolution = Resolution { requirement_id: pending.id.clone(), kind: RequirementKind::Approval, outcome: ResolutionOutcome::Approved, value: None };
    let resumed = r
        .dispatch(Command::Continue { run_id: "r1".into(), command_id: None, max_steps: 0, tools: None, resolution: Some(resolution) })
        .await
        .unwrap();

    assert_eq!(resumed.result.state.status, RunStatus::Completed);
    assert_eq!(resumed.result.state.output.as_deref(), Some("deleted"));
}

#[tokio::test]
async fn approval_rejected_synthesizes_a_failure_result_and_continues() {
    let model = ScriptedModel::new(vec![
        ModelResponse {
            content: None,
            tool_calls: vec![ToolCall { call_id: "c1".into(), tool_name: "delete_file".into(), arguments: serde_json::json!({"path": "/tmp/x"}) }],
            requirement: None,
        },
        ModelResponse { content: Some("left it alone".into()), tool_calls: vec![], requirement: None },
    ]);
    let executor = ScriptedToolExecutor::new();
    executor.push("delete_file", ToolOutcome::Suspend { kind: RequirementKind::Approval, fingerprint: None, prompt: Some("delete /tmp/x?".into()) });
    let delete_tool = ToolDefinition::new("delete_file", "delete a file", serde_json::json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]}));
    let r = runner(model, executor);

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("clean up".into()), max_steps: 0, tools: vec![delete_tool] })
        .await
        .unwrap();
    let pending = started.result.state.pending.clone().expect("pending requirement");

    let resolution = Resolution { requirement_id: pending.id.clone(), kind: RequirementKind::Approval, outcome: ResolutionOutcome::Rejected, value: None };
    let resumed = r
        .dispatch(Command::Continue { run_id: "r1".into(), command_id: None, max_steps: 0, tools: None, resolution: Some(resolution) })
        .await
        .unwrap();

    // Rejection does not replay the tool call: the model sees the
    // resolution's transcript line and picks up from there.
    assert_eq!(resumed.result.state.status, RunStatus::Completed);
    assert_eq!(resumed.result.state.output.as_deref(), Some("left it alone"));
    let encoded = resumed
        .result
        .state
        .transcript
        .iter()
        .find_map(|m| m.text().filter(|t| t.contains("[resolution]")))
        .expect("resolution line recorded");
    assert!(encoded.contains("outcome=rejected"));
}

#[tokio::test]
async fn steer_rejected_on_a_suspended_run() {
    let model = ScriptedModel::new(vec![ModelResponse { content: None, tool_calls: vec![], requirement: Some(RequirementDraft { kind: RequirementKind::UserInput, prompt: Some("which file?".into()) }) }]);
    let r = runner(model, ScriptedToolExecutor::new());

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("do something".into()), max_steps: 0, tools: vec![] })
        .await
        .unwrap();
    assert_eq!(started.result.state.status, RunStatus::Suspended);

    // Steering a suspended run is rejected: it must be resolved via
    // Continue first.
    let err = r.dispatch(Command::Steer { run_id: "r1".into(), instruction: "nevermind".into() }).await.unwrap_err();
    assert!(err.is(reactor_domain::ErrorKind::ResolutionRequired));
}

#[tokio::test]
async fn steer_allowed_on_a_max_steps_exceeded_run() {
    let mut responses = Vec::new();
    for _ in 0..2 {
        responses.push(ModelResponse {
            content: None,
            tool_calls: vec![ToolCall { call_id: "c".into(), tool_name: "search".into(), arguments: serde_json::json!({"q": "x"}) }],
            requirement: None,
        });
    }
    let model = ScriptedModel::new(responses);
    let executor = ScriptedToolExecutor::new();
    let r = runner(model, executor);

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("loop".into()), max_steps: 1, tools: vec![search_tool()] })
        .await
        .unwrap();
    assert_eq!(started.result.state.status, RunStatus::MaxStepsExceeded);

    let steered = r.dispatch(Command::Steer { run_id: "r1".into(), instruction: "try a different search".into() }).await.unwrap();
    assert_eq!(steered.result.state.status, RunStatus::MaxStepsExceeded);
    assert!(steered.result.state.transcript.iter().any(|m| m.text().map(|t| t.contains("try a different search")).unwrap_or(false)));
}

#[tokio::test]
async fn follow_up_rejected_on_a_completed_run() {
    // FollowUp shares Steer's gates verbatim (terminal -> not
    // continuable, suspended -> resolution required): a completed run
    // is terminal, so it cannot be followed up on either, same as any
    // other finished run.
    let model = ScriptedModel::new(vec![ModelResponse { content: Some("first answer".into()), tool_calls: vec![], requirement: None }]);
    let r = runner(model, ScriptedToolExecutor::new());

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("first question".into()), max_steps: 0, tools: vec![] })
        .await
        .unwrap();
    assert_eq!(started.result.state.status, RunStatus::Completed);

    let err = r.dispatch(Command::FollowUp { run_id: "r1".into(), user_prompt: "second question".into(), max_steps: 0, tools: None }).await.unwrap_err();
    assert!(err.is(reactor_domain::ErrorKind::RunNotContinuable));
}

#[tokio::test]
async fn follow_up_allowed_on_a_max_steps_exceeded_run() {
    let mut responses = vec![ModelResponse {
        content: None,
        tool_calls: vec![ToolCall { call_id: "c".into(), tool_name: "search".into(), arguments: serde_json::json!({"q": "x"}) }],
        requirement: None,
    }];
    responses.push(ModelResponse { content: Some("done after follow-up".into()), tool_calls: vec![], requirement: None });
    let model = ScriptedModel::new(responses);
    let executor = ScriptedToolExecutor::new();
    executor.push("search", ToolOutcome::Completed(ToolResult::ok("c", "search", serde_json::json!({"hits": 1}))));
    let r = runner(model, executor);

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("loop".into()), max_steps: 1, tools: vec![search_tool()] })
        .await
        .unwrap();
    assert_eq!(started.result.state.status, RunStatus::MaxStepsExceeded);

    let followed = r
        .dispatch(Command::FollowUp { run_id: "r1".into(), user_prompt: "try something else".into(), max_steps: 4, tools: None })
        .await
        .unwrap();
    assert_eq!(followed.result.state.status, RunStatus::Completed);
    assert_eq!(followed.result.state.output.as_deref(), Some("done after follow-up"));
    assert!(followed.result.state.transcript.iter().any(|m| m.text().map(|t| t.contains("try something else")).unwrap_or(false)));
}

#[tokio::test]
async fn follow_up_rejected_on_a_suspended_run() {
    let model = ScriptedModel::new(vec![ModelResponse { content: None, tool_calls: vec![], requirement: Some(RequirementDraft { kind: RequirementKind::UserInput, prompt: None }) }]);
    let r = runner(model, ScriptedToolExecutor::new());
    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("hi".into()), max_steps: 0, tools: vec![] })
        .await
        .unwrap();
    assert_eq!(started.result.state.status, RunStatus::Suspended);

    let err = r.dispatch(Command::FollowUp { run_id: "r1".into(), user_prompt: "anyway".into(), max_steps: 0, tools: None }).await.unwrap_err();
    assert!(err.is(reactor_domain::ErrorKind::ResolutionRequired));
}

#[tokio::test]
async fn cancel_aborts_a_suspended_run() {
    let model = ScriptedModel::new(vec![ModelResponse { content: None, tool_calls: vec![], requirement: Some(RequirementDraft { kind: RequirementKind::UserInput, prompt: Some("which file?".into()) }) }]);
    let r = runner(model, ScriptedToolExecutor::new());

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("do something".into()), max_steps: 0, tools: vec![] })
        .await
        .unwrap();
    assert_eq!(started.result.state.status, RunStatus::Suspended);

    let cancelled = r.dispatch(Command::Cancel { run_id: "r1".into() }).await.unwrap();
    assert_eq!(cancelled.result.state.status, RunStatus::Cancelled);
    assert!(cancelled.result.state.pending.is_none());

    let err = r.dispatch(Command::Cancel { run_id: "r1".into() }).await.unwrap_err();
    assert!(err.is(reactor_domain::ErrorKind::RunNotCancellable));
}

#[tokio::test]
async fn replaying_the_same_continue_command_id_returns_the_cached_result() {
    let model = ScriptedModel::new(vec![
        ModelResponse {
            content: None,
            tool_calls: vec![ToolCall { call_id: "c1".into(), tool_name: "delete_file".into(), arguments: serde_json::json!({"path": "/tmp/x"}) }],
            requirement: None,
        },
        ModelResponse { content: Some("deleted".into()), tool_calls: vec![], requirement: None },
    ]);
    let executor = ScriptedToolExecutor::new();
    executor.push("delete_file", ToolOutcome::Suspend { kind: RequirementKind::Approval, fingerprint: None, prompt: Some("delete /tmp/x?".into()) });
    executor.push("delete_file", ToolOutcome::Completed(ToolResult::ok("c1", "delete_file", serde_json::json!({"deleted": true}))));
    let delete_tool = ToolDefinition::new("delete_file", "delete a file", serde_json::json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]}));
    let r = runner(model, executor);

    let started = r
        .dispatch(Command::Start { run_id: Some("r1".into()), system_prompt: None, user_prompt: Some("clean up".into()), max_steps: 0, tools: vec![delete_tool] })
        .await
        .unwrap();
    let pending = started.result.state.pending.clone().expect("pending requirement");
    let resolution = Resolution { requirement_id: pending.id.clone(), kind: RequirementKind::Approval, outcome: ResolutionOutcome::Approved, value: None };

    let first = r
        .dispatch(Command::Continue { run_id: "r1".into(), command_id: Some("cmd-1".into()), max_steps: 0, tools: None, resolution: Some(resolution.clone()) })
        .await
        .unwrap();
    assert_eq!(first.result.state.status, RunStatus::Completed);

    // Replaying the same command_id against the same run must not
    // re-execute the (already-consumed) tool script a second time; it
    // returns the cached dispatch result instead.
    let second = r
        .dispatch(Command::Continue { run_id: "r1".into(), command_id: Some("cmd-1".into()), max_steps: 0, tools: None, resolution: Some(resolution) })
        .await
        .unwrap();
    assert_eq!(second.result.state.version, first.result.state.version);
    assert_eq!(second.result.state.output, first.result.state.output);
}
