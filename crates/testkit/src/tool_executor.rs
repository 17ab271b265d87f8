//! A scripted `ToolExecutor` double. Grounded on the same fixture
//! style as `ScriptedModel`; scripts are keyed by tool name so a test
//! can set up "the third call to `delete_file` succeeds" scenarios
//! without needing a real process or network call.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use reactor_domain::{ToolCall, ToolResult};
use reactor_engine::{ToolExecutor, ToolOutcome};

pub struct ScriptedToolExecutor {
    scripts: Mutex<HashMap<String, VecDeque<ToolOutcome>>>,
    received: Mutex<Vec<ToolCall>>,
}

impl ScriptedToolExecutor {
    pub fn new() -> Self {
        Self { scripts: Mutex::new(HashMap::new()), received: Mutex::new(Vec::new()) }
    }

    /// Queue the next outcome returned for calls to `tool_name`.
    /// Multiple calls to the same tool consume the queue in FIFO
    /// order; once exhausted a plain success echoing `arguments` back
    /// as `output` is returned, so tests that don't care about a
    /// tool's exact result don't need to script every call.
    pub fn push(&self, tool_name: impl Into<String>, outcome: ToolOutcome) {
        self.scripts.lock().entry(tool_name.into()).or_default().push_back(outcome);
    }

    pub fn calls_received(&self) -> Vec<ToolCall> {
        self.received.lock().clone()
    }
}

impl Default for ScriptedToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ScriptedToolExecutor {
    async fn execute(&self, call: &ToolCall) -> ToolOutcome {
        self.received.lock().push(call.clone());
        let scripted = self.scripts.lock().get_mut(&call.tool_name).and_then(|q| q.pop_front());
        scripted.unwrap_or_else(|| ToolOutcome::Completed(ToolResult::ok(call.call_id.clone(), call.tool_name.clone(), call.arguments.clone())))
    }
}
