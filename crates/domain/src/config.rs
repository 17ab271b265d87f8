//! Orchestrator-core tunables. Grounded on `sa_domain::config::Config`'s
//! style: a flat `#[derive(Deserialize, Serialize, Default)]` struct
//! with `#[serde(default = "d_fn")]` per field, loaded from TOML via
//! `toml::from_str` with a graceful fall back to defaults when no file
//! is present.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn d_max_steps() -> usize {
    8
}

fn d_idempotency_cache_capacity() -> usize {
    1
}

fn d_event_channel_capacity() -> usize {
    256
}

fn d_tool_dispatch_concurrency() -> usize {
    8
}

/// Tunables for the Runner and Engine. Every field has a sensible
/// default so a missing or partial TOML file still produces a usable
/// config, matching the teacher's "config is additive, never required"
/// posture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Fallback ceiling on model-generate iterations within one
    /// dispatched slice, used whenever a command's own `max_steps` is
    /// zero. The spec's `effectiveMaxSteps` defaults to 8.
    #[serde(default = "d_max_steps")]
    pub max_steps: usize,

    /// How many `(CommandId, RunResult)` pairs the Runner retains per
    /// run for idempotent command replay. Pinned to 1 per the Open
    /// Question resolution recorded in DESIGN.md.
    #[serde(default = "d_idempotency_cache_capacity")]
    pub idempotency_cache_capacity: usize,

    /// Per-run broadcast channel capacity for the reference `EventSink`.
    #[serde(default = "d_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Upper bound on tool calls dispatched concurrently within one
    /// assistant message's batch.
    #[serde(default = "d_tool_dispatch_concurrency")]
    pub tool_dispatch_concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            max_steps: d_max_steps(),
            idempotency_cache_capacity: d_idempotency_cache_capacity(),
            event_channel_capacity: d_event_channel_capacity(),
            tool_dispatch_concurrency: d_tool_dispatch_concurrency(),
        }
    }
}

impl OrchestratorConfig {
    /// Parse a TOML document into a config, letting any field not
    /// present fall back to its default.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load from a file if it exists, otherwise return defaults. I/O
    /// errors reading an existing file still propagate as parse
    /// failures mapped by the caller; a missing file is not an error.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "failed to parse orchestrator config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.max_steps, 8);
        assert_eq!(cfg.idempotency_cache_capacity, 1);
        assert_eq!(cfg.event_channel_capacity, 256);
        assert_eq!(cfg.tool_dispatch_concurrency, 8);
    }

    #[test]
    fn partial_toml_fills_remaining_defaults() {
        let cfg = OrchestratorConfig::from_toml_str("max_steps = 10\n").unwrap();
        assert_eq!(cfg.max_steps, 10);
        assert_eq!(cfg.event_channel_capacity, 256);
    }

    #[test]
    fn missing_file_yields_default() {
        let cfg = OrchestratorConfig::load_or_default(Path::new("/nonexistent/path/orchestrator.toml"));
        assert_eq!(cfg, OrchestratorConfig::default());
    }
}
