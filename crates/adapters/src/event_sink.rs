//! A broadcast-channel `EventSink`. Grounded on
//! `gateway::runtime::runs::RunStore::{subscribe, emit,
//! cleanup_channel}`: one `tokio::sync::broadcast` channel per run,
//! created lazily on first publish/subscribe and torn down once the
//! run reaches a terminal status.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use reactor_domain::{Event, OrchestratorError, RunId};
use reactor_runner::EventSink;
use tokio::sync::broadcast;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Reference `EventSink`: fans events for a given run out to any
/// number of subscribers via a per-run broadcast channel. A publish
/// with no subscribers is not an error — `broadcast::Sender::send`
/// failing because no receivers exist is swallowed the same way the
/// teacher's `emit` ignores a `SendError` from zero subscribers.
pub struct BroadcastEventSink {
    capacity: usize,
    channels: RwLock<HashMap<RunId, broadcast::Sender<Event>>>,
}

impl BroadcastEventSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), channels: RwLock::new(HashMap::new()) }
    }

    pub fn subscribe(&self, run_id: &RunId) -> broadcast::Receiver<Event> {
        let mut channels = self.channels.write();
        channels
            .entry(run_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drop the channel for a run once it will never emit again.
    pub fn cleanup(&self, run_id: &RunId) {
        self.channels.write().remove(run_id);
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, event: Event) -> Result<(), OrchestratorError> {
        let run_id = event.run_id().clone();
        let terminal = matches!(
            &event,
            Event::RunCompleted { .. } | Event::RunFailed { .. } | Event::RunCancelled { .. }
        );

        {
            let mut channels = self.channels.write();
            let sender = channels.entry(run_id.clone()).or_insert_with(|| broadcast::channel(self.capacity).0);
            let _ = sender.send(event);
        }

        if terminal {
            self.cleanup(&run_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactor_domain::RunId;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let sink = BroadcastEventSink::new();
        let run_id = RunId::new("r1");
        let mut rx = sink.subscribe(&run_id);
        sink.publish(Event::RunCheckpoint { run_id: run_id.clone(), step: 1 }).await.unwrap();
        let got = rx.recv().await.unwrap();
        assert_eq!(got.run_id().as_str(), "r1");
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_error() {
        let sink = BroadcastEventSink::new();
        let run_id = RunId::new("r1");
        assert!(sink.publish(Event::RunCheckpoint { run_id, step: 0 }).await.is_ok());
    }

    #[tokio::test]
    async fn terminal_event_cleans_up_channel() {
        let sink = BroadcastEventSink::new();
        let run_id = RunId::new("r1");
        let _rx = sink.subscribe(&run_id);
        sink.publish(Event::RunCompleted { run_id: run_id.clone(), step: 3 }).await.unwrap();
        assert!(sink.channels.read().get(&run_id).is_none());
    }
}
