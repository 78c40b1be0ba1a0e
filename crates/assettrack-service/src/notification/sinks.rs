//! Built-in notification sinks.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info};

use assettrack_core::events::DomainEvent;
use assettrack_core::result::AppResult;
use assettrack_core::traits::NotificationSink;

/// Emits each event as a structured log line.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink;

impl LogNotificationSink {
    /// Creates the sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for LogNotificationSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, event: &DomainEvent) -> AppResult<()> {
        let payload = serde_json::to_string(&event.payload)?;
        info!(
            event = event.name(),
            event_id = %event.id,
            asset_id = %event.payload.asset_id(),
            actor_id = %event.actor_id,
            payload = %payload,
            "Asset event"
        );
        Ok(())
    }
}

/// Publishes events on an in-process broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotificationSink {
    sender: broadcast::Sender<DomainEvent>,
}

impl BroadcastNotificationSink {
    /// Channel capacity used by [`Self::new`].
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates the sink with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates the sink with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events delivered from now on.
    pub fn receiver(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotificationSink {
    fn name(&self) -> &str {
        "broadcast"
    }

    async fn deliver(&self, event: &DomainEvent) -> AppResult<()> {
        match self.sender.send(event.clone()) {
            Ok(receivers) => debug!(event = event.name(), receivers, "Event broadcast"),
            Err(_) => debug!(event = event.name(), "No subscribers for event"),
        }
        Ok(())
    }
}
