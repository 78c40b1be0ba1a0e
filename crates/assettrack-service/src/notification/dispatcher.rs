//! Fire-and-forget event dispatch.

use std::sync::Arc;

use tracing::{debug, warn};

use assettrack_core::config::NotificationsConfig;
use assettrack_core::events::DomainEvent;
use assettrack_core::traits::NotificationSink;

/// Passes committed events to an optional sink.
///
/// Delivery failures are logged and dropped; they never reach the
/// caller of the transition that produced the event.
#[derive(Debug, Clone, Default)]
pub struct NotificationDispatcher {
    sink: Option<Arc<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    /// Dispatch every event to `sink`.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Drop every event.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Build according to configuration.
    pub fn from_config(config: &NotificationsConfig, sink: Arc<dyn NotificationSink>) -> Self {
        if config.enabled {
            Self::new(sink)
        } else {
            Self::disabled()
        }
    }

    /// Whether a sink is attached.
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Deliver one event.
    pub async fn dispatch(&self, event: DomainEvent) {
        let Some(sink) = &self.sink else {
            debug!(event = event.name(), "Notifications disabled, dropping event");
            return;
        };
        if let Err(e) = sink.deliver(&event).await {
            warn!(
                sink = sink.name(),
                event = event.name(),
                event_id = %event.id,
                error = %e,
                "Notification delivery failed"
            );
        }
    }

    /// Deliver several events in order.
    pub async fn dispatch_all(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.dispatch(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assettrack_core::error::AppError;
    use assettrack_core::events::AssetEvent;
    use assettrack_core::result::AppResult;
    use assettrack_core::types::id::{AssetId, UserId};
    use async_trait::async_trait;

    use crate::notification::sinks::BroadcastNotificationSink;

    #[derive(Debug)]
    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn deliver(&self, _event: &DomainEvent) -> AppResult<()> {
            Err(AppError::internal("mail server unreachable"))
        }
    }

    fn event() -> DomainEvent {
        DomainEvent::new(
            UserId(7),
            AssetEvent::Deleted {
                asset_id: AssetId(1),
                asset_tag: "T-1".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_sink_errors_are_swallowed() {
        let dispatcher = NotificationDispatcher::new(Arc::new(FailingSink));
        dispatcher.dispatch(event()).await;
    }

    #[tokio::test]
    async fn test_disabled_by_config() {
        let sink = Arc::new(BroadcastNotificationSink::new());
        let mut rx = sink.receiver();
        let config = NotificationsConfig { enabled: false };
        let dispatcher = NotificationDispatcher::from_config(&config, sink.clone());
        assert!(!dispatcher.is_enabled());
        dispatcher.dispatch(event()).await;
        assert!(rx.try_recv().is_err());

        let dispatcher = NotificationDispatcher::from_config(&NotificationsConfig::default(), sink);
        dispatcher.dispatch(event()).await;
        assert_eq!(rx.try_recv().unwrap().name(), "asset.deleted");
    }
}
