//! Notification sink trait consumed by the dispatcher.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Receives completed-transition events for out-of-band delivery
/// (email, chat, push). Errors are reported back to the dispatcher,
/// which logs and drops them.
#[async_trait]
pub trait NotificationSink: Send + Sync + std::fmt::Debug + 'static {
    /// Sink name used in log fields.
    fn name(&self) -> &str;

    /// Deliver one event.
    async fn deliver(&self, event: &DomainEvent) -> AppResult<()>;
}
