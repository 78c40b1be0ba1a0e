//! Hand-off of completed transitions to notification sinks.

pub mod dispatcher;
pub mod sinks;

pub use dispatcher::NotificationDispatcher;
pub use sinks::{BroadcastNotificationSink, LogNotificationSink};
