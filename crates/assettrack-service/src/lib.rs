//! # assettrack-service
//!
//! The asset lifecycle and audit engine. Services take their
//! collaborators as `Arc`s at construction time and an explicit
//! [`Actor`] on every call.
//!
//! Every mutation runs in its own store transaction together with its
//! audit entry. Events go to the [`NotificationDispatcher`] only after
//! the transaction has committed.

pub mod audit;
pub mod bulk;
pub mod lifecycle;
pub mod notification;
pub mod timestamp;

mod transaction;

pub use assettrack_auth::Actor;
pub use audit::AuditLog;
pub use bulk::{BulkCoordinator, BulkOperationResult, BulkStatus, ItemOutcome};
pub use lifecycle::{
    Attachment, CheckinOutcome, CheckinRequest, CheckoutRequest, EditOutcome, LifecycleService,
    UploadRequest,
};
pub use notification::{BroadcastNotificationSink, LogNotificationSink, NotificationDispatcher};
pub use timestamp::normalize_event_time;
