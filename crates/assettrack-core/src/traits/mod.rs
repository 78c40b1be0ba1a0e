//! Collaborator traits defined in `assettrack-core` and implemented by
//! other crates (or by the host application).

pub mod notifier;
pub mod storage;

pub use notifier::NotificationSink;
pub use storage::AttachmentStorage;
