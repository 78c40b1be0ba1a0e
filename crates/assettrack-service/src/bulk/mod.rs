//! Lifecycle operations applied across many assets.

pub mod coordinator;
pub mod result;

pub use coordinator::BulkCoordinator;
pub use result::{BulkOperationResult, BulkStatus, ItemOutcome};
