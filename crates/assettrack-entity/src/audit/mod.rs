//! Audit log entities.

pub mod action;
pub mod model;

pub use action::ActionKind;
pub use model::{AuditLogEntry, CreateAuditLogEntry};
