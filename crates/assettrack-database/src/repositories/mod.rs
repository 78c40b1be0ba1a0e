//! PostgreSQL repositories, one per table.
//!
//! Read methods borrow the shared pool. Write methods take a connection
//! so that the caller decides the transactional scope.

pub mod asset;
pub mod audit;
pub mod status_label;
pub mod user;

pub use asset::AssetRepository;
pub use audit::AuditLogRepository;
pub use status_label::StatusLabelRepository;
pub use user::UserRepository;

use assettrack_core::error::AppError;

/// Map a sqlx error, keeping its classification and prefixing context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| {
        let mapped = AppError::from(err);
        AppError {
            message: format!("{context}: {}", mapped.message),
            ..mapped
        }
    }
}
