//! # assettrack-storage
//!
//! Implementations of [`assettrack_core::traits::AttachmentStorage`].
//! Only the local filesystem provider ships today.

pub mod providers;

pub use providers::local::LocalAttachmentStorage;
