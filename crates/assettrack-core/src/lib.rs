//! # assettrack-core
//!
//! Core crate for AssetTrack. Contains collaborator traits, configuration
//! schemas, typed identifiers, domain events, pagination types, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other AssetTrack crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
