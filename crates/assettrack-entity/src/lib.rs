//! # assettrack-entity
//!
//! Domain entity models for AssetTrack. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! additionally derive `sqlx::FromRow`.
//!
//! The field-level mutation rules of an asset (what checkout, checkin,
//! delete, restore and patching do to the record) live on
//! [`asset::Asset`] itself so that every store applies them identically.

pub mod asset;
pub mod audit;
pub mod status;
pub mod user;
