//! # assettrack-auth
//!
//! Authorization for AssetTrack. Authentication happens upstream; this
//! crate only decides what an already identified [`Actor`] may do.
//!
//! ## Modules
//!
//! - `actor`: the explicit acting-user value passed into every core call
//! - `rbac`: role to privilege mapping and enforcement
//! - `access`: company-scoped asset access policy

pub mod access;
pub mod actor;
pub mod rbac;

pub use access::AccessPolicy;
pub use actor::Actor;
pub use rbac::{Privilege, RbacEnforcer, RbacPolicies};
