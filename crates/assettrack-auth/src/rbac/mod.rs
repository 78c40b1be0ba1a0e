//! Role-based privilege checks.

pub mod enforcer;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use policies::{Privilege, RbacPolicies};
