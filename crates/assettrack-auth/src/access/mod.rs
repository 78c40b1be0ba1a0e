//! Company-scoped access to assets.

pub mod policy;

pub use policy::AccessPolicy;
