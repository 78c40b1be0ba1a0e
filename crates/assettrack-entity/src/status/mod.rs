//! Status label vocabulary.

pub mod model;

pub use model::StatusLabel;
