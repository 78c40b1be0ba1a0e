//! Attachment storage providers.

pub mod local;
