//! Single-asset lifecycle transitions.

pub mod naming;
pub mod requests;
pub mod service;

pub use requests::{
    Attachment, CheckinOutcome, CheckinRequest, CheckoutRequest, EditOutcome, UploadRequest,
};
pub use service::LifecycleService;
