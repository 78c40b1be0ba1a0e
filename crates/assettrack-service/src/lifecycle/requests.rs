//! Inputs and outcomes of lifecycle operations.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assettrack_core::types::id::{StatusLabelId, UserId};
use assettrack_entity::asset::Asset;
use assettrack_entity::audit::AuditLogEntry;

/// Check an asset out to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// The new custodian.
    pub assigned_to: UserId,
    /// Effective time as typed by the operator; see
    /// [`crate::timestamp::normalize_event_time`].
    pub checkout_at: Option<String>,
    /// When the asset should come back.
    pub expected_checkin: Option<DateTime<Utc>>,
    /// Operator note.
    pub note: Option<String>,
    /// New display name, applied with the checkout when not blank.
    #[serde(default)]
    pub name: Option<String>,
}

impl CheckoutRequest {
    /// Checkout to `user`, effective now.
    pub fn to(user: UserId) -> Self {
        Self {
            assigned_to: user,
            checkout_at: None,
            expected_checkin: None,
            note: None,
            name: None,
        }
    }

    /// Set the effective time.
    pub fn at(mut self, checkout_at: impl Into<String>) -> Self {
        self.checkout_at = Some(checkout_at.into());
        self
    }

    /// Rename the asset as part of the checkout.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn new_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Check an asset back in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRequest {
    /// Effective time as typed by the operator.
    pub checkin_at: Option<String>,
    /// Status label to apply on return.
    pub status_id: Option<StatusLabelId>,
    /// Operator note.
    pub note: Option<String>,
}

/// Result of a checkin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinOutcome {
    /// Custody ended; the entry records it.
    CheckedIn(AuditLogEntry),
    /// Nobody held the asset. Nothing was written.
    AlreadyCheckedIn,
}

/// Result of a single-asset edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Fields were written.
    Updated {
        /// The stored asset.
        asset: Asset,
        /// The `update` entry.
        entry: AuditLogEntry,
    },
    /// The edit carried no fields. Nothing was written.
    NothingToUpdate,
}

/// A file to attach to an asset.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name of the file as uploaded by the client.
    pub original_name: String,
    /// File content.
    pub data: Bytes,
    /// Operator note.
    pub note: Option<String>,
}

/// A stored attachment read back.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Stored file name.
    pub filename: String,
    /// File content.
    pub data: Bytes,
}
