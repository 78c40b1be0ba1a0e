//! Asset lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{AssetId, AuditLogId, UserId};

/// Events describing completed asset transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetEvent {
    /// An asset was checked out to a user.
    CheckedOut {
        /// The asset.
        asset_id: AssetId,
        /// Human asset tag, for message rendering.
        asset_tag: String,
        /// The new custodian.
        assigned_to: UserId,
        /// Effective checkout time.
        checkout_at: DateTime<Utc>,
        /// When the asset is expected back.
        expected_checkin: Option<DateTime<Utc>>,
        /// Operator note.
        note: Option<String>,
        /// The audit entry recording the checkout.
        log_id: AuditLogId,
    },
    /// An asset was checked back into inventory.
    CheckedIn {
        /// The asset.
        asset_id: AssetId,
        /// Human asset tag.
        asset_tag: String,
        /// The custodian the asset came back from.
        previous_assignee: UserId,
        /// Effective checkin time.
        checkin_at: DateTime<Utc>,
        /// Operator note.
        note: Option<String>,
        /// The audit entry recording the checkin.
        log_id: AuditLogId,
    },
    /// Fields of an asset were edited (single or bulk).
    Updated {
        /// The asset.
        asset_id: AssetId,
        /// Names of the fields that were written.
        changed_fields: Vec<String>,
    },
    /// An asset was soft-deleted.
    Deleted {
        /// The asset.
        asset_id: AssetId,
        /// Human asset tag.
        asset_tag: String,
    },
    /// A soft-deleted asset was restored.
    Restored {
        /// The asset.
        asset_id: AssetId,
        /// Human asset tag.
        asset_tag: String,
    },
    /// A file was attached to an asset.
    FileUploaded {
        /// The asset.
        asset_id: AssetId,
        /// Stored file name.
        filename: String,
    },
}

impl AssetEvent {
    /// Short machine name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckedOut { .. } => "asset.checked_out",
            Self::CheckedIn { .. } => "asset.checked_in",
            Self::Updated { .. } => "asset.updated",
            Self::Deleted { .. } => "asset.deleted",
            Self::Restored { .. } => "asset.restored",
            Self::FileUploaded { .. } => "asset.file_uploaded",
        }
    }

    /// The asset this event concerns.
    pub fn asset_id(&self) -> AssetId {
        match self {
            Self::CheckedOut { asset_id, .. }
            | Self::CheckedIn { asset_id, .. }
            | Self::Updated { asset_id, .. }
            | Self::Deleted { asset_id, .. }
            | Self::Restored { asset_id, .. }
            | Self::FileUploaded { asset_id, .. } => *asset_id,
        }
    }
}
