//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assettrack_core::types::id::{AssetId, AuditLogId, LocationId, UserId};

use super::action::ActionKind;

/// An immutable audit log entry recording one lifecycle event on an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Unique audit entry identifier.
    pub id: AuditLogId,
    /// The asset the event happened to.
    pub asset_id: AssetId,
    /// The user who performed the action.
    pub actor_id: UserId,
    /// The custodian involved (checkout target, or previous holder on checkin).
    pub checkedout_to: Option<UserId>,
    /// Persisted action string, see [`ActionKind`].
    pub action: String,
    /// Free-text operator note.
    pub note: Option<String>,
    /// Stored attachment name for `uploaded` entries.
    pub filename: Option<String>,
    /// Location recorded with the event, if any.
    pub location_id: Option<LocationId>,
    /// When the event happened (may be backdated for checkout/checkin).
    pub created_at: DateTime<Utc>,
    /// Set only when the attachment this entry records has been removed.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuditLogEntry {
    /// Parse the persisted action string.
    pub fn action_kind(&self) -> Option<ActionKind> {
        self.action.parse().ok()
    }

    /// Whether the entry is still visible in history.
    pub fn is_visible(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Data required to append a new audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// The asset.
    pub asset_id: AssetId,
    /// The acting user.
    pub actor_id: UserId,
    /// The action performed.
    pub action: ActionKind,
    /// Target custodian.
    pub checkedout_to: Option<UserId>,
    /// Operator note.
    pub note: Option<String>,
    /// Attachment name.
    pub filename: Option<String>,
    /// Location recorded with the event.
    pub location_id: Option<LocationId>,
    /// Explicit event time; `None` means the instant the entry is written.
    pub created_at: Option<DateTime<Utc>>,
}

impl CreateAuditLogEntry {
    /// Start an entry for the given asset, actor and action.
    pub fn new(asset_id: AssetId, actor_id: UserId, action: ActionKind) -> Self {
        Self {
            asset_id,
            actor_id,
            action,
            checkedout_to: None,
            note: None,
            filename: None,
            location_id: None,
            created_at: None,
        }
    }

    /// Record the custodian involved.
    pub fn with_target(mut self, user_id: UserId) -> Self {
        self.checkedout_to = Some(user_id);
        self
    }

    /// Attach an operator note. Blank notes are dropped.
    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        self
    }

    /// Attach a stored file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Record a location.
    pub fn with_location(mut self, location_id: Option<LocationId>) -> Self {
        self.location_id = location_id;
        self
    }

    /// Pin the event time.
    pub fn at(mut self, when: DateTime<Utc>) -> Self {
        self.created_at = Some(when);
        self
    }
}
