//! Status label entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assettrack_core::types::id::StatusLabelId;

/// A vocabulary entry describing asset condition ("Ready to Deploy",
/// "Broken", "Out for Repair", ...).
///
/// The flags drive the derived availability classification of every
/// asset that references the label; they are never copied onto the asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StatusLabel {
    /// Unique label identifier.
    pub id: StatusLabelId,
    /// Display name.
    pub name: String,
    /// Assets with this label may be checked out.
    pub deployable: bool,
    /// Assets with this label are awaiting something (repair, setup).
    pub pending: bool,
    /// Assets with this label are retired from circulation.
    pub archived: bool,
}

impl StatusLabel {
    /// A label that allows checkout.
    pub fn deployable(id: StatusLabelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deployable: true,
            pending: false,
            archived: false,
        }
    }

    /// A label that marks assets as pending.
    pub fn pending(id: StatusLabelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deployable: false,
            pending: true,
            archived: false,
        }
    }

    /// A label that marks assets as undeployable.
    pub fn undeployable(id: StatusLabelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deployable: false,
            pending: false,
            archived: false,
        }
    }

    /// A label that archives assets.
    pub fn archived(id: StatusLabelId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deployable: false,
            pending: false,
            archived: true,
        }
    }
}
