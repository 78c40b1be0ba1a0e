//! Audit action kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use assettrack_core::AppError;

/// The kind of lifecycle event an audit entry records.
///
/// The string forms are the values persisted in `asset_logs.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Custody handed to a user.
    #[serde(rename = "checkout")]
    Checkout,
    /// Custody returned to inventory.
    #[serde(rename = "checkin from")]
    CheckinFrom,
    /// Asset soft-deleted.
    #[serde(rename = "deleted")]
    Deleted,
    /// Asset restored from soft deletion.
    #[serde(rename = "restored")]
    Restored,
    /// File attached to the asset.
    #[serde(rename = "uploaded")]
    Uploaded,
    /// Asset fields edited.
    #[serde(rename = "update")]
    Update,
}

impl ActionKind {
    /// Return the persisted string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::CheckinFrom => "checkin from",
            Self::Deleted => "deleted",
            Self::Restored => "restored",
            Self::Uploaded => "uploaded",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout" => Ok(Self::Checkout),
            "checkin from" => Ok(Self::CheckinFrom),
            "deleted" => Ok(Self::Deleted),
            "restored" => Ok(Self::Restored),
            "uploaded" => Ok(Self::Uploaded),
            "update" => Ok(Self::Update),
            other => Err(AppError::validation(format!("Unknown audit action '{other}'"))),
        }
    }
}
