//! Derived lifecycle state.
//!
//! The state is never stored on the record. It is recomputed from
//! `deleted_at`, `assigned_to`, the archived flag, and the referenced
//! status label every time it is needed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use assettrack_core::AppError;

use super::model::Asset;
use crate::status::StatusLabel;

/// Visible lifecycle state of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Soft-deleted.
    Deleted,
    /// Checked out to a user.
    Deployed,
    /// Retired from circulation.
    Archived,
    /// Available and deployable.
    ReadyToDeploy,
    /// Available but waiting on something.
    Pending,
    /// Available but not deployable.
    Undeployable,
}

impl AssetState {
    /// Classify an asset. Precedence: deleted, deployed, archived, then
    /// the label's own flags. An asset without a label is undeployable.
    pub fn classify(asset: &Asset, label: Option<&StatusLabel>) -> Self {
        if asset.deleted_at.is_some() {
            return Self::Deleted;
        }
        if asset.assigned_to.is_some() {
            return Self::Deployed;
        }
        if asset.archived || label.is_some_and(|l| l.archived) {
            return Self::Archived;
        }
        match label {
            Some(l) if l.deployable => Self::ReadyToDeploy,
            Some(l) if l.pending => Self::Pending,
            _ => Self::Undeployable,
        }
    }

    /// Whether the asset sits in inventory (not deployed, archived or deleted).
    pub fn is_available(&self) -> bool {
        matches!(self, Self::ReadyToDeploy | Self::Pending | Self::Undeployable)
    }

    /// Return the state as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Deployed => "deployed",
            Self::Archived => "archived",
            Self::ReadyToDeploy => "ready_to_deploy",
            Self::Pending => "pending",
            Self::Undeployable => "undeployable",
        }
    }
}

impl fmt::Display for AssetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing filter over the derived state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFilter {
    /// Every visible (non-deleted) asset.
    #[default]
    All,
    /// Ready to deploy.
    ReadyToDeploy,
    /// Pending.
    Pending,
    /// Undeployable.
    Undeployable,
    /// Archived.
    Archived,
    /// Requestable and not checked out.
    Requestable,
    /// Checked out.
    Deployed,
    /// Soft-deleted only.
    Deleted,
}

impl AssetFilter {
    /// Whether the filter includes soft-deleted rows.
    pub fn includes_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Apply the filter to one asset.
    pub fn matches(&self, asset: &Asset, label: Option<&StatusLabel>) -> bool {
        let state = asset.state(label);
        match self {
            Self::All => state != AssetState::Deleted,
            Self::ReadyToDeploy => state == AssetState::ReadyToDeploy,
            Self::Pending => state == AssetState::Pending,
            Self::Undeployable => state == AssetState::Undeployable,
            Self::Archived => state == AssetState::Archived,
            Self::Requestable => asset.requestable && state.is_available(),
            Self::Deployed => state == AssetState::Deployed,
            Self::Deleted => state == AssetState::Deleted,
        }
    }
}

impl FromStr for AssetFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(Self::All),
            "rtd" | "ready_to_deploy" => Ok(Self::ReadyToDeploy),
            "pending" => Ok(Self::Pending),
            "undeployable" => Ok(Self::Undeployable),
            "archived" => Ok(Self::Archived),
            "requestable" => Ok(Self::Requestable),
            "deployed" => Ok(Self::Deployed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::validation(format!("Unknown asset filter '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::model::NewAsset;
    use assettrack_core::types::id::{AssetId, StatusLabelId, UserId};
    use chrono::Utc;

    fn asset() -> Asset {
        NewAsset {
            asset_tag: "T-1".to_string(),
            ..NewAsset::default()
        }
        .into_asset(AssetId(1), UserId(1), Utc::now())
    }

    #[test]
    fn test_precedence_deleted_over_deployed() {
        let label = StatusLabel::deployable(StatusLabelId(1), "Ready");
        let mut a = asset();
        assert_eq!(a.state(Some(&label)), AssetState::ReadyToDeploy);
        a.assigned_to = Some(UserId(4));
        assert_eq!(a.state(Some(&label)), AssetState::Deployed);
        a.deleted_at = Some(Utc::now());
        assert_eq!(a.state(Some(&label)), AssetState::Deleted);
    }

    #[test]
    fn test_label_flags_drive_sub_classification() {
        let a = asset();
        let pending = StatusLabel::pending(StatusLabelId(2), "Out for repair");
        let broken = StatusLabel::undeployable(StatusLabelId(3), "Broken");
        let archived = StatusLabel::archived(StatusLabelId(4), "Retired");
        assert_eq!(a.state(Some(&pending)), AssetState::Pending);
        assert_eq!(a.state(Some(&broken)), AssetState::Undeployable);
        assert_eq!(a.state(Some(&archived)), AssetState::Archived);
        assert_eq!(a.state(None), AssetState::Undeployable);
    }

    #[test]
    fn test_requestable_filter_excludes_deployed() {
        let label = StatusLabel::deployable(StatusLabelId(1), "Ready");
        let mut a = asset();
        a.requestable = true;
        assert!(AssetFilter::Requestable.matches(&a, Some(&label)));
        a.assigned_to = Some(UserId(9));
        assert!(!AssetFilter::Requestable.matches(&a, Some(&label)));
        assert!(AssetFilter::Deployed.matches(&a, Some(&label)));
        assert!("RTD".parse::<AssetFilter>().is_ok());
    }
}
