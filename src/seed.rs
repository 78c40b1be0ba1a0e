//! Demo records for `--memory` runs.

use chrono::Utc;

use assettrack_core::types::id::{AssetId, CompanyId, StatusLabelId, UserId};
use assettrack_database::MemoryStore;
use assettrack_entity::asset::NewAsset;
use assettrack_entity::status::StatusLabel;
use assettrack_entity::user::{User, UserRole};

pub const READY: StatusLabelId = StatusLabelId(1);
pub const PENDING: StatusLabelId = StatusLabelId(2);
pub const BROKEN: StatusLabelId = StatusLabelId(3);
pub const RETIRED: StatusLabelId = StatusLabelId(4);

/// Fill an empty store with a few labels, users and assets.
pub async fn populate(store: &MemoryStore) {
    for label in [
        StatusLabel::deployable(READY, "Ready to Deploy"),
        StatusLabel::pending(PENDING, "Pending"),
        StatusLabel::undeployable(BROKEN, "Broken"),
        StatusLabel::archived(RETIRED, "Retired"),
    ] {
        store.put_status_label(label).await;
    }

    for (id, username, role, company) in [
        (1, "admin", UserRole::SuperUser, None),
        (7, "operator", UserRole::Admin, None),
        (42, "jdoe", UserRole::User, Some(CompanyId(1))),
        (43, "asmith", UserRole::User, Some(CompanyId(2))),
    ] {
        store
            .put_user(User {
                id: UserId(id),
                username: username.to_string(),
                first_name: username.to_string(),
                last_name: None,
                email: Some(format!("{username}@example.com")),
                company_id: company,
                role,
                deleted_at: None,
            })
            .await;
    }

    let now = Utc::now();
    for (id, tag, name, status, company) in [
        (100, "LAP-0100", "ThinkPad T14", READY, Some(CompanyId(1))),
        (101, "LAP-0101", "MacBook Pro 14", READY, Some(CompanyId(1))),
        (102, "MON-0102", "Dell U2723QE", PENDING, Some(CompanyId(2))),
        (103, "PHN-0103", "Pixel 8", BROKEN, None),
        (104, "SRV-0104", "PowerEdge R650", RETIRED, None),
    ] {
        let asset = NewAsset {
            asset_tag: tag.to_string(),
            name: Some(name.to_string()),
            status_id: Some(status),
            company_id: company,
            requestable: id % 2 == 0,
            ..NewAsset::default()
        }
        .into_asset(AssetId(id), UserId(1), now);
        store.put_asset(asset).await;
    }
}
