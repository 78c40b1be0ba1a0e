//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;
use tokio::sync::broadcast;

use assettrack_auth::{AccessPolicy, Actor};
use assettrack_core::config::AccessConfig;
use assettrack_core::events::DomainEvent;
use assettrack_core::types::id::{AssetId, CompanyId, StatusLabelId, UserId};
use assettrack_database::MemoryStore;
use assettrack_database::store::AssetStore;
use assettrack_entity::asset::{Asset, NewAsset};
use assettrack_entity::audit::AuditLogEntry;
use assettrack_entity::status::StatusLabel;
use assettrack_entity::user::{User, UserRole};
use assettrack_service::{
    AuditLog, BroadcastNotificationSink, BulkCoordinator, LifecycleService,
    NotificationDispatcher,
};
use assettrack_storage::LocalAttachmentStorage;

pub const READY: StatusLabelId = StatusLabelId(1);
pub const PENDING: StatusLabelId = StatusLabelId(2);
pub const BROKEN: StatusLabelId = StatusLabelId(3);
pub const RETIRED: StatusLabelId = StatusLabelId(4);

pub const ADMIN: UserId = UserId(7);
pub const HOLDER: UserId = UserId(42);
pub const OTHER_HOLDER: UserId = UserId(43);
pub const OUTSIDER: UserId = UserId(50);

/// Services over a seeded in-memory store and a temporary upload root.
pub struct TestApp {
    pub store: MemoryStore,
    pub lifecycle: LifecycleService,
    pub bulk: BulkCoordinator,
    pub audit: Arc<AuditLog>,
    pub storage: Arc<LocalAttachmentStorage>,
    pub events: broadcast::Receiver<DomainEvent>,
    pub now: DateTime<Utc>,
    _uploads: TempDir,
}

impl TestApp {
    /// Unscoped access policy.
    pub async fn new() -> Self {
        Self::with_access(AccessConfig::default()).await
    }

    /// Company scoping switched on.
    pub async fn scoped() -> Self {
        Self::with_access(AccessConfig {
            full_company_support: true,
        })
        .await
    }

    async fn with_access(config: AccessConfig) -> Self {
        let store = MemoryStore::new();
        seed(&store).await;

        let uploads = TempDir::new().expect("tempdir");
        let storage = Arc::new(
            LocalAttachmentStorage::new(uploads.path().to_str().expect("utf-8 path"))
                .await
                .expect("storage"),
        );

        let sink = Arc::new(BroadcastNotificationSink::new());
        let events = sink.receiver();
        let notifier = Arc::new(NotificationDispatcher::new(sink));

        let shared: Arc<dyn AssetStore> = Arc::new(store.clone());
        let access = Arc::new(AccessPolicy::new(&config));
        let audit = Arc::new(AuditLog::new(shared.clone(), access.clone()));
        let lifecycle = LifecycleService::new(
            shared.clone(),
            access.clone(),
            audit.clone(),
            storage.clone(),
            notifier.clone(),
        );
        let bulk = BulkCoordinator::new(shared, access, audit.clone(), notifier);

        Self {
            store,
            lifecycle,
            bulk,
            audit,
            storage,
            events,
            now: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
            _uploads: uploads,
        }
    }

    /// An actor for a seeded user, pinned to [`Self::now`].
    pub async fn actor(&self, user_id: UserId) -> Actor {
        let user = self
            .store
            .find_user(user_id)
            .await
            .unwrap()
            .expect("seeded user");
        Actor::from_user(&user).at(self.now)
    }

    /// Add an asset with the given label.
    pub async fn add_asset(&self, id: i64, status: StatusLabelId) -> AssetId {
        self.add_company_asset(id, status, None).await
    }

    /// Add an asset owned by a company.
    pub async fn add_company_asset(
        &self,
        id: i64,
        status: StatusLabelId,
        company: Option<CompanyId>,
    ) -> AssetId {
        let asset = NewAsset {
            asset_tag: format!("TAG-{id:04}"),
            name: Some(format!("Laptop {id}")),
            serial: Some(format!("SN-{id}")),
            status_id: Some(status),
            company_id: company,
            ..NewAsset::default()
        }
        .into_asset(AssetId(id), UserId(1), self.now);
        self.store.put_asset(asset).await;
        AssetId(id)
    }

    /// Current stored state of an asset.
    pub async fn asset(&self, id: AssetId) -> Asset {
        self.store
            .find_asset(id)
            .await
            .unwrap()
            .expect("asset exists")
    }

    /// Every audit entry of an asset, hidden ones included.
    pub async fn entries(&self, id: AssetId) -> Vec<AuditLogEntry> {
        self.store.all_audit_entries(id).await
    }

    /// Events received so far.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

async fn seed(store: &MemoryStore) {
    store
        .put_status_label(StatusLabel::deployable(READY, "Ready to Deploy"))
        .await;
    store
        .put_status_label(StatusLabel::pending(PENDING, "Pending"))
        .await;
    store
        .put_status_label(StatusLabel::undeployable(BROKEN, "Broken"))
        .await;
    store
        .put_status_label(StatusLabel::archived(RETIRED, "Retired"))
        .await;

    store.put_user(user(1, "root", UserRole::SuperUser, None)).await;
    store.put_user(user(7, "operator", UserRole::Admin, None)).await;
    store
        .put_user(user(42, "jdoe", UserRole::User, Some(CompanyId(1))))
        .await;
    store
        .put_user(user(43, "asmith", UserRole::User, Some(CompanyId(1))))
        .await;
    store
        .put_user(user(50, "contractor", UserRole::User, Some(CompanyId(2))))
        .await;

    let mut gone = user(60, "former", UserRole::User, None);
    gone.deleted_at = Some(Utc::now());
    store.put_user(gone).await;
}

fn user(id: i64, username: &str, role: UserRole, company: Option<CompanyId>) -> User {
    User {
        id: UserId(id),
        username: username.to_string(),
        first_name: username.to_string(),
        last_name: None,
        email: Some(format!("{username}@example.com")),
        company_id: company,
        role,
        deleted_at: None,
    }
}
