//! PostgreSQL-backed [`AssetStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use assettrack_core::error::AppError;
use assettrack_core::result::AppResult;
use assettrack_core::types::id::{AssetId, AuditLogId, StatusLabelId, UserId};
use assettrack_core::types::pagination::{PageRequest, PageResponse};
use assettrack_entity::asset::{Asset, NewAsset};
use assettrack_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use assettrack_entity::status::StatusLabel;
use assettrack_entity::user::User;

use crate::repositories::{
    db_error, AssetRepository, AuditLogRepository, StatusLabelRepository, UserRepository,
};
use crate::store::{AssetQuery, AssetStore, StoreTransaction};

/// Store backed by PostgreSQL.
///
/// Concurrent writers are serialized by `SELECT ... FOR UPDATE` in
/// [`StoreTransaction::lock_asset`] and by the `version` predicate on
/// every update.
#[derive(Debug, Clone)]
pub struct PgAssetStore {
    pool: PgPool,
    assets: AssetRepository,
    audit: AuditLogRepository,
    users: UserRepository,
    labels: StatusLabelRepository,
}

impl PgAssetStore {
    /// Build a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            assets: AssetRepository::new(pool.clone()),
            audit: AuditLogRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            labels: StatusLabelRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl AssetStore for PgAssetStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }

    async fn find_asset(&self, id: AssetId) -> AppResult<Option<Asset>> {
        self.assets.find_by_id(id).await
    }

    async fn find_asset_by_tag(&self, asset_tag: &str) -> AppResult<Option<Asset>> {
        self.assets.find_by_tag(asset_tag).await
    }

    async fn list_assets(
        &self,
        query: &AssetQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>> {
        self.assets.list(query, page).await
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_status_label(&self, id: StatusLabelId) -> AppResult<Option<StatusLabel>> {
        self.labels.find_by_id(id).await
    }

    async fn find_audit_entry(&self, id: AuditLogId) -> AppResult<Option<AuditLogEntry>> {
        self.audit.find_by_id(id).await
    }

    async fn list_audit(&self, asset_id: AssetId) -> AppResult<Vec<AuditLogEntry>> {
        self.audit.find_by_asset(asset_id).await
    }

    async fn page_audit(
        &self,
        asset_id: AssetId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.audit.page_by_asset(asset_id, page).await
    }
}

/// A PostgreSQL transaction. Dropping it without commit rolls back.
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn lock_asset(&mut self, id: AssetId) -> AppResult<Option<Asset>> {
        AssetRepository::lock(&mut self.tx, id).await
    }

    async fn insert_asset(
        &mut self,
        draft: NewAsset,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Asset> {
        AssetRepository::insert(&mut self.tx, &draft, created_by, now).await
    }

    async fn save_asset(&mut self, asset: &Asset) -> AppResult<Asset> {
        AssetRepository::update_versioned(&mut self.tx, asset)
            .await?
            .ok_or_else(|| {
                debug!(asset_id = %asset.id, version = asset.version, "Stale asset version");
                AppError::conflict(format!(
                    "Asset {} was modified by another request",
                    asset.asset_tag
                ))
            })
    }

    async fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        AuditLogRepository::insert(&mut self.tx, &entry).await
    }

    async fn soft_delete_audit(&mut self, id: AuditLogId, at: DateTime<Utc>) -> AppResult<()> {
        AuditLogRepository::soft_delete(&mut self.tx, id, at).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(db_error("Failed to roll back transaction"))
    }
}
