//! Recording and reading asset audit entries.

use std::sync::Arc;

use tracing::debug;

use assettrack_auth::{AccessPolicy, Actor};
use assettrack_core::error::AppError;
use assettrack_core::result::AppResult;
use assettrack_core::types::id::AssetId;
use assettrack_core::types::pagination::{PageRequest, PageResponse};
use assettrack_database::store::{AssetStore, StoreTransaction};
use assettrack_entity::asset::Asset;
use assettrack_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

/// Writes entries inside the caller's transaction and serves history.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn AssetStore>,
    access: Arc<AccessPolicy>,
}

impl AuditLog {
    /// Creates a new audit log.
    pub fn new(store: Arc<dyn AssetStore>, access: Arc<AccessPolicy>) -> Self {
        Self { store, access }
    }

    /// Append an entry inside `tx`. A failure here must abort the
    /// surrounding transition.
    pub async fn record(
        &self,
        tx: &mut dyn StoreTransaction,
        entry: CreateAuditLogEntry,
    ) -> AppResult<AuditLogEntry> {
        let stored = tx.append_audit(entry).await?;
        debug!(
            log_id = %stored.id,
            asset_id = %stored.asset_id,
            action = %stored.action,
            "Audit entry staged"
        );
        Ok(stored)
    }

    /// Visible entries of an asset, newest first.
    pub async fn history(&self, actor: &Actor, asset_id: AssetId) -> AppResult<Vec<AuditLogEntry>> {
        self.accessible_asset(actor, asset_id).await?;
        self.store.list_audit(asset_id).await
    }

    /// One page of [`Self::history`].
    pub async fn page_for(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.accessible_asset(actor, asset_id).await?;
        self.store.page_audit(asset_id, page).await
    }

    /// History stays readable for soft-deleted assets.
    async fn accessible_asset(&self, actor: &Actor, asset_id: AssetId) -> AppResult<Asset> {
        let asset = self
            .store
            .find_asset(asset_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {asset_id} not found")))?;
        self.access.require_access(actor, &asset)?;
        Ok(asset)
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("store", &self.store.backend())
            .finish()
    }
}
