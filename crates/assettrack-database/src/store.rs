//! Store abstraction consumed by the lifecycle and bulk services.
//!
//! Reads outside a transaction go through [`AssetStore`] directly. Every
//! mutation happens inside a [`StoreTransaction`] obtained from
//! [`AssetStore::begin`]; nothing staged in a transaction is visible to
//! other callers until [`StoreTransaction::commit`] succeeds, and a
//! transaction dropped without committing is rolled back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use assettrack_core::result::AppResult;
use assettrack_core::types::id::{AssetId, AuditLogId, CompanyId, StatusLabelId, UserId};
use assettrack_core::types::pagination::{PageRequest, PageResponse};
use assettrack_entity::asset::{Asset, AssetFilter, NewAsset};
use assettrack_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use assettrack_entity::status::StatusLabel;
use assettrack_entity::user::User;

/// Listing criteria for [`AssetStore::list_assets`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetQuery {
    /// Restrict to one company. `None` lists across companies.
    pub company_id: Option<CompanyId>,
    /// Derived-state filter.
    pub filter: AssetFilter,
}

/// Read access to the record store and the entry point for transactions.
#[async_trait]
pub trait AssetStore: Send + Sync + 'static {
    /// Backend name used in log fields.
    fn backend(&self) -> &'static str;

    /// Open a transactional scope.
    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;

    /// Find an asset by id, soft-deleted rows included.
    async fn find_asset(&self, id: AssetId) -> AppResult<Option<Asset>>;

    /// Find an asset by its tag, soft-deleted rows included.
    async fn find_asset_by_tag(&self, asset_tag: &str) -> AppResult<Option<Asset>>;

    /// List assets ordered by id.
    async fn list_assets(
        &self,
        query: &AssetQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>>;

    /// Find a user by id.
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a status label by id.
    async fn find_status_label(&self, id: StatusLabelId) -> AppResult<Option<StatusLabel>>;

    /// Find an audit entry by id, soft-deleted entries included.
    async fn find_audit_entry(&self, id: AuditLogId) -> AppResult<Option<AuditLogEntry>>;

    /// Visible audit entries of an asset, newest first, ties broken by
    /// descending id.
    async fn list_audit(&self, asset_id: AssetId) -> AppResult<Vec<AuditLogEntry>>;

    /// One page of [`AssetStore::list_audit`].
    async fn page_audit(
        &self,
        asset_id: AssetId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}

/// One atomic unit of work against the store.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Re-read an asset for update. The PostgreSQL store holds a row lock
    /// until the transaction ends.
    async fn lock_asset(&mut self, id: AssetId) -> AppResult<Option<Asset>>;

    /// Insert a new asset. A duplicate asset tag fails with `Conflict`.
    async fn insert_asset(
        &mut self,
        draft: NewAsset,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Asset>;

    /// Write every field of `asset` back.
    ///
    /// `asset.version` must still match the stored version; otherwise
    /// another writer got there first and the call fails with `Conflict`.
    /// Returns the stored row with its bumped version.
    async fn save_asset(&mut self, asset: &Asset) -> AppResult<Asset>;

    /// Append an audit entry.
    async fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Soft-delete an audit entry.
    async fn soft_delete_audit(&mut self, id: AuditLogId, at: DateTime<Utc>) -> AppResult<()>;

    /// Make every staged write visible.
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// Discard every staged write.
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}
