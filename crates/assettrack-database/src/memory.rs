//! In-memory [`AssetStore`] for tests, demos and single-process use.
//!
//! Transactions stage their writes privately and apply them on commit
//! after checking that every touched asset still has the version the
//! transaction read. Write failures can be injected per asset.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use assettrack_core::error::AppError;
use assettrack_core::result::AppResult;
use assettrack_core::types::id::{AssetId, AuditLogId, StatusLabelId, UserId};
use assettrack_core::types::pagination::{PageRequest, PageResponse};
use assettrack_entity::asset::{Asset, NewAsset};
use assettrack_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use assettrack_entity::status::StatusLabel;
use assettrack_entity::user::User;

use crate::store::{AssetQuery, AssetStore, StoreTransaction};

#[derive(Debug, Default)]
struct InnerState {
    assets: BTreeMap<AssetId, Asset>,
    users: HashMap<UserId, User>,
    labels: HashMap<StatusLabelId, StatusLabel>,
    audit: BTreeMap<AuditLogId, AuditLogEntry>,
    last_asset_id: i64,
    last_audit_id: i64,
    failing_asset_writes: HashSet<AssetId>,
    failing_audit_writes: HashSet<AssetId>,
}

impl InnerState {
    fn next_asset_id(&mut self) -> AssetId {
        self.last_asset_id += 1;
        AssetId(self.last_asset_id)
    }

    fn next_audit_id(&mut self) -> AuditLogId {
        self.last_audit_id += 1;
        AuditLogId(self.last_audit_id)
    }

    fn visible_audit(&self, asset_id: AssetId) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> = self
            .audit
            .values()
            .filter(|e| e.asset_id == asset_id && e.is_visible())
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries
    }
}

/// Process-local store guarded by a Tokio mutex.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub async fn put_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Insert or replace a status label.
    pub async fn put_status_label(&self, label: StatusLabel) {
        self.state.lock().await.labels.insert(label.id, label);
    }

    /// Insert or replace an asset as-is, bypassing transactions.
    pub async fn put_asset(&self, asset: Asset) {
        let mut state = self.state.lock().await;
        state.last_asset_id = state.last_asset_id.max(asset.id.get());
        state.assets.insert(asset.id, asset);
    }

    /// Make every subsequent asset write for `asset_id` fail.
    pub async fn fail_writes_for(&self, asset_id: AssetId) {
        self.state
            .lock()
            .await
            .failing_asset_writes
            .insert(asset_id);
    }

    /// Make every subsequent audit append or hide for `asset_id` fail.
    pub async fn fail_audit_writes_for(&self, asset_id: AssetId) {
        self.state
            .lock()
            .await
            .failing_audit_writes
            .insert(asset_id);
    }

    /// Remove all injected failures.
    pub async fn clear_failures(&self) {
        let mut state = self.state.lock().await;
        state.failing_asset_writes.clear();
        state.failing_audit_writes.clear();
    }

    /// Every audit entry of an asset in insertion order, soft-deleted
    /// entries included.
    pub async fn all_audit_entries(&self, asset_id: AssetId) -> Vec<AuditLogEntry> {
        self.state
            .lock()
            .await
            .audit
            .values()
            .filter(|e| e.asset_id == asset_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        // Yield so concurrent callers interleave the way separate
        // connections would.
        tokio::task::yield_now().await;
        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            staged_assets: BTreeMap::new(),
            staged_audit: Vec::new(),
            audit_deletions: Vec::new(),
        }))
    }

    async fn find_asset(&self, id: AssetId) -> AppResult<Option<Asset>> {
        Ok(self.state.lock().await.assets.get(&id).cloned())
    }

    async fn find_asset_by_tag(&self, asset_tag: &str) -> AppResult<Option<Asset>> {
        Ok(self
            .state
            .lock()
            .await
            .assets
            .values()
            .find(|a| a.asset_tag == asset_tag)
            .cloned())
    }

    async fn list_assets(
        &self,
        query: &AssetQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>> {
        let state = self.state.lock().await;
        let matching: Vec<Asset> = state
            .assets
            .values()
            .filter(|a| query.company_id.is_none() || a.company_id == query.company_id)
            .filter(|a| {
                let label = a.status_id.and_then(|id| state.labels.get(&id));
                query.filter.matches(a, label)
            })
            .cloned()
            .collect();
        Ok(page.paginate(matching))
    }

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_status_label(&self, id: StatusLabelId) -> AppResult<Option<StatusLabel>> {
        Ok(self.state.lock().await.labels.get(&id).cloned())
    }

    async fn find_audit_entry(&self, id: AuditLogId) -> AppResult<Option<AuditLogEntry>> {
        Ok(self.state.lock().await.audit.get(&id).cloned())
    }

    async fn list_audit(&self, asset_id: AssetId) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self.state.lock().await.visible_audit(asset_id))
    }

    async fn page_audit(
        &self,
        asset_id: AssetId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        Ok(page.paginate(self.state.lock().await.visible_audit(asset_id)))
    }
}

/// A staged asset write and the version it was read at.
#[derive(Debug)]
struct StagedAsset {
    asset: Asset,
    /// `None` for inserts.
    read_version: Option<i64>,
}

/// Transaction over a [`MemoryStore`]. Dropping it discards the staged writes.
#[derive(Debug)]
pub struct MemoryTransaction {
    state: Arc<Mutex<InnerState>>,
    staged_assets: BTreeMap<AssetId, StagedAsset>,
    staged_audit: Vec<AuditLogEntry>,
    audit_deletions: Vec<(AuditLogId, DateTime<Utc>)>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_asset(&mut self, id: AssetId) -> AppResult<Option<Asset>> {
        if let Some(staged) = self.staged_assets.get(&id) {
            return Ok(Some(staged.asset.clone()));
        }
        Ok(self.state.lock().await.assets.get(&id).cloned())
    }

    async fn insert_asset(
        &mut self,
        draft: NewAsset,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Asset> {
        let tag = draft.asset_tag.trim().to_string();
        let mut state = self.state.lock().await;
        let taken = state.assets.values().any(|a| a.asset_tag == tag)
            || self.staged_assets.values().any(|s| s.asset.asset_tag == tag);
        if taken {
            return Err(AppError::conflict(format!(
                "Asset tag '{tag}' is already in use"
            )));
        }
        let id = state.next_asset_id();
        drop(state);

        let asset = draft.into_asset(id, created_by, now);
        self.staged_assets.insert(
            id,
            StagedAsset {
                asset: asset.clone(),
                read_version: None,
            },
        );
        Ok(asset)
    }

    async fn save_asset(&mut self, asset: &Asset) -> AppResult<Asset> {
        let state = self.state.lock().await;
        if state.failing_asset_writes.contains(&asset.id) {
            return Err(AppError::persistence(format!(
                "Injected write failure for asset {}",
                asset.id
            )));
        }
        let stored_version = match self.staged_assets.get(&asset.id) {
            Some(staged) => staged.asset.version,
            None => state
                .assets
                .get(&asset.id)
                .map(|a| a.version)
                .ok_or_else(|| AppError::not_found(format!("Asset {} not found", asset.id)))?,
        };
        drop(state);

        if stored_version != asset.version {
            return Err(AppError::conflict(format!(
                "Asset {} was modified by another request",
                asset.asset_tag
            )));
        }

        let mut updated = asset.clone();
        updated.version += 1;
        updated.updated_at = Utc::now();

        let read_version = match self.staged_assets.get(&asset.id) {
            Some(staged) => staged.read_version,
            None => Some(asset.version),
        };
        self.staged_assets.insert(
            asset.id,
            StagedAsset {
                asset: updated.clone(),
                read_version,
            },
        );
        Ok(updated)
    }

    async fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let mut state = self.state.lock().await;
        if state.failing_audit_writes.contains(&entry.asset_id) {
            return Err(AppError::persistence(format!(
                "Injected audit write failure for asset {}",
                entry.asset_id
            )));
        }
        let id = state.next_audit_id();
        drop(state);

        let stored = AuditLogEntry {
            id,
            asset_id: entry.asset_id,
            actor_id: entry.actor_id,
            checkedout_to: entry.checkedout_to,
            action: entry.action.as_str().to_string(),
            note: entry.note,
            filename: entry.filename,
            location_id: entry.location_id,
            created_at: entry.created_at.unwrap_or_else(Utc::now),
            deleted_at: None,
        };
        self.staged_audit.push(stored.clone());
        Ok(stored)
    }

    async fn soft_delete_audit(&mut self, id: AuditLogId, at: DateTime<Utc>) -> AppResult<()> {
        let state = self.state.lock().await;
        let owner = state
            .audit
            .get(&id)
            .filter(|e| e.is_visible())
            .or_else(|| self.staged_audit.iter().find(|e| e.id == id))
            .map(|e| e.asset_id);
        let Some(asset_id) = owner else {
            return Err(AppError::not_found(format!("Audit entry {id} not found")));
        };
        if state.failing_audit_writes.contains(&asset_id) {
            return Err(AppError::persistence(format!(
                "Injected audit write failure for asset {asset_id}"
            )));
        }
        drop(state);
        self.audit_deletions.push((id, at));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction {
            state: shared,
            staged_assets,
            staged_audit,
            audit_deletions,
        } = *self;
        let mut state = shared.lock().await;

        for staged in staged_assets.values() {
            match staged.read_version {
                Some(read) => {
                    let current = state.assets.get(&staged.asset.id).map(|a| a.version);
                    if current != Some(read) {
                        debug!(asset_id = %staged.asset.id, "Commit rejected, stale version");
                        return Err(AppError::conflict(format!(
                            "Asset {} was modified by another request",
                            staged.asset.asset_tag
                        )));
                    }
                }
                None => {
                    if state
                        .assets
                        .values()
                        .any(|a| a.asset_tag == staged.asset.asset_tag)
                    {
                        return Err(AppError::conflict(format!(
                            "Asset tag '{}' is already in use",
                            staged.asset.asset_tag
                        )));
                    }
                }
            }
        }

        for (id, staged) in staged_assets {
            state.assets.insert(id, staged.asset);
        }
        for entry in staged_audit {
            state.audit.insert(entry.id, entry);
        }
        for (id, at) in audit_deletions {
            if let Some(entry) = state.audit.get_mut(&id) {
                entry.deleted_at = Some(at);
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        debug!(
            staged_assets = self.staged_assets.len(),
            staged_audit = self.staged_audit.len(),
            "Discarding memory transaction"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assettrack_core::error::ErrorKind;
    use assettrack_entity::audit::ActionKind;

    async fn seeded() -> (MemoryStore, Asset) {
        let store = MemoryStore::new();
        let asset = NewAsset {
            asset_tag: "MEM-1".to_string(),
            ..NewAsset::default()
        }
        .into_asset(AssetId(1), UserId(1), Utc::now());
        store.put_asset(asset.clone()).await;
        (store, asset)
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let (store, asset) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let mut locked = tx.lock_asset(asset.id).await.unwrap().unwrap();
        locked.notes = Some("staged".to_string());
        tx.save_asset(&locked).await.unwrap();
        tx.append_audit(CreateAuditLogEntry::new(asset.id, UserId(1), ActionKind::Update))
            .await
            .unwrap();

        let seen = store.find_asset(asset.id).await.unwrap().unwrap();
        assert_eq!(seen.notes, None);
        tx.rollback().await.unwrap();

        assert!(store.list_audit(asset.id).await.unwrap().is_empty());
        assert_eq!(store.find_asset(asset.id).await.unwrap().unwrap().version, 0);
    }

    #[tokio::test]
    async fn test_second_committer_gets_conflict() {
        let (store, asset) = seeded().await;
        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        let a = first.lock_asset(asset.id).await.unwrap().unwrap();
        let b = second.lock_asset(asset.id).await.unwrap().unwrap();
        first.save_asset(&a).await.unwrap();
        second.save_asset(&b).await.unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
        assert_eq!(store.find_asset(asset.id).await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let (store, asset) = seeded().await;
        store.fail_writes_for(asset.id).await;
        let mut tx = store.begin().await.unwrap();
        let locked = tx.lock_asset(asset.id).await.unwrap().unwrap();
        let err = tx.save_asset(&locked).await.unwrap_err();
        assert!(err.is(ErrorKind::Persistence));

        store.clear_failures().await;
        store.fail_audit_writes_for(asset.id).await;
        let mut tx = store.begin().await.unwrap();
        let err = tx
            .append_audit(CreateAuditLogEntry::new(asset.id, UserId(1), ActionKind::Deleted))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Persistence));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_tag() {
        let (store, _) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let draft = NewAsset {
            asset_tag: "MEM-1".to_string(),
            ..NewAsset::default()
        };
        let err = tx
            .insert_asset(draft, UserId(1), Utc::now())
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_history_order_and_soft_delete() {
        let (store, asset) = seeded().await;
        let at = Utc::now();
        let mut tx = store.begin().await.unwrap();
        let first = tx
            .append_audit(CreateAuditLogEntry::new(asset.id, UserId(1), ActionKind::Uploaded).at(at))
            .await
            .unwrap();
        let second = tx
            .append_audit(CreateAuditLogEntry::new(asset.id, UserId(1), ActionKind::Update).at(at))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let history = store.list_audit(asset.id).await.unwrap();
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);

        let mut tx = store.begin().await.unwrap();
        tx.soft_delete_audit(first.id, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.list_audit(asset.id).await.unwrap().len(), 1);
        assert_eq!(store.all_audit_entries(asset.id).await.len(), 2);
    }
}
