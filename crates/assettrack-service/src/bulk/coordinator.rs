//! Bulk field patch and bulk delete.
//!
//! The administer check runs once for the whole call. Each asset then
//! gets its own transaction, so a failure on one item rolls back only
//! that item and is reported as [`ItemOutcome::Failed`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{info, warn};

use assettrack_auth::{AccessPolicy, Actor};
use assettrack_core::error::AppError;
use assettrack_core::events::{AssetEvent, DomainEvent};
use assettrack_core::result::AppResult;
use assettrack_core::types::id::AssetId;
use assettrack_database::store::AssetStore;
use assettrack_entity::asset::{Asset, AssetPatch};
use assettrack_entity::audit::{ActionKind, CreateAuditLogEntry};

use super::result::{BulkOperationResult, ItemOutcome};
use crate::audit::AuditLog;
use crate::lifecycle::service::lock_current;
use crate::notification::NotificationDispatcher;
use crate::transaction::settle;

/// Applies one change to many assets with per-item isolation.
#[derive(Clone)]
pub struct BulkCoordinator {
    store: Arc<dyn AssetStore>,
    access: Arc<AccessPolicy>,
    audit: Arc<AuditLog>,
    notifier: Arc<NotificationDispatcher>,
}

/// Per-item result before aggregation.
enum Step {
    Done(DomainEvent),
    Skip(&'static str),
}

impl BulkCoordinator {
    /// Creates a new bulk coordinator.
    pub fn new(
        store: Arc<dyn AssetStore>,
        access: Arc<AccessPolicy>,
        audit: Arc<AuditLog>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            access,
            audit,
            notifier,
        }
    }

    /// Write the fields present in `patch` to every listed asset.
    pub async fn apply_field_patch(
        &self,
        actor: &Actor,
        asset_ids: &[AssetId],
        patch: &AssetPatch,
    ) -> AppResult<BulkOperationResult> {
        self.access.require_administer(actor)?;
        if patch.is_empty() || asset_ids.is_empty() {
            info!(actor_id = %actor.user_id, "Bulk patch has nothing to update");
            return Ok(BulkOperationResult::nothing_to_update());
        }
        patch.validate()?;
        if let Some(status_id) = patch.status_id {
            if self.store.find_status_label(status_id).await?.is_none() {
                return Err(AppError::validation(format!(
                    "Unknown status label {status_id}"
                )));
            }
        }

        let mut items = BTreeMap::new();
        let mut events = Vec::new();
        for asset_id in unique(asset_ids) {
            let outcome = match self.patch_one(actor, asset_id, patch).await {
                Ok(Step::Done(event)) => {
                    events.push(event);
                    ItemOutcome::Applied
                }
                Ok(Step::Skip(reason)) => ItemOutcome::Skipped(reason.to_string()),
                Err(err) => {
                    warn!(asset_id = %asset_id, error = %err, "Bulk patch item failed");
                    ItemOutcome::Failed(err.message)
                }
            };
            items.insert(asset_id, outcome);
        }

        let result = BulkOperationResult::from_items(items);
        info!(
            actor_id = %actor.user_id,
            fields = ?patch.field_names(),
            applied = result.applied,
            skipped = result.skipped,
            failed = result.failed,
            "Bulk patch finished"
        );
        self.notifier.dispatch_all(events).await;
        Ok(result)
    }

    /// Soft-delete every listed asset.
    pub async fn apply_bulk_delete(
        &self,
        actor: &Actor,
        asset_ids: &[AssetId],
    ) -> AppResult<BulkOperationResult> {
        self.access.require_administer(actor)?;
        if asset_ids.is_empty() {
            return Ok(BulkOperationResult::nothing_to_update());
        }

        let mut items = BTreeMap::new();
        let mut events = Vec::new();
        for asset_id in unique(asset_ids) {
            let outcome = match self.delete_one(actor, asset_id).await {
                Ok(Step::Done(event)) => {
                    events.push(event);
                    ItemOutcome::Applied
                }
                Ok(Step::Skip(reason)) => ItemOutcome::Skipped(reason.to_string()),
                Err(err) => {
                    warn!(asset_id = %asset_id, error = %err, "Bulk delete item failed");
                    ItemOutcome::Failed(err.message)
                }
            };
            items.insert(asset_id, outcome);
        }

        let result = BulkOperationResult::from_items(items);
        info!(
            actor_id = %actor.user_id,
            applied = result.applied,
            skipped = result.skipped,
            failed = result.failed,
            "Bulk delete finished"
        );
        self.notifier.dispatch_all(events).await;
        Ok(result)
    }

    async fn patch_one(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        patch: &AssetPatch,
    ) -> AppResult<Step> {
        let Some(snapshot) = self.snapshot(asset_id).await? else {
            return Ok(Step::Skip("not found"));
        };
        if snapshot.is_deleted() {
            return Ok(Step::Skip("asset is deleted"));
        }

        let mut tx = self.store.begin().await?;
        let result: AppResult<Vec<&'static str>> = async {
            let mut asset = lock_current(tx.as_mut(), &snapshot).await?;
            let changed = asset.apply_patch(patch);
            tx.save_asset(&asset).await?;
            let entry = CreateAuditLogEntry::new(asset_id, actor.user_id, ActionKind::Update)
                .with_location(patch.rtd_location_id)
                .at(actor.request_time);
            self.audit.record(tx.as_mut(), entry).await?;
            Ok(changed)
        }
        .await;
        let changed = settle(tx, result).await?;

        Ok(Step::Done(DomainEvent::new(
            actor.user_id,
            AssetEvent::Updated {
                asset_id,
                changed_fields: changed.iter().map(|f| f.to_string()).collect(),
            },
        )))
    }

    async fn delete_one(&self, actor: &Actor, asset_id: AssetId) -> AppResult<Step> {
        let Some(snapshot) = self.snapshot(asset_id).await? else {
            return Ok(Step::Skip("not found"));
        };
        if snapshot.is_deleted() {
            return Ok(Step::Skip("already deleted"));
        }

        let mut tx = self.store.begin().await?;
        let result = async {
            let mut asset = lock_current(tx.as_mut(), &snapshot).await?;
            let previous = asset.assigned_to;
            asset.soft_delete(actor.request_time)?;
            tx.save_asset(&asset).await?;
            let mut entry = CreateAuditLogEntry::new(asset_id, actor.user_id, ActionKind::Deleted)
                .at(actor.request_time);
            if let Some(previous) = previous {
                entry = entry.with_target(previous);
            }
            self.audit.record(tx.as_mut(), entry).await
        }
        .await;
        settle(tx, result).await?;

        Ok(Step::Done(DomainEvent::new(
            actor.user_id,
            AssetEvent::Deleted {
                asset_id,
                asset_tag: snapshot.asset_tag,
            },
        )))
    }

    async fn snapshot(&self, asset_id: AssetId) -> AppResult<Option<Asset>> {
        self.store.find_asset(asset_id).await
    }
}

impl std::fmt::Debug for BulkCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkCoordinator")
            .field("store", &self.store.backend())
            .field("notifications", &self.notifier.is_enabled())
            .finish()
    }
}

/// Input order with duplicates dropped.
fn unique(asset_ids: &[AssetId]) -> Vec<AssetId> {
    let mut seen = BTreeSet::new();
    asset_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}
