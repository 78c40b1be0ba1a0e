//! The asset state machine: checkout, checkin, delete, restore, clone,
//! edit, and file attachments.
//!
//! Each mutating operation follows the same order: read a snapshot and
//! check access, resolve referenced records, reject invalid transitions,
//! then open a transaction, re-read the asset under lock, and fail with
//! `Conflict` if its version moved since the snapshot. The record
//! mutation and its audit entry commit together; the event is
//! dispatched afterwards.

use std::sync::Arc;

use tracing::{info, warn};

use assettrack_auth::{AccessPolicy, Actor};
use assettrack_core::error::AppError;
use assettrack_core::events::{AssetEvent, DomainEvent};
use assettrack_core::result::AppResult;
use assettrack_core::traits::AttachmentStorage;
use assettrack_core::types::id::{AssetId, AuditLogId, StatusLabelId, UserId};
use assettrack_core::types::pagination::{PageRequest, PageResponse};
use assettrack_database::store::{AssetQuery, AssetStore, StoreTransaction};
use assettrack_entity::asset::{Asset, AssetEdit, AssetFilter, AssetState, NewAsset};
use assettrack_entity::audit::{ActionKind, AuditLogEntry, CreateAuditLogEntry};
use assettrack_entity::status::StatusLabel;
use assettrack_entity::user::User;

use super::naming::upload_filename;
use super::requests::{
    Attachment, CheckinOutcome, CheckinRequest, CheckoutRequest, EditOutcome, UploadRequest,
};
use crate::audit::AuditLog;
use crate::notification::NotificationDispatcher;
use crate::timestamp::normalize_event_time;
use crate::transaction::settle;

/// Single-asset lifecycle operations.
#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn AssetStore>,
    access: Arc<AccessPolicy>,
    audit: Arc<AuditLog>,
    storage: Arc<dyn AttachmentStorage>,
    notifier: Arc<NotificationDispatcher>,
}

impl LifecycleService {
    /// Creates a new lifecycle service.
    pub fn new(
        store: Arc<dyn AssetStore>,
        access: Arc<AccessPolicy>,
        audit: Arc<AuditLog>,
        storage: Arc<dyn AttachmentStorage>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            access,
            audit,
            storage,
            notifier,
        }
    }

    /// Hand custody of an asset to a user.
    pub async fn checkout(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        req: CheckoutRequest,
    ) -> AppResult<AuditLogEntry> {
        let snapshot = self.load(asset_id).await?;
        self.access.require_manage_access(actor, &snapshot)?;

        let target = self.resolve_user(req.assigned_to).await?;
        let label = self.label_of(&snapshot).await?;
        let checkout_at = normalize_event_time(req.checkout_at.as_deref(), actor.request_time);

        snapshot.clone().check_out(
            label.as_ref(),
            target.id,
            checkout_at,
            req.expected_checkin,
        )?;

        let mut tx = self.store.begin().await?;
        let result = async {
            let mut asset = lock_current(tx.as_mut(), &snapshot).await?;
            asset.check_out(label.as_ref(), target.id, checkout_at, req.expected_checkin)?;
            if let Some(name) = req.new_name() {
                asset.name = Some(name.to_string());
            }
            tx.save_asset(&asset).await?;
            let entry = CreateAuditLogEntry::new(asset.id, actor.user_id, ActionKind::Checkout)
                .with_target(target.id)
                .with_note(req.note.as_deref())
                .at(checkout_at);
            self.audit.record(tx.as_mut(), entry).await
        }
        .await;
        let entry = settle(tx, result).await?;

        info!(
            asset_id = %asset_id,
            asset_tag = %snapshot.asset_tag,
            assigned_to = %target.id,
            actor_id = %actor.user_id,
            "Asset checked out"
        );
        self.notify(
            actor,
            AssetEvent::CheckedOut {
                asset_id,
                asset_tag: snapshot.asset_tag.clone(),
                assigned_to: target.id,
                checkout_at,
                expected_checkin: req.expected_checkin,
                note: entry.note.clone(),
                log_id: entry.id,
            },
        )
        .await;
        Ok(entry)
    }

    /// End the current custody of an asset.
    pub async fn checkin(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        req: CheckinRequest,
    ) -> AppResult<CheckinOutcome> {
        let snapshot = self.load(asset_id).await?;
        self.access.require_manage_access(actor, &snapshot)?;

        if snapshot.is_deleted() {
            return Err(AppError::invalid_transition(format!(
                "Asset {} is deleted",
                snapshot.asset_tag
            )));
        }
        if let Some(status_id) = req.status_id {
            self.require_label(status_id).await?;
        }
        if !snapshot.is_assigned() {
            info!(asset_id = %asset_id, "Checkin requested for an asset nobody holds");
            return Ok(CheckinOutcome::AlreadyCheckedIn);
        }

        let checkin_at = normalize_event_time(req.checkin_at.as_deref(), actor.request_time);

        let mut tx = self.store.begin().await?;
        let result: AppResult<Option<(UserId, AuditLogEntry)>> = async {
            let mut asset = lock_current(tx.as_mut(), &snapshot).await?;
            let Some(previous) = asset.check_in(req.status_id) else {
                return Ok(None);
            };
            tx.save_asset(&asset).await?;
            let entry = CreateAuditLogEntry::new(asset.id, actor.user_id, ActionKind::CheckinFrom)
                .with_target(previous)
                .with_note(req.note.as_deref())
                .at(checkin_at);
            let entry = self.audit.record(tx.as_mut(), entry).await?;
            Ok(Some((previous, entry)))
        }
        .await;

        let Some((previous, entry)) = settle(tx, result).await? else {
            return Ok(CheckinOutcome::AlreadyCheckedIn);
        };

        info!(
            asset_id = %asset_id,
            asset_tag = %snapshot.asset_tag,
            previous_assignee = %previous,
            actor_id = %actor.user_id,
            "Asset checked in"
        );
        self.notify(
            actor,
            AssetEvent::CheckedIn {
                asset_id,
                asset_tag: snapshot.asset_tag.clone(),
                previous_assignee: previous,
                checkin_at,
                note: entry.note.clone(),
                log_id: entry.id,
            },
        )
        .await;
        Ok(CheckinOutcome::CheckedIn(entry))
    }

    /// Mark an asset deleted, ending any custody.
    pub async fn soft_delete(&self, actor: &Actor, asset_id: AssetId) -> AppResult<()> {
        let snapshot = self.load(asset_id).await?;
        self.access.require_manage_access(actor, &snapshot)?;
        if snapshot.is_deleted() {
            return Err(AppError::invalid_transition(format!(
                "Asset {} is already deleted",
                snapshot.asset_tag
            )));
        }

        self.soft_delete_loaded(actor, &snapshot).await?;
        self.notify(
            actor,
            AssetEvent::Deleted {
                asset_id,
                asset_tag: snapshot.asset_tag.clone(),
            },
        )
        .await;
        Ok(())
    }

    async fn soft_delete_loaded(
        &self,
        actor: &Actor,
        snapshot: &Asset,
    ) -> AppResult<AuditLogEntry> {
        let now = actor.request_time;
        let mut tx = self.store.begin().await?;
        let result = async {
            let mut asset = lock_current(tx.as_mut(), snapshot).await?;
            let previous = asset.assigned_to;
            asset.soft_delete(now)?;
            tx.save_asset(&asset).await?;
            let mut entry = CreateAuditLogEntry::new(asset.id, actor.user_id, ActionKind::Deleted)
                .at(now);
            if let Some(previous) = previous {
                entry = entry.with_target(previous);
            }
            self.audit.record(tx.as_mut(), entry).await
        }
        .await;
        let entry = settle(tx, result).await?;

        info!(
            asset_id = %snapshot.id,
            asset_tag = %snapshot.asset_tag,
            actor_id = %actor.user_id,
            "Asset deleted"
        );
        Ok(entry)
    }

    /// Bring a soft-deleted asset back.
    pub async fn restore(&self, actor: &Actor, asset_id: AssetId) -> AppResult<()> {
        let snapshot = self.load(asset_id).await?;
        self.access.require_manage_access(actor, &snapshot)?;
        if !snapshot.is_deleted() {
            return Err(AppError::invalid_transition(format!(
                "Asset {} is not deleted",
                snapshot.asset_tag
            )));
        }

        let now = actor.request_time;
        let mut tx = self.store.begin().await?;
        let result = async {
            let mut asset = lock_current(tx.as_mut(), &snapshot).await?;
            asset.restore()?;
            tx.save_asset(&asset).await?;
            let entry = CreateAuditLogEntry::new(asset.id, actor.user_id, ActionKind::Restored)
                .at(now);
            self.audit.record(tx.as_mut(), entry).await
        }
        .await;
        settle(tx, result).await?;

        info!(
            asset_id = %asset_id,
            asset_tag = %snapshot.asset_tag,
            actor_id = %actor.user_id,
            "Asset restored"
        );
        self.notify(
            actor,
            AssetEvent::Restored {
                asset_id,
                asset_tag: snapshot.asset_tag.clone(),
            },
        )
        .await;
        Ok(())
    }

    /// Build an unsaved copy of an asset. Nothing is written.
    pub async fn clone_asset(&self, actor: &Actor, asset_id: AssetId) -> AppResult<NewAsset> {
        let asset = self.load_visible(asset_id).await?;
        self.access.require_access(actor, &asset)?;
        Ok(asset.clone_draft())
    }

    /// Create an asset, checked out immediately when the draft names a
    /// custodian.
    pub async fn create_asset(&self, actor: &Actor, mut draft: NewAsset) -> AppResult<Asset> {
        self.access.require_manage(actor)?;
        draft.validate()?;
        draft.company_id = self.access.company_for_new_asset(actor, draft.company_id);

        let label = match draft.status_id {
            Some(status_id) => Some(self.require_label(status_id).await?),
            None => None,
        };
        if self
            .store
            .find_asset_by_tag(draft.asset_tag.trim())
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Asset tag '{}' is already in use",
                draft.asset_tag.trim()
            )));
        }
        let target = match draft.assigned_to {
            Some(user_id) => Some(self.resolve_user(user_id).await?),
            None => None,
        };

        let now = actor.request_time;
        let mut tx = self.store.begin().await?;
        let result: AppResult<(Asset, Option<AuditLogEntry>)> = async {
            let mut asset = tx.insert_asset(draft, actor.user_id, now).await?;
            let Some(target) = &target else {
                return Ok((asset, None));
            };
            asset.check_out(label.as_ref(), target.id, now, None)?;
            let asset = tx.save_asset(&asset).await?;
            let entry = CreateAuditLogEntry::new(asset.id, actor.user_id, ActionKind::Checkout)
                .with_target(target.id)
                .at(now);
            let entry = self.audit.record(tx.as_mut(), entry).await?;
            Ok((asset, Some(entry)))
        }
        .await;
        let (asset, checkout) = settle(tx, result).await?;

        info!(
            asset_id = %asset.id,
            asset_tag = %asset.asset_tag,
            actor_id = %actor.user_id,
            "Asset created"
        );
        if let (Some(entry), Some(assigned_to)) = (checkout, asset.assigned_to) {
            self.notify(
                actor,
                AssetEvent::CheckedOut {
                    asset_id: asset.id,
                    asset_tag: asset.asset_tag.clone(),
                    assigned_to,
                    checkout_at: now,
                    expected_checkin: None,
                    note: None,
                    log_id: entry.id,
                },
            )
            .await;
        }
        Ok(asset)
    }

    /// Edit fields of one asset. Custody fields are never touched.
    pub async fn edit_asset(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        edit: AssetEdit,
    ) -> AppResult<EditOutcome> {
        let snapshot = self.load(asset_id).await?;
        self.access.require_manage_access(actor, &snapshot)?;
        if snapshot.is_deleted() {
            return Err(AppError::invalid_transition(format!(
                "Asset {} is deleted",
                snapshot.asset_tag
            )));
        }
        if edit.is_empty() {
            return Ok(EditOutcome::NothingToUpdate);
        }
        edit.validate()?;

        if let Some(status_id) = edit.patch.status_id {
            self.require_label(status_id).await?;
        }
        if let Some(tag) = &edit.asset_tag {
            let clash = self.store.find_asset_by_tag(tag.trim()).await?;
            if clash.is_some_and(|other| other.id != asset_id) {
                return Err(AppError::conflict(format!(
                    "Asset tag '{}' is already in use",
                    tag.trim()
                )));
            }
        }

        let now = actor.request_time;
        let mut tx = self.store.begin().await?;
        let result: AppResult<(Asset, AuditLogEntry, Vec<&'static str>)> = async {
            let mut asset = lock_current(tx.as_mut(), &snapshot).await?;
            let changed = asset.apply_edit(&edit);
            let asset = tx.save_asset(&asset).await?;
            let entry = CreateAuditLogEntry::new(asset.id, actor.user_id, ActionKind::Update)
                .with_location(edit.patch.rtd_location_id)
                .at(now);
            let entry = self.audit.record(tx.as_mut(), entry).await?;
            Ok((asset, entry, changed))
        }
        .await;
        let (asset, entry, changed) = settle(tx, result).await?;

        info!(
            asset_id = %asset_id,
            fields = ?changed,
            actor_id = %actor.user_id,
            "Asset updated"
        );
        self.notify(
            actor,
            AssetEvent::Updated {
                asset_id,
                changed_fields: changed.iter().map(|f| f.to_string()).collect(),
            },
        )
        .await;
        Ok(EditOutcome::Updated { asset, entry })
    }

    /// Read one asset.
    pub async fn get_asset(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        include_deleted: bool,
    ) -> AppResult<Asset> {
        let asset = if include_deleted {
            self.load(asset_id).await?
        } else {
            self.load_visible(asset_id).await?
        };
        self.access.require_access(actor, &asset)?;
        Ok(asset)
    }

    /// Derived state of an asset, with its label read fresh.
    pub async fn state_of(&self, asset: &Asset) -> AppResult<AssetState> {
        let label = self.label_of(asset).await?;
        Ok(asset.state(label.as_ref()))
    }

    /// List assets visible to the actor.
    pub async fn list_assets(
        &self,
        actor: &Actor,
        filter: AssetFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>> {
        let query = AssetQuery {
            company_id: self.access.listing_scope(actor),
            filter,
        };
        self.store.list_assets(&query, page).await
    }

    /// Attach a file to an asset.
    pub async fn upload_file(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        req: UploadRequest,
    ) -> AppResult<AuditLogEntry> {
        let asset = self.load_visible(asset_id).await?;
        self.access.require_manage_access(actor, &asset)?;
        if req.original_name.trim().is_empty() {
            return Err(AppError::validation("Uploaded file has no name"));
        }

        let filename = upload_filename(asset_id, &req.original_name);
        self.storage.store(&filename, req.data).await?;

        let now = actor.request_time;
        let mut tx = self.store.begin().await?;
        let entry = CreateAuditLogEntry::new(asset_id, actor.user_id, ActionKind::Uploaded)
            .with_filename(filename.clone())
            .with_note(req.note.as_deref())
            .at(now);
        let result = self.audit.record(tx.as_mut(), entry).await;
        let entry = match settle(tx, result).await {
            Ok(entry) => entry,
            Err(err) => {
                if let Err(cleanup) = self.storage.remove(&filename).await {
                    warn!(filename = %filename, error = %cleanup, "Orphaned upload left behind");
                }
                return Err(err);
            }
        };

        info!(
            asset_id = %asset_id,
            filename = %filename,
            actor_id = %actor.user_id,
            "File uploaded"
        );
        self.notify(actor, AssetEvent::FileUploaded { asset_id, filename })
            .await;
        Ok(entry)
    }

    /// Read back an uploaded file.
    pub async fn fetch_upload(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        entry_id: AuditLogId,
    ) -> AppResult<Attachment> {
        let asset = self.load(asset_id).await?;
        self.access.require_access(actor, &asset)?;
        let filename = self.upload_entry(asset_id, entry_id).await?;
        let data = self.storage.retrieve(&filename).await?;
        Ok(Attachment { filename, data })
    }

    /// Hide an upload's audit entry, then remove the stored file.
    pub async fn delete_upload(
        &self,
        actor: &Actor,
        asset_id: AssetId,
        entry_id: AuditLogId,
    ) -> AppResult<()> {
        let asset = self.load(asset_id).await?;
        self.access.require_manage_access(actor, &asset)?;
        let filename = self.upload_entry(asset_id, entry_id).await?;

        let mut tx = self.store.begin().await?;
        let result = tx.soft_delete_audit(entry_id, actor.request_time).await;
        settle(tx, result).await?;

        if let Err(err) = self.storage.remove(&filename).await {
            warn!(filename = %filename, error = %err, "Upload file left behind after delete");
        }

        info!(
            asset_id = %asset_id,
            filename = %filename,
            actor_id = %actor.user_id,
            "Upload deleted"
        );
        Ok(())
    }

    /// Load an asset, soft-deleted included.
    async fn load(&self, asset_id: AssetId) -> AppResult<Asset> {
        self.store
            .find_asset(asset_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {asset_id} not found")))
    }

    async fn load_visible(&self, asset_id: AssetId) -> AppResult<Asset> {
        let asset = self.load(asset_id).await?;
        if asset.is_deleted() {
            return Err(AppError::not_found(format!("Asset {asset_id} is deleted")));
        }
        Ok(asset)
    }

    async fn resolve_user(&self, user_id: UserId) -> AppResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn label_of(&self, asset: &Asset) -> AppResult<Option<StatusLabel>> {
        match asset.status_id {
            Some(status_id) => self.store.find_status_label(status_id).await,
            None => Ok(None),
        }
    }

    async fn require_label(&self, status_id: StatusLabelId) -> AppResult<StatusLabel> {
        self.store
            .find_status_label(status_id)
            .await?
            .ok_or_else(|| AppError::validation(format!("Unknown status label {status_id}")))
    }

    /// The stored file name of a visible `uploaded` entry of this asset.
    async fn upload_entry(&self, asset_id: AssetId, entry_id: AuditLogId) -> AppResult<String> {
        self.store
            .find_audit_entry(entry_id)
            .await?
            .filter(|e| {
                e.asset_id == asset_id
                    && e.is_visible()
                    && e.action_kind() == Some(ActionKind::Uploaded)
            })
            .and_then(|e| e.filename)
            .ok_or_else(|| {
                AppError::not_found(format!("Upload {entry_id} not found for asset {asset_id}"))
            })
    }

    async fn notify(&self, actor: &Actor, payload: AssetEvent) {
        self.notifier
            .dispatch(DomainEvent::new(actor.user_id, payload))
            .await;
    }
}

impl std::fmt::Debug for LifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleService")
            .field("store", &self.store.backend())
            .field("storage", &self.storage.provider_type())
            .finish()
    }
}

/// Re-read `snapshot` under lock and make sure nobody wrote it since.
pub(crate) async fn lock_current(
    tx: &mut dyn StoreTransaction,
    snapshot: &Asset,
) -> AppResult<Asset> {
    let current = tx
        .lock_asset(snapshot.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Asset {} not found", snapshot.id)))?;
    if current.version != snapshot.version {
        return Err(AppError::conflict(format!(
            "Asset {} was modified by another request",
            snapshot.asset_tag
        )));
    }
    Ok(current)
}
