//! Asset entity model and its field-level mutation rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assettrack_core::error::AppError;
use assettrack_core::result::AppResult;
use assettrack_core::types::id::{
    AssetId, CompanyId, LocationId, ModelId, StatusLabelId, SupplierId, UserId,
};

use super::patch::{AssetEdit, AssetPatch, PatchValue};
use super::state::AssetState;
use crate::status::StatusLabel;

/// A tracked physical asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Unique asset identifier.
    pub id: AssetId,
    /// Human asset tag, unique across the inventory.
    pub asset_tag: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Manufacturer serial number.
    pub serial: Option<String>,
    /// Asset model.
    pub model_id: Option<ModelId>,
    /// Status label driving availability.
    pub status_id: Option<StatusLabelId>,
    /// Owning company (tenant scope).
    pub company_id: Option<CompanyId>,
    /// Default location while not assigned to a user.
    pub rtd_location_id: Option<LocationId>,
    /// Supplier the asset was bought from.
    pub supplier_id: Option<SupplierId>,
    /// Purchase order number.
    pub order_number: Option<String>,
    /// Purchase date.
    pub purchase_date: Option<NaiveDate>,
    /// Purchase cost in minor currency units (cents).
    pub purchase_cost: Option<i64>,
    /// Warranty length in months.
    pub warranty_months: Option<i32>,
    /// Whether users may request this asset.
    pub requestable: bool,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Current custodian; set iff the asset is checked out.
    pub assigned_to: Option<UserId>,
    /// When the current checkout started.
    pub last_checkout: Option<DateTime<Utc>>,
    /// When the current custodian is expected to return the asset.
    pub expected_checkin: Option<DateTime<Utc>>,
    /// Custodian acknowledgment of the checkout.
    pub accepted: Option<bool>,
    /// Whether the asset itself is archived.
    pub archived: bool,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// The user who created the record.
    pub created_by: Option<UserId>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every write.
    pub version: i64,
}

impl Asset {
    /// Whether the asset is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the asset is currently checked out.
    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// Derived lifecycle state given the asset's status label.
    pub fn state(&self, label: Option<&StatusLabel>) -> AssetState {
        AssetState::classify(self, label)
    }

    /// Display name: the name if set, otherwise the asset tag.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.asset_tag)
    }

    /// Hand custody to `user`.
    ///
    /// Fails with `InvalidTransition` unless the asset is ready to deploy.
    pub fn check_out(
        &mut self,
        label: Option<&StatusLabel>,
        user: UserId,
        checkout_at: DateTime<Utc>,
        expected_checkin: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        match self.state(label) {
            AssetState::ReadyToDeploy => {}
            AssetState::Deployed => {
                return Err(AppError::invalid_transition(format!(
                    "Asset {} is already checked out",
                    self.asset_tag
                )));
            }
            other => {
                return Err(AppError::invalid_transition(format!(
                    "Asset {} cannot be checked out while {other}",
                    self.asset_tag
                )));
            }
        }

        self.assigned_to = Some(user);
        self.last_checkout = Some(checkout_at);
        self.expected_checkin = expected_checkin;
        self.accepted = None;
        Ok(())
    }

    /// End custody and return the previous custodian.
    ///
    /// Returns `None` and leaves the record untouched when nobody holds
    /// the asset.
    pub fn check_in(&mut self, new_status: Option<StatusLabelId>) -> Option<UserId> {
        let previous = self.assigned_to.take()?;
        self.accepted = None;
        self.expected_checkin = None;
        self.last_checkout = None;
        if let Some(status_id) = new_status {
            self.status_id = Some(status_id);
        }
        Some(previous)
    }

    /// Mark the asset deleted, clearing custody first.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_deleted() {
            return Err(AppError::invalid_transition(format!(
                "Asset {} is already deleted",
                self.asset_tag
            )));
        }
        self.assigned_to = None;
        self.last_checkout = None;
        self.expected_checkin = None;
        self.accepted = None;
        self.deleted_at = Some(now);
        Ok(())
    }

    /// Bring a soft-deleted asset back.
    pub fn restore(&mut self) -> AppResult<()> {
        if !self.is_deleted() {
            return Err(AppError::invalid_transition(format!(
                "Asset {} is not deleted",
                self.asset_tag
            )));
        }
        self.deleted_at = None;
        Ok(())
    }

    /// Write every field present in `patch`; return the names written.
    pub fn apply_patch(&mut self, patch: &AssetPatch) -> Vec<&'static str> {
        let mut changed = Vec::new();

        if let Some(date) = patch.purchase_date {
            self.purchase_date = Some(date);
            changed.push("purchase_date");
        }
        if let Some(cost) = patch.purchase_cost {
            self.purchase_cost = Some(cost);
            changed.push("purchase_cost");
        }
        if let Some(supplier) = patch.supplier_id {
            self.supplier_id = Some(supplier);
            changed.push("supplier_id");
        }
        if let Some(model) = patch.model_id {
            self.model_id = Some(model);
            changed.push("model_id");
        }
        if let Some(company) = &patch.company_id {
            self.company_id = match company {
                PatchValue::Clear => None,
                PatchValue::Set(id) => Some(*id),
            };
            changed.push("company_id");
        }
        if let Some(order) = &patch.order_number {
            self.order_number = Some(order.clone());
            changed.push("order_number");
        }
        if let Some(months) = patch.warranty_months {
            self.warranty_months = Some(months);
            changed.push("warranty_months");
        }
        if let Some(location) = patch.rtd_location_id {
            self.rtd_location_id = Some(location);
            changed.push("rtd_location_id");
        }
        if let Some(status) = patch.status_id {
            self.status_id = Some(status);
            changed.push("status_id");
        }
        if let Some(requestable) = patch.requestable {
            self.requestable = requestable;
            changed.push("requestable");
        }

        changed
    }

    /// Apply a single-asset edit (patchable fields plus identity text).
    pub fn apply_edit(&mut self, edit: &AssetEdit) -> Vec<&'static str> {
        let mut changed = self.apply_patch(&edit.patch);

        if let Some(tag) = &edit.asset_tag {
            self.asset_tag = tag.clone();
            changed.push("asset_tag");
        }
        if let Some(name) = &edit.name {
            self.name = Some(name.clone());
            changed.push("name");
        }
        if let Some(serial) = &edit.serial {
            self.serial = match serial {
                PatchValue::Clear => None,
                PatchValue::Set(s) => Some(s.clone()),
            };
            changed.push("serial");
        }
        if let Some(notes) = &edit.notes {
            self.notes = Some(notes.clone());
            changed.push("notes");
        }

        changed
    }

    /// Build a creation draft copying this asset.
    ///
    /// Identity, tag, serial and every custody field are reset so the copy
    /// starts out available.
    pub fn clone_draft(&self) -> NewAsset {
        NewAsset {
            asset_tag: String::new(),
            name: self.name.clone(),
            serial: None,
            model_id: self.model_id,
            status_id: self.status_id,
            company_id: self.company_id,
            rtd_location_id: self.rtd_location_id,
            supplier_id: self.supplier_id,
            order_number: self.order_number.clone(),
            purchase_date: self.purchase_date,
            purchase_cost: self.purchase_cost,
            warranty_months: self.warranty_months,
            requestable: self.requestable,
            notes: self.notes.clone(),
            archived: self.archived,
            assigned_to: None,
        }
    }
}

/// Data required to create a new asset record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAsset {
    /// Asset tag; must be non-empty and unique.
    pub asset_tag: String,
    /// Display name.
    pub name: Option<String>,
    /// Serial number.
    pub serial: Option<String>,
    /// Model.
    pub model_id: Option<ModelId>,
    /// Status label.
    pub status_id: Option<StatusLabelId>,
    /// Owning company.
    pub company_id: Option<CompanyId>,
    /// Default location.
    pub rtd_location_id: Option<LocationId>,
    /// Supplier.
    pub supplier_id: Option<SupplierId>,
    /// Purchase order number.
    pub order_number: Option<String>,
    /// Purchase date.
    pub purchase_date: Option<NaiveDate>,
    /// Purchase cost in cents.
    pub purchase_cost: Option<i64>,
    /// Warranty length in months.
    pub warranty_months: Option<i32>,
    /// Requestable flag.
    #[serde(default)]
    pub requestable: bool,
    /// Notes.
    pub notes: Option<String>,
    /// Archived flag.
    #[serde(default)]
    pub archived: bool,
    /// Create the asset already checked out to this user.
    pub assigned_to: Option<UserId>,
}

impl NewAsset {
    /// Check the draft before it is persisted.
    pub fn validate(&self) -> AppResult<()> {
        if self.asset_tag.trim().is_empty() {
            return Err(AppError::validation("Asset tag is required"));
        }
        if self.purchase_cost.is_some_and(|c| c < 0) {
            return Err(AppError::validation("Purchase cost cannot be negative"));
        }
        if self.warranty_months.is_some_and(|m| m < 0) {
            return Err(AppError::validation("Warranty months cannot be negative"));
        }
        Ok(())
    }

    /// Materialize a record with the given id and creation time.
    ///
    /// Custody fields are left empty; a draft carrying `assigned_to` is
    /// checked out by the lifecycle service after insertion rules run.
    pub fn into_asset(self, id: AssetId, created_by: UserId, now: DateTime<Utc>) -> Asset {
        Asset {
            id,
            asset_tag: self.asset_tag.trim().to_string(),
            name: self.name,
            serial: self.serial,
            model_id: self.model_id,
            status_id: self.status_id,
            company_id: self.company_id,
            rtd_location_id: self.rtd_location_id,
            supplier_id: self.supplier_id,
            order_number: self.order_number,
            purchase_date: self.purchase_date,
            purchase_cost: self.purchase_cost,
            warranty_months: self.warranty_months,
            requestable: self.requestable,
            notes: self.notes,
            assigned_to: None,
            last_checkout: None,
            expected_checkin: None,
            accepted: None,
            archived: self.archived,
            deleted_at: None,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}
