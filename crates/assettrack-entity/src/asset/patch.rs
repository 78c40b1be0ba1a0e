//! Structured field patches for single and bulk asset edits.
//!
//! Every patch field is independently present or absent. Absent fields
//! are never written. `company_id` additionally distinguishes "clear the
//! company" from "leave it alone" through [`PatchValue::Clear`].

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use assettrack_core::error::AppError;
use assettrack_core::result::AppResult;
use assettrack_core::types::id::{CompanyId, LocationId, ModelId, StatusLabelId, SupplierId};

/// Form sentinel that clears a nullable reference.
pub const CLEAR_SENTINEL: &str = "clear";

/// A present patch value: either a new value or an explicit clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchValue<T> {
    /// Set the field to null.
    Clear,
    /// Set the field to this value.
    Set(T),
}

/// The enumerated set of fields a bulk edit may write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPatch {
    /// New purchase date.
    pub purchase_date: Option<NaiveDate>,
    /// New purchase cost in cents.
    pub purchase_cost: Option<i64>,
    /// New supplier.
    pub supplier_id: Option<SupplierId>,
    /// New model.
    pub model_id: Option<ModelId>,
    /// New company, or clear.
    pub company_id: Option<PatchValue<CompanyId>>,
    /// New purchase order number.
    pub order_number: Option<String>,
    /// New warranty length.
    pub warranty_months: Option<i32>,
    /// New default location.
    pub rtd_location_id: Option<LocationId>,
    /// New status label.
    pub status_id: Option<StatusLabelId>,
    /// New requestable flag.
    pub requestable: Option<bool>,
}

impl AssetPatch {
    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }

    /// Names of the present fields, in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.purchase_date.is_some() {
            names.push("purchase_date");
        }
        if self.purchase_cost.is_some() {
            names.push("purchase_cost");
        }
        if self.supplier_id.is_some() {
            names.push("supplier_id");
        }
        if self.model_id.is_some() {
            names.push("model_id");
        }
        if self.company_id.is_some() {
            names.push("company_id");
        }
        if self.order_number.is_some() {
            names.push("order_number");
        }
        if self.warranty_months.is_some() {
            names.push("warranty_months");
        }
        if self.rtd_location_id.is_some() {
            names.push("rtd_location_id");
        }
        if self.status_id.is_some() {
            names.push("status_id");
        }
        if self.requestable.is_some() {
            names.push("requestable");
        }
        names
    }

    /// Reject values that can never be stored.
    pub fn validate(&self) -> AppResult<()> {
        if self.purchase_cost.is_some_and(|cost| cost < 0) {
            return Err(AppError::validation("Purchase cost cannot be negative"));
        }
        if self.warranty_months.is_some_and(|months| months < 0) {
            return Err(AppError::validation("Warranty months cannot be negative"));
        }
        Ok(())
    }
}

/// A single-asset edit: the bulk-patchable fields plus identity text.
///
/// Custody fields are absent; they change only through
/// checkout and checkin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEdit {
    /// Bulk-patchable fields.
    #[serde(flatten)]
    pub patch: AssetPatch,
    /// New asset tag.
    pub asset_tag: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New serial, or clear.
    pub serial: Option<PatchValue<String>>,
    /// New notes.
    pub notes: Option<String>,
}

impl AssetEdit {
    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.patch.is_empty()
            && self.asset_tag.is_none()
            && self.name.is_none()
            && self.serial.is_none()
            && self.notes.is_none()
    }

    /// Reject values that can never be stored.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(tag) = &self.asset_tag {
            if tag.trim().is_empty() {
                return Err(AppError::validation("Asset tag cannot be empty"));
            }
        }
        self.patch.validate()
    }
}

/// Untyped, form-shaped patch input.
///
/// A field counts as present only when it holds a non-blank string,
/// mirroring how the admin forms submit untouched inputs as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssetPatch {
    /// `YYYY-MM-DD`.
    pub purchase_date: Option<String>,
    /// Decimal amount, thousands separators allowed.
    pub purchase_cost: Option<String>,
    /// Supplier id.
    pub supplier_id: Option<String>,
    /// Model id.
    pub model_id: Option<String>,
    /// Company id or `"clear"`.
    pub company_id: Option<String>,
    /// Purchase order number.
    pub order_number: Option<String>,
    /// Whole months.
    pub warranty_months: Option<String>,
    /// Location id.
    pub rtd_location_id: Option<String>,
    /// Status label id.
    pub status_id: Option<String>,
    /// `1`/`0`, `true`/`false`, `yes`/`no`.
    pub requestable: Option<String>,
}

impl RawAssetPatch {
    /// Parse into a typed patch, rejecting malformed values.
    pub fn parse(&self) -> AppResult<AssetPatch> {
        Ok(AssetPatch {
            purchase_date: present(&self.purchase_date).map(parse_date).transpose()?,
            purchase_cost: present(&self.purchase_cost).map(parse_cost).transpose()?,
            supplier_id: present(&self.supplier_id)
                .map(|v| parse_id(v, "supplier_id"))
                .transpose()?,
            model_id: present(&self.model_id)
                .map(|v| parse_id(v, "model_id"))
                .transpose()?,
            company_id: present(&self.company_id)
                .map(|v| {
                    if v.eq_ignore_ascii_case(CLEAR_SENTINEL) {
                        Ok(PatchValue::Clear)
                    } else {
                        parse_id(v, "company_id").map(PatchValue::Set)
                    }
                })
                .transpose()?,
            order_number: present(&self.order_number).map(String::from),
            warranty_months: present(&self.warranty_months)
                .map(parse_months)
                .transpose()?,
            rtd_location_id: present(&self.rtd_location_id)
                .map(|v| parse_id(v, "rtd_location_id"))
                .transpose()?,
            status_id: present(&self.status_id)
                .map(|v| parse_id(v, "status_id"))
                .transpose()?,
            requestable: present(&self.requestable).map(parse_bool).transpose()?,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an id-typed field.
pub fn parse_id<T: FromStr>(value: &str, field: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid {field}: '{value}'")))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

/// Parse a non-negative decimal amount into cents.
///
/// Accepts thousands separators (`1,234.50`) and at most two decimals.
pub fn parse_cost(value: &str) -> AppResult<i64> {
    let invalid = || AppError::validation(format!("Invalid purchase cost '{value}'"));
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    let (whole, fraction) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || fraction.len() > 2
    {
        return Err(invalid());
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or_else(invalid)
}

fn parse_months(value: &str) -> AppResult<i32> {
    let months: i32 = parse_id(value, "warranty_months")?;
    if months < 0 {
        return Err(AppError::validation("Warranty months cannot be negative"));
    }
    Ok(months)
}

/// Parse a form boolean.
pub fn parse_bool(value: &str) -> AppResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::validation(format!("Invalid boolean '{value}'"))),
    }
}
