//! Bulk delete and bulk patch commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use assettrack_core::error::AppError;
use assettrack_core::types::id::AssetId;
use assettrack_entity::asset::RawAssetPatch;
use assettrack_service::{BulkOperationResult, BulkStatus};

use super::AppContext;
use crate::output::{self, OutputFormat};

/// Arguments for `bulk-delete`
#[derive(Debug, Args)]
pub struct BulkDeleteArgs {
    /// Asset ids
    #[arg(required = true, num_args = 1..)]
    pub asset_ids: Vec<AssetId>,
}

/// Arguments for `bulk-patch`. Omitted fields are left untouched.
#[derive(Debug, Args)]
pub struct BulkPatchArgs {
    /// Asset ids
    #[arg(required = true, num_args = 1..)]
    pub asset_ids: Vec<AssetId>,
    /// Purchase date, YYYY-MM-DD
    #[arg(long)]
    pub purchase_date: Option<String>,
    /// Purchase cost, e.g. 1,299.00
    #[arg(long)]
    pub purchase_cost: Option<String>,
    /// Supplier id
    #[arg(long)]
    pub supplier: Option<String>,
    /// Model id
    #[arg(long)]
    pub model: Option<String>,
    /// Company id, or "clear" to remove the company
    #[arg(long)]
    pub company: Option<String>,
    /// Purchase order number
    #[arg(long)]
    pub order_number: Option<String>,
    /// Warranty length in months
    #[arg(long)]
    pub warranty_months: Option<String>,
    /// Default location id
    #[arg(long)]
    pub location: Option<String>,
    /// Status label id
    #[arg(long)]
    pub status: Option<String>,
    /// Requestable flag (yes/no)
    #[arg(long)]
    pub requestable: Option<String>,
}

impl BulkPatchArgs {
    fn raw_patch(&self) -> RawAssetPatch {
        RawAssetPatch {
            purchase_date: self.purchase_date.clone(),
            purchase_cost: self.purchase_cost.clone(),
            supplier_id: self.supplier.clone(),
            model_id: self.model.clone(),
            company_id: self.company.clone(),
            order_number: self.order_number.clone(),
            warranty_months: self.warranty_months.clone(),
            rtd_location_id: self.location.clone(),
            status_id: self.status.clone(),
            requestable: self.requestable.clone(),
        }
    }
}

/// Per-asset display row
#[derive(Debug, Serialize, Tabled)]
struct OutcomeRow {
    /// Asset id
    asset: i64,
    /// applied / skipped / failed
    outcome: String,
    /// Reason
    reason: String,
}

/// Execute `bulk-delete`
pub async fn delete(
    args: &BulkDeleteArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let result = ctx.bulk.apply_bulk_delete(&ctx.actor, &args.asset_ids).await?;
    report(&result, format);
    Ok(())
}

/// Execute `bulk-patch`
pub async fn patch(
    args: &BulkPatchArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let patch = args.raw_patch().parse()?;
    let result = ctx
        .bulk
        .apply_field_patch(&ctx.actor, &args.asset_ids, &patch)
        .await?;
    report(&result, format);
    Ok(())
}

fn report(result: &BulkOperationResult, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_item(result, format);
        return;
    }

    let rows: Vec<OutcomeRow> = result
        .items
        .iter()
        .map(|(id, outcome)| OutcomeRow {
            asset: id.get(),
            outcome: outcome.label().to_string(),
            reason: outcome.reason().to_string(),
        })
        .collect();

    match result.status {
        BulkStatus::NothingToUpdate => output::print_warning("Nothing to update."),
        BulkStatus::Completed => {
            output::print_list(&rows, format);
            output::print_success(&format!(
                "{} applied, {} skipped",
                result.applied, result.skipped
            ));
        }
        BulkStatus::PartialFailure => {
            output::print_list(&rows, format);
            output::print_error(&format!(
                "{} applied, {} skipped, {} failed",
                result.applied, result.skipped, result.failed
            ));
        }
    }
}
