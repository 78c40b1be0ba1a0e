//! Checkout and checkin commands.

use chrono::{NaiveTime, TimeZone, Utc};
use clap::Args;

use assettrack_core::error::AppError;
use assettrack_core::types::id::{AssetId, StatusLabelId, UserId};
use assettrack_entity::asset::patch::parse_date;
use assettrack_service::{CheckinOutcome, CheckinRequest, CheckoutRequest};

use super::AppContext;
use crate::output::{self, OutputFormat};

/// Arguments for `checkout`
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Asset id
    pub asset_id: AssetId,
    /// User receiving the asset
    #[arg(long)]
    pub to: UserId,
    /// When the checkout happened, e.g. "2024-01-10 09:30:00" (default: now)
    #[arg(long)]
    pub at: Option<String>,
    /// Expected return date, YYYY-MM-DD
    #[arg(long)]
    pub expected: Option<String>,
    /// Note recorded with the checkout
    #[arg(long)]
    pub note: Option<String>,
    /// Rename the asset as it is handed over
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for `checkin`
#[derive(Debug, Args)]
pub struct CheckinArgs {
    /// Asset id
    pub asset_id: AssetId,
    /// When the checkin happened (default: now)
    #[arg(long)]
    pub at: Option<String>,
    /// Status label to set on return
    #[arg(long)]
    pub status: Option<StatusLabelId>,
    /// Note recorded with the checkin
    #[arg(long)]
    pub note: Option<String>,
}

/// Execute `checkout`
pub async fn checkout(
    args: &CheckoutArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let expected_checkin = args
        .expected
        .as_deref()
        .map(parse_date)
        .transpose()?
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));

    let request = CheckoutRequest {
        assigned_to: args.to,
        checkout_at: args.at.clone(),
        expected_checkin,
        note: args.note.clone(),
        name: args.name.clone(),
    };
    let entry = ctx
        .lifecycle
        .checkout(&ctx.actor, args.asset_id, request)
        .await?;

    match format {
        OutputFormat::Table => output::print_success(&format!(
            "Asset {} checked out to user {} (log entry {})",
            args.asset_id, args.to, entry.id
        )),
        OutputFormat::Json => output::print_item(&entry, format),
    }
    Ok(())
}

/// Execute `checkin`
pub async fn checkin(
    args: &CheckinArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let request = CheckinRequest {
        checkin_at: args.at.clone(),
        status_id: args.status,
        note: args.note.clone(),
    };
    let outcome = ctx
        .lifecycle
        .checkin(&ctx.actor, args.asset_id, request)
        .await?;

    match (outcome, format) {
        (CheckinOutcome::AlreadyCheckedIn, _) => {
            output::print_warning(&format!("Asset {} is already checked in", args.asset_id));
        }
        (CheckinOutcome::CheckedIn(entry), OutputFormat::Table) => {
            output::print_success(&format!(
                "Asset {} checked in from user {} (log entry {})",
                args.asset_id,
                output::opt(entry.checkedout_to),
                entry.id
            ));
        }
        (CheckinOutcome::CheckedIn(entry), OutputFormat::Json) => {
            output::print_item(&entry, OutputFormat::Json);
        }
    }
    Ok(())
}
