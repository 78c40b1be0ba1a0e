//! Asset audit history command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use assettrack_core::error::AppError;
use assettrack_core::types::id::AssetId;
use assettrack_core::types::pagination::PageRequest;
use assettrack_entity::audit::AuditLogEntry;

use super::AppContext;
use crate::output::{self, OutputFormat};

/// Arguments for `history`
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Asset id
    pub asset_id: AssetId,
    /// Page number
    #[arg(long, default_value = "1")]
    pub page: u64,
    /// Page size
    #[arg(long, default_value = "50")]
    pub per_page: u64,
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
pub struct AuditRow {
    /// Entry id
    id: i64,
    /// Time
    time: String,
    /// Action
    action: String,
    /// Actor id
    actor: String,
    /// Custodian involved
    target: String,
    /// Note
    note: String,
    /// Attachment
    file: String,
}

impl From<&AuditLogEntry> for AuditRow {
    fn from(e: &AuditLogEntry) -> Self {
        Self {
            id: e.id.get(),
            time: e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            action: e.action.clone(),
            actor: e.actor_id.to_string(),
            target: output::opt(e.checkedout_to),
            note: e.note.clone().unwrap_or_default(),
            file: e.filename.clone().unwrap_or_default(),
        }
    }
}

/// Execute `history`
pub async fn execute(
    args: &HistoryArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    let page = PageRequest::new(args.page, args.per_page);
    let response = ctx.audit.page_for(&ctx.actor, args.asset_id, &page).await?;
    let rows: Vec<AuditRow> = response.items.iter().map(AuditRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
