//! Asset read commands: show, list, clone.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use assettrack_core::error::AppError;
use assettrack_core::types::id::AssetId;
use assettrack_core::types::pagination::PageRequest;
use assettrack_entity::asset::{Asset, AssetFilter};

use super::AppContext;
use crate::output::{self, OutputFormat};

/// Arguments for `show`
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Asset id
    pub asset_id: AssetId,
    /// Include soft-deleted assets
    #[arg(long)]
    pub deleted: bool,
}

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// all, rtd, pending, undeployable, archived, requestable, deployed, deleted
    #[arg(long, default_value = "all")]
    pub filter: AssetFilter,
    /// Page number
    #[arg(long, default_value = "1")]
    pub page: u64,
    /// Page size
    #[arg(long, default_value = "50")]
    pub per_page: u64,
}

/// Arguments for `clone`
#[derive(Debug, Args)]
pub struct CloneArgs {
    /// Asset to copy
    pub asset_id: AssetId,
}

/// Asset display row
#[derive(Debug, Serialize, Tabled)]
pub struct AssetRow {
    /// Id
    id: i64,
    /// Tag
    tag: String,
    /// Name
    name: String,
    /// Derived state
    state: String,
    /// Current custodian
    assigned_to: String,
    /// Company
    company: String,
    /// Version
    version: i64,
}

impl AssetRow {
    async fn build(ctx: &AppContext, asset: &Asset) -> Result<Self, AppError> {
        let state = ctx.lifecycle.state_of(asset).await?;
        Ok(Self {
            id: asset.id.get(),
            tag: asset.asset_tag.clone(),
            name: asset.display_name().to_string(),
            state: state.to_string(),
            assigned_to: output::opt(asset.assigned_to),
            company: output::opt(asset.company_id),
            version: asset.version,
        })
    }
}

/// Execute `show`
pub async fn show(args: &ShowArgs, ctx: &AppContext, format: OutputFormat) -> Result<(), AppError> {
    let asset = ctx
        .lifecycle
        .get_asset(&ctx.actor, args.asset_id, args.deleted)
        .await?;
    if format == OutputFormat::Table {
        let state = ctx.lifecycle.state_of(&asset).await?;
        output::print_kv("state", state.as_str());
    }
    output::print_item(&asset, format);
    Ok(())
}

/// Execute `list`
pub async fn list(args: &ListArgs, ctx: &AppContext, format: OutputFormat) -> Result<(), AppError> {
    let page = PageRequest::new(args.page, args.per_page);
    let response = ctx
        .lifecycle
        .list_assets(&ctx.actor, args.filter, &page)
        .await?;

    let mut rows = Vec::with_capacity(response.items.len());
    for asset in &response.items {
        rows.push(AssetRow::build(ctx, asset).await?);
    }
    output::print_list(&rows, format);
    if format == OutputFormat::Table && response.total_pages > 1 {
        println!(
            "Page {} of {} ({} assets)",
            response.page, response.total_pages, response.total_items
        );
    }
    Ok(())
}

/// Execute `clone`
pub async fn clone(args: &CloneArgs, ctx: &AppContext, format: OutputFormat) -> Result<(), AppError> {
    let draft = ctx.lifecycle.clone_asset(&ctx.actor, args.asset_id).await?;
    output::print_item(&draft, format);
    Ok(())
}
