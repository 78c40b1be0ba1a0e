//! Soft delete and restore commands.

use clap::Args;

use assettrack_core::error::AppError;
use assettrack_core::types::id::AssetId;

use super::AppContext;
use crate::output;

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Asset id
    pub asset_id: AssetId,
}

/// Arguments for `restore`
#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Asset id
    pub asset_id: AssetId,
}

/// Execute `delete`
pub async fn delete(args: &DeleteArgs, ctx: &AppContext) -> Result<(), AppError> {
    ctx.lifecycle.soft_delete(&ctx.actor, args.asset_id).await?;
    output::print_success(&format!("Asset {} deleted", args.asset_id));
    Ok(())
}

/// Execute `restore`
pub async fn restore(args: &RestoreArgs, ctx: &AppContext) -> Result<(), AppError> {
    ctx.lifecycle.restore(&ctx.actor, args.asset_id).await?;
    output::print_success(&format!("Asset {} restored", args.asset_id));
    Ok(())
}
