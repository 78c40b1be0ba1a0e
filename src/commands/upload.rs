//! Asset attachment commands.

use std::path::PathBuf;

use bytes::Bytes;
use clap::{Args, Subcommand};

use assettrack_core::error::AppError;
use assettrack_core::types::id::{AssetId, AuditLogId};
use assettrack_service::UploadRequest;

use super::AppContext;
use crate::output::{self, OutputFormat};

/// Arguments for upload commands
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Upload subcommand
    #[command(subcommand)]
    pub command: UploadCommand,
}

/// Upload subcommands
#[derive(Debug, Subcommand)]
pub enum UploadCommand {
    /// Attach a local file to an asset
    Add {
        /// Asset id
        asset_id: AssetId,
        /// File to attach
        file: PathBuf,
        /// Note recorded with the upload
        #[arg(long)]
        note: Option<String>,
    },
    /// Write an attachment to disk
    Get {
        /// Asset id
        asset_id: AssetId,
        /// Audit entry id of the upload
        entry_id: AuditLogId,
        /// Destination path (default: the stored file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove an attachment
    Remove {
        /// Asset id
        asset_id: AssetId,
        /// Audit entry id of the upload
        entry_id: AuditLogId,
    },
}

/// Execute upload commands
pub async fn execute(
    args: &UploadArgs,
    ctx: &AppContext,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        UploadCommand::Add {
            asset_id,
            file,
            note,
        } => {
            let original_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let data = tokio::fs::read(file).await?;
            let request = UploadRequest {
                original_name,
                data: Bytes::from(data),
                note: note.clone(),
            };
            let entry = ctx.lifecycle.upload_file(&ctx.actor, *asset_id, request).await?;
            match format {
                OutputFormat::Table => output::print_success(&format!(
                    "Stored '{}' (log entry {})",
                    entry.filename.as_deref().unwrap_or_default(),
                    entry.id
                )),
                OutputFormat::Json => output::print_item(&entry, format),
            }
        }
        UploadCommand::Get {
            asset_id,
            entry_id,
            output: out_path,
        } => {
            let attachment = ctx
                .lifecycle
                .fetch_upload(&ctx.actor, *asset_id, *entry_id)
                .await?;
            let target = out_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(&attachment.filename));
            tokio::fs::write(&target, &attachment.data).await?;
            output::print_success(&format!(
                "Wrote {} bytes to '{}'",
                attachment.data.len(),
                target.display()
            ));
        }
        UploadCommand::Remove { asset_id, entry_id } => {
            ctx.lifecycle
                .delete_upload(&ctx.actor, *asset_id, *entry_id)
                .await?;
            output::print_success(&format!("Removed upload {entry_id} from asset {asset_id}"));
        }
    }
    Ok(())
}
