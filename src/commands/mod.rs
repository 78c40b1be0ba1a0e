//! CLI command definitions and dispatch.

pub mod asset;
pub mod bulk;
pub mod custody;
pub mod history;
pub mod migrate;
pub mod records;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use assettrack_auth::{AccessPolicy, Actor};
use assettrack_core::config::{AppConfig, StoreBackend};
use assettrack_core::error::AppError;
use assettrack_core::traits::AttachmentStorage;
use assettrack_core::types::id::UserId;
use assettrack_database::{DatabasePool, MemoryStore, PgAssetStore};
use assettrack_database::store::AssetStore;
use assettrack_entity::user::User;
use assettrack_service::{
    AuditLog, BulkCoordinator, LifecycleService, LogNotificationSink, NotificationDispatcher,
};
use assettrack_storage::LocalAttachmentStorage;

use crate::output::OutputFormat;
use crate::seed;

/// AssetTrack: hardware asset lifecycle and audit engine
#[derive(Debug, Parser)]
#[command(name = "assettrack", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Use a seeded in-memory store instead of PostgreSQL
    #[arg(long)]
    pub memory: bool,

    /// Id of the user performing the command
    #[arg(long, default_value = "1", global = true)]
    pub actor: i64,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Show one asset
    Show(asset::ShowArgs),
    /// List assets
    List(asset::ListArgs),
    /// Print an unsaved copy of an asset
    Clone(asset::CloneArgs),
    /// Audit history of an asset
    History(history::HistoryArgs),
    /// Check an asset out to a user
    Checkout(custody::CheckoutArgs),
    /// Check an asset back in
    Checkin(custody::CheckinArgs),
    /// Soft-delete an asset
    Delete(records::DeleteArgs),
    /// Restore a soft-deleted asset
    Restore(records::RestoreArgs),
    /// Soft-delete many assets
    BulkDelete(bulk::BulkDeleteArgs),
    /// Patch fields on many assets
    BulkPatch(bulk::BulkPatchArgs),
    /// Asset file attachments
    Upload(upload::UploadArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        if let Commands::Migrate(args) = &self.command {
            return migrate::execute(args, config).await;
        }

        let ctx = AppContext::build(config, self.memory, UserId(self.actor)).await?;
        match &self.command {
            Commands::Migrate(_) => Ok(()),
            Commands::Show(args) => asset::show(args, &ctx, self.format).await,
            Commands::List(args) => asset::list(args, &ctx, self.format).await,
            Commands::Clone(args) => asset::clone(args, &ctx, self.format).await,
            Commands::History(args) => history::execute(args, &ctx, self.format).await,
            Commands::Checkout(args) => custody::checkout(args, &ctx, self.format).await,
            Commands::Checkin(args) => custody::checkin(args, &ctx, self.format).await,
            Commands::Delete(args) => records::delete(args, &ctx).await,
            Commands::Restore(args) => records::restore(args, &ctx).await,
            Commands::BulkDelete(args) => bulk::delete(args, &ctx, self.format).await,
            Commands::BulkPatch(args) => bulk::patch(args, &ctx, self.format).await,
            Commands::Upload(args) => upload::execute(args, &ctx, self.format).await,
        }
    }
}

/// Services wired for one command invocation.
pub struct AppContext {
    pub lifecycle: LifecycleService,
    pub bulk: BulkCoordinator,
    pub audit: Arc<AuditLog>,
    pub actor: Actor,
}

impl AppContext {
    /// Wire the store, policy and services, then resolve the acting user.
    pub async fn build(
        config: &AppConfig,
        memory: bool,
        actor_id: UserId,
    ) -> Result<Self, AppError> {
        let store: Arc<dyn AssetStore> = if memory || config.store.backend == StoreBackend::Memory
        {
            let store = MemoryStore::new();
            seed::populate(&store).await;
            tracing::info!("Using seeded in-memory store");
            Arc::new(store)
        } else {
            let pool = create_db_pool(config).await?;
            Arc::new(PgAssetStore::new(pool.pool().clone()))
        };

        let access = Arc::new(AccessPolicy::new(&config.access));
        let audit = Arc::new(AuditLog::new(store.clone(), access.clone()));
        let storage: Arc<dyn AttachmentStorage> =
            Arc::new(LocalAttachmentStorage::new(&config.storage.uploads_dir).await?);
        let notifier = Arc::new(NotificationDispatcher::from_config(
            &config.notifications,
            Arc::new(LogNotificationSink::new()),
        ));

        let lifecycle = LifecycleService::new(
            store.clone(),
            access.clone(),
            audit.clone(),
            storage,
            notifier.clone(),
        );
        let bulk = BulkCoordinator::new(store.clone(), access, audit.clone(), notifier);

        let user = store
            .find_user(actor_id)
            .await?
            .filter(User::is_active)
            .ok_or_else(|| AppError::not_found(format!("Acting user {actor_id} not found")))?;

        Ok(Self {
            lifecycle,
            bulk,
            audit,
            actor: Actor::from_user(&user),
        })
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}
