//! Audit log repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use assettrack_core::error::AppError;
use assettrack_core::result::AppResult;
use assettrack_core::types::id::{AssetId, AuditLogId};
use assettrack_core::types::pagination::{PageRequest, PageResponse};
use assettrack_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use super::db_error;

/// Repository for `asset_logs` rows.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an entry by id.
    pub async fn find_by_id(&self, id: AuditLogId) -> AppResult<Option<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>("SELECT * FROM asset_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find audit entry"))
    }

    /// Visible entries for an asset, newest first.
    pub async fn find_by_asset(&self, asset_id: AssetId) -> AppResult<Vec<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM asset_logs WHERE asset_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list audit entries"))
    }

    /// One page of visible entries for an asset, newest first.
    pub async fn page_by_asset(
        &self,
        asset_id: AssetId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM asset_logs WHERE asset_id = $1 AND deleted_at IS NULL",
        )
        .bind(asset_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count audit entries"))?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM asset_logs WHERE asset_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(asset_id)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list audit entries"))?;

        Ok(PageResponse::new(
            entries,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Append an entry.
    pub async fn insert(
        conn: &mut PgConnection,
        entry: &CreateAuditLogEntry,
    ) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO asset_logs (asset_id, actor_id, checkedout_to, action, note, filename, \
             location_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW())) RETURNING *",
        )
        .bind(entry.asset_id)
        .bind(entry.actor_id)
        .bind(entry.checkedout_to)
        .bind(entry.action.as_str())
        .bind(&entry.note)
        .bind(&entry.filename)
        .bind(entry.location_id)
        .bind(entry.created_at)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to insert audit entry"))
    }

    /// Soft-delete an entry.
    pub async fn soft_delete(
        conn: &mut PgConnection,
        id: AuditLogId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE asset_logs SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(conn)
        .await
        .map_err(db_error("Failed to delete audit entry"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Audit entry {id} not found")));
        }
        Ok(())
    }
}
