//! Asset repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use assettrack_core::result::AppResult;
use assettrack_core::types::id::{AssetId, UserId};
use assettrack_core::types::pagination::{PageRequest, PageResponse};
use assettrack_entity::asset::{Asset, AssetFilter, NewAsset};

use super::db_error;
use crate::store::AssetQuery;

/// Predicate on `assets a LEFT JOIN status_labels s` for each filter.
fn filter_clause(filter: AssetFilter) -> &'static str {
    match filter {
        AssetFilter::All => "a.deleted_at IS NULL",
        AssetFilter::Deleted => "a.deleted_at IS NOT NULL",
        AssetFilter::Deployed => "a.deleted_at IS NULL AND a.assigned_to IS NOT NULL",
        AssetFilter::Archived => {
            "a.deleted_at IS NULL AND a.assigned_to IS NULL \
             AND (a.archived OR COALESCE(s.archived, FALSE))"
        }
        AssetFilter::ReadyToDeploy => {
            "a.deleted_at IS NULL AND a.assigned_to IS NULL \
             AND NOT a.archived AND NOT COALESCE(s.archived, FALSE) \
             AND COALESCE(s.deployable, FALSE)"
        }
        AssetFilter::Pending => {
            "a.deleted_at IS NULL AND a.assigned_to IS NULL \
             AND NOT a.archived AND NOT COALESCE(s.archived, FALSE) \
             AND NOT COALESCE(s.deployable, FALSE) AND COALESCE(s.pending, FALSE)"
        }
        AssetFilter::Undeployable => {
            "a.deleted_at IS NULL AND a.assigned_to IS NULL \
             AND NOT a.archived AND NOT COALESCE(s.archived, FALSE) \
             AND NOT COALESCE(s.deployable, FALSE) AND NOT COALESCE(s.pending, FALSE)"
        }
        AssetFilter::Requestable => {
            "a.requestable AND a.deleted_at IS NULL AND a.assigned_to IS NULL \
             AND NOT a.archived AND NOT COALESCE(s.archived, FALSE)"
        }
    }
}

/// Repository for asset rows.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    /// Create a new asset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an asset by id.
    pub async fn find_by_id(&self, id: AssetId) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find asset"))
    }

    /// Find an asset by tag.
    pub async fn find_by_tag(&self, asset_tag: &str) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE asset_tag = $1")
            .bind(asset_tag)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find asset by tag"))
    }

    /// List assets matching a query.
    pub async fn list(
        &self,
        query: &AssetQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Asset>> {
        let predicate = filter_clause(query.filter);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM assets a LEFT JOIN status_labels s ON s.id = a.status_id \
             WHERE ($1::BIGINT IS NULL OR a.company_id = $1) AND {predicate}"
        ))
        .bind(query.company_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count assets"))?;

        let assets = sqlx::query_as::<_, Asset>(&format!(
            "SELECT a.* FROM assets a LEFT JOIN status_labels s ON s.id = a.status_id \
             WHERE ($1::BIGINT IS NULL OR a.company_id = $1) AND {predicate} \
             ORDER BY a.id ASC LIMIT $2 OFFSET $3"
        ))
        .bind(query.company_id)
        .bind(i64::try_from(page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list assets"))?;

        Ok(PageResponse::new(
            assets,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Re-read an asset holding a row lock until the transaction ends.
    pub async fn lock(conn: &mut PgConnection, id: AssetId) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Failed to lock asset"))
    }

    /// Insert a new asset row.
    pub async fn insert(
        conn: &mut PgConnection,
        draft: &NewAsset,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "INSERT INTO assets (asset_tag, name, serial, model_id, status_id, company_id, \
             rtd_location_id, supplier_id, order_number, purchase_date, purchase_cost, \
             warranty_months, requestable, notes, archived, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $17) \
             RETURNING *",
        )
        .bind(draft.asset_tag.trim())
        .bind(&draft.name)
        .bind(&draft.serial)
        .bind(draft.model_id)
        .bind(draft.status_id)
        .bind(draft.company_id)
        .bind(draft.rtd_location_id)
        .bind(draft.supplier_id)
        .bind(&draft.order_number)
        .bind(draft.purchase_date)
        .bind(draft.purchase_cost)
        .bind(draft.warranty_months)
        .bind(draft.requestable)
        .bind(&draft.notes)
        .bind(draft.archived)
        .bind(created_by)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to insert asset"))
    }

    /// Write an asset back if its version is unchanged.
    ///
    /// Returns `None` when no row matched `(id, version)`.
    pub async fn update_versioned(
        conn: &mut PgConnection,
        asset: &Asset,
    ) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET asset_tag = $3, name = $4, serial = $5, model_id = $6, \
             status_id = $7, company_id = $8, rtd_location_id = $9, supplier_id = $10, \
             order_number = $11, purchase_date = $12, purchase_cost = $13, \
             warranty_months = $14, requestable = $15, notes = $16, assigned_to = $17, \
             last_checkout = $18, expected_checkin = $19, accepted = $20, archived = $21, \
             deleted_at = $22, updated_at = NOW(), version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING *",
        )
        .bind(asset.id)
        .bind(asset.version)
        .bind(&asset.asset_tag)
        .bind(&asset.name)
        .bind(&asset.serial)
        .bind(asset.model_id)
        .bind(asset.status_id)
        .bind(asset.company_id)
        .bind(asset.rtd_location_id)
        .bind(asset.supplier_id)
        .bind(&asset.order_number)
        .bind(asset.purchase_date)
        .bind(asset.purchase_cost)
        .bind(asset.warranty_months)
        .bind(asset.requestable)
        .bind(&asset.notes)
        .bind(asset.assigned_to)
        .bind(asset.last_checkout)
        .bind(asset.expected_checkin)
        .bind(asset.accepted)
        .bind(asset.archived)
        .bind(asset.deleted_at)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to update asset"))
    }
}
