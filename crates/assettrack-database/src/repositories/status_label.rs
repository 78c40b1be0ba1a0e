//! Status label repository implementation.

use sqlx::PgPool;

use assettrack_core::result::AppResult;
use assettrack_core::types::id::StatusLabelId;
use assettrack_entity::status::StatusLabel;

use super::db_error;

/// Read-only repository for the status label vocabulary.
#[derive(Debug, Clone)]
pub struct StatusLabelRepository {
    pool: PgPool,
}

impl StatusLabelRepository {
    /// Create a new status label repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a label by id.
    pub async fn find_by_id(&self, id: StatusLabelId) -> AppResult<Option<StatusLabel>> {
        sqlx::query_as::<_, StatusLabel>(
            "SELECT id, name, deployable, pending, archived FROM status_labels WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find status label"))
    }
}
