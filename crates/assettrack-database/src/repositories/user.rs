//! User repository implementation.

use sqlx::PgPool;

use assettrack_core::result::AppResult;
use assettrack_core::types::id::UserId;
use assettrack_entity::user::User;

use super::db_error;

/// Read-only repository for users. Account management lives elsewhere.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by id.
    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user"))
    }
}
