//! The acting user of a core operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use assettrack_core::types::id::{CompanyId, UserId};
use assettrack_entity::user::{User, UserRole};

/// Who is performing an operation.
///
/// Built by the caller (session layer, CLI) and passed explicitly into
/// every service method; nothing in the core reads ambient identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user's id.
    pub user_id: UserId,
    /// Username, for log fields.
    pub username: String,
    /// Role at the time the actor was resolved.
    pub role: UserRole,
    /// Company the actor belongs to, if any.
    pub company_id: Option<CompanyId>,
    /// When the request was received. Used as "now" for event times.
    pub request_time: DateTime<Utc>,
}

impl Actor {
    /// Create an actor stamped with the current time.
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        role: UserRole,
        company_id: Option<CompanyId>,
    ) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            company_id,
            request_time: Utc::now(),
        }
    }

    /// Build an actor from a stored user.
    pub fn from_user(user: &User) -> Self {
        Self::new(user.id, user.username.clone(), user.role, user.company_id)
    }

    /// Override the request time.
    pub fn at(mut self, request_time: DateTime<Utc>) -> Self {
        self.request_time = request_time;
        self
    }
}
