//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use assettrack_core::types::id::{CompanyId, UserId};

use super::role::UserRole;

/// A person who can act on assets or hold custody of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: Option<String>,
    /// Email address for checkout/checkin notices.
    pub email: Option<String>,
    /// Company the user belongs to; `None` means not bound to a company.
    pub company_id: Option<CompanyId>,
    /// RBAC role.
    pub role: UserRole,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Display name ("First Last").
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    /// Whether the user can still receive assets.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
