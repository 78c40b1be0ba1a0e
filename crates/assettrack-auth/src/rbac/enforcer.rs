//! RBAC enforcement: does a role hold a required privilege.

use assettrack_core::error::AppError;
use assettrack_entity::user::UserRole;

use super::policies::{Privilege, RbacPolicies};

/// Enforces role-based privileges.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates an enforcer with the default policy set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an enforcer with custom policies.
    pub fn with_policies(policies: RbacPolicies) -> Self {
        Self { policies }
    }

    /// Fails with `Authorization` unless the role holds the privilege.
    pub fn require_privilege(&self, role: &UserRole, privilege: Privilege) -> Result<(), AppError> {
        if self.policies.has_privilege(role, privilege) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{role}' does not have privilege '{privilege}'"
            )))
        }
    }

    /// Checks whether the role holds the privilege.
    pub fn has_privilege(&self, role: &UserRole, privilege: Privilege) -> bool {
        self.policies.has_privilege(role, privilege)
    }
}
