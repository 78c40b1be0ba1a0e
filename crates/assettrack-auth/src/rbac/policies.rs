//! Role-to-privilege mapping definitions.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use assettrack_entity::user::UserRole;

/// A system-level privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    /// See and act on assets of every company.
    CrossCompany,
    /// Run bulk operations.
    Administer,
    /// Check out, check in, edit, delete, restore and upload on single assets.
    Manage,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CrossCompany => "cross_company",
            Self::Administer => "administer",
            Self::Manage => "manage",
        };
        f.write_str(name)
    }
}

/// Maps each role to the privileges it holds.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    policies: HashMap<UserRole, HashSet<Privilege>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();
        policies.insert(
            UserRole::SuperUser,
            HashSet::from([
                Privilege::CrossCompany,
                Privilege::Administer,
                Privilege::Manage,
            ]),
        );
        policies.insert(
            UserRole::Admin,
            HashSet::from([Privilege::Administer, Privilege::Manage]),
        );
        policies.insert(UserRole::User, HashSet::from([Privilege::Manage]));
        Self { policies }
    }

    /// Returns the privileges held by a role.
    pub fn privileges_for_role(&self, role: &UserRole) -> HashSet<Privilege> {
        self.policies.get(role).cloned().unwrap_or_default()
    }

    /// Checks whether a role holds a privilege.
    pub fn has_privilege(&self, role: &UserRole, privilege: Privilege) -> bool {
        self.policies
            .get(role)
            .is_some_and(|set| set.contains(&privilege))
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
