//! Whether an actor may see or change a given asset.
//!
//! With full company support enabled, an actor bound to a company only
//! reaches assets of that company. Super users cross company lines, and
//! an actor without a company is unscoped. With the setting off, every
//! actor reaches every asset.

use tracing::debug;

use assettrack_core::config::AccessConfig;
use assettrack_core::error::AppError;
use assettrack_core::types::id::CompanyId;
use assettrack_entity::asset::Asset;

use crate::actor::Actor;
use crate::rbac::{Privilege, RbacEnforcer};

/// Access decisions for assets and bulk operations.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    full_company_support: bool,
    enforcer: RbacEnforcer,
}

impl AccessPolicy {
    /// Build from configuration with the default RBAC table.
    pub fn new(config: &AccessConfig) -> Self {
        Self::with_enforcer(config, RbacEnforcer::new())
    }

    /// Build from configuration with a custom enforcer.
    pub fn with_enforcer(config: &AccessConfig, enforcer: RbacEnforcer) -> Self {
        Self {
            full_company_support: config.full_company_support,
            enforcer,
        }
    }

    /// Whether company scoping is active.
    pub fn is_scoped(&self) -> bool {
        self.full_company_support
    }

    fn is_unscoped(&self, actor: &Actor) -> bool {
        !self.full_company_support
            || actor.company_id.is_none()
            || self
                .enforcer
                .has_privilege(&actor.role, Privilege::CrossCompany)
    }

    /// Whether the actor may see or act on the asset.
    pub fn can_access(&self, actor: &Actor, asset: &Asset) -> bool {
        self.is_unscoped(actor) || actor.company_id == asset.company_id
    }

    /// Whether the actor may run bulk operations.
    pub fn can_administer(&self, actor: &Actor) -> bool {
        self.enforcer
            .has_privilege(&actor.role, Privilege::Administer)
            && self.is_unscoped(actor)
    }

    /// Company filter for listings: `None` when the actor sees every company.
    pub fn listing_scope(&self, actor: &Actor) -> Option<CompanyId> {
        if self.is_unscoped(actor) {
            None
        } else {
            actor.company_id
        }
    }

    /// Company a newly created asset is filed under. Scoped actors
    /// always create within their own company.
    pub fn company_for_new_asset(
        &self,
        actor: &Actor,
        requested: Option<CompanyId>,
    ) -> Option<CompanyId> {
        if self.is_unscoped(actor) {
            requested
        } else {
            actor.company_id
        }
    }

    /// Fails with `Authorization` unless [`Self::can_access`] holds.
    pub fn require_access(&self, actor: &Actor, asset: &Asset) -> Result<(), AppError> {
        if self.can_access(actor, asset) {
            return Ok(());
        }
        debug!(
            actor_id = %actor.user_id,
            asset_id = %asset.id,
            "Asset outside actor's company"
        );
        Err(AppError::authorization(format!(
            "User {} may not access asset {}",
            actor.username, asset.asset_tag
        )))
    }

    /// Fails with `Authorization` unless [`Self::can_administer`] holds.
    pub fn require_administer(&self, actor: &Actor) -> Result<(), AppError> {
        if self.can_administer(actor) {
            return Ok(());
        }
        Err(AppError::authorization(format!(
            "User {} may not run bulk operations",
            actor.username
        )))
    }

    /// Fails with `Authorization` unless the actor may manage single assets.
    pub fn require_manage(&self, actor: &Actor) -> Result<(), AppError> {
        self.enforcer.require_privilege(&actor.role, Privilege::Manage)
    }

    /// Require both the manage privilege and access to the asset.
    pub fn require_manage_access(&self, actor: &Actor, asset: &Asset) -> Result<(), AppError> {
        self.require_manage(actor)?;
        self.require_access(actor, asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assettrack_core::types::id::{AssetId, UserId};
    use assettrack_entity::asset::NewAsset;
    use assettrack_entity::user::UserRole;
    use chrono::Utc;

    fn scoped() -> AccessPolicy {
        AccessPolicy::new(&AccessConfig {
            full_company_support: true,
        })
    }

    fn asset_of(company: Option<i64>) -> Asset {
        NewAsset {
            asset_tag: "ACC-1".to_string(),
            company_id: company.map(CompanyId),
            ..NewAsset::default()
        }
        .into_asset(AssetId(1), UserId(1), Utc::now())
    }

    fn actor(role: UserRole, company: Option<i64>) -> Actor {
        Actor::new(UserId(7), "tester", role, company.map(CompanyId))
    }

    #[test]
    fn test_scoped_access() {
        let policy = scoped();
        let asset = asset_of(Some(1));
        assert!(policy.can_access(&actor(UserRole::User, Some(1)), &asset));
        assert!(!policy.can_access(&actor(UserRole::User, Some(2)), &asset));
        assert!(!policy.can_access(&actor(UserRole::Admin, Some(2)), &asset));
        assert!(policy.can_access(&actor(UserRole::SuperUser, Some(2)), &asset));
        assert!(policy.can_access(&actor(UserRole::User, None), &asset));

        let err = policy
            .require_access(&actor(UserRole::User, Some(2)), &asset)
            .unwrap_err();
        assert_eq!(err.to_string().split(':').next(), Some("ACCESS_DENIED"));
    }

    #[test]
    fn test_unscoped_allows_everyone() {
        let policy = AccessPolicy::new(&AccessConfig::default());
        assert!(policy.can_access(&actor(UserRole::User, Some(2)), &asset_of(Some(1))));
        assert!(policy.can_administer(&actor(UserRole::Admin, Some(2))));
        assert!(!policy.can_administer(&actor(UserRole::User, None)));
    }

    #[test]
    fn test_administer_requires_unscoped_admin() {
        let policy = scoped();
        assert!(policy.can_administer(&actor(UserRole::Admin, None)));
        assert!(!policy.can_administer(&actor(UserRole::Admin, Some(3))));
        assert!(policy.can_administer(&actor(UserRole::SuperUser, Some(3))));
        assert!(policy.require_administer(&actor(UserRole::User, None)).is_err());
    }

    #[test]
    fn test_scoped_actor_creates_within_own_company() {
        let policy = scoped();
        let user = actor(UserRole::User, Some(4));
        assert_eq!(policy.listing_scope(&user), Some(CompanyId(4)));
        assert_eq!(
            policy.company_for_new_asset(&user, Some(CompanyId(9))),
            Some(CompanyId(4))
        );
        let root = actor(UserRole::SuperUser, Some(4));
        assert_eq!(policy.listing_scope(&root), None);
        assert_eq!(
            policy.company_for_new_asset(&root, Some(CompanyId(9))),
            Some(CompanyId(9))
        );
    }
}
