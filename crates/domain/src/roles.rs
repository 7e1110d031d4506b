//! Named role catalogues for the global and per-organization contexts.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use launchpad_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::access::{AuthorizeResponse, Permission, Resource, Statements};

/// Tenancy context a role catalogue belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    /// Platform-wide roles carried on the user account.
    Global,
    /// Roles held through an organization membership.
    Organization,
}

impl AccessScope {
    /// Returns the resources roles in this scope may mention.
    #[must_use]
    pub fn vocabulary(&self) -> &'static [Resource] {
        match self {
            Self::Global => &[
                Resource::User,
                Resource::Session,
                Resource::WaitlistDefinition,
                Resource::WaitlistEntry,
            ],
            Self::Organization => &[
                Resource::Organization,
                Resource::Member,
                Resource::Invitation,
                Resource::Team,
                Resource::WaitlistDefinition,
                Resource::WaitlistEntry,
            ],
        }
    }

    /// Returns the stable scope label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Organization => "organization",
        }
    }
}

/// A named bundle of statements inside one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    name: String,
    scope: AccessScope,
    statements: Statements,
}

impl Role {
    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the scope the role was registered in.
    #[must_use]
    pub fn scope(&self) -> AccessScope {
        self.scope
    }

    /// Returns the role's effective statements.
    #[must_use]
    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    /// Returns whether the role grants the permission.
    #[must_use]
    pub fn allows(&self, permission: Permission) -> bool {
        self.statements.allows(permission)
    }

    /// Returns whether this role grants everything `other` grants.
    #[must_use]
    pub fn includes(&self, other: &Role) -> bool {
        self.statements.contains(&other.statements)
    }

    /// Checks named actions on one resource.
    #[must_use]
    pub fn authorize(&self, resource: Resource, actions: &[&str]) -> AuthorizeResponse {
        match self.statements.allows_all(resource, actions) {
            Ok(true) => AuthorizeResponse::granted(),
            Ok(false) => AuthorizeResponse::denied(format!(
                "role '{}' is not allowed to {} on {}",
                self.name,
                actions.join(", "),
                resource.as_str()
            )),
            Err(error) => AuthorizeResponse::denied(error.to_string()),
        }
    }
}

/// Builder that registers roles in declaration order.
#[derive(Debug)]
pub struct RoleCatalogueBuilder {
    scope: AccessScope,
    roles: BTreeMap<String, Role>,
}

impl RoleCatalogueBuilder {
    /// Starts an empty catalogue for one scope.
    #[must_use]
    pub fn new(scope: AccessScope) -> Self {
        Self {
            scope,
            roles: BTreeMap::new(),
        }
    }

    /// Registers a role whose effective statements are exactly `statements`.
    pub fn new_role(mut self, name: impl Into<String>, statements: Statements) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_owned()));
        }

        if self.roles.contains_key(&name) {
            return Err(AppError::Conflict(format!(
                "role '{name}' is already registered in the {} catalogue",
                self.scope.as_str()
            )));
        }

        let vocabulary = self.scope.vocabulary();
        if let Some(resource) = statements
            .resources()
            .find(|resource| !vocabulary.contains(resource))
        {
            return Err(AppError::Validation(format!(
                "role '{name}' mentions resource '{}' outside the {} vocabulary",
                resource.as_str(),
                self.scope.as_str()
            )));
        }

        self.roles.insert(
            name.clone(),
            Role {
                name,
                scope: self.scope,
                statements,
            },
        );
        Ok(self)
    }

    /// Registers a role inheriting every listed base role plus `additions`.
    pub fn compose(
        self,
        name: impl Into<String>,
        bases: &[&str],
        additions: Statements,
    ) -> AppResult<Self> {
        let mut statements = Statements::new();
        for base in bases {
            let role = self.roles.get(*base).ok_or_else(|| {
                AppError::NotFound(format!(
                    "base role '{base}' is not registered in the {} catalogue",
                    self.scope.as_str()
                ))
            })?;
            statements = statements.union(role.statements());
        }

        self.new_role(name, statements.union(&additions))
    }

    /// Freezes the catalogue.
    #[must_use]
    pub fn build(self) -> RoleCatalogue {
        RoleCatalogue {
            scope: self.scope,
            roles: self.roles,
        }
    }
}

/// Immutable set of named roles for one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalogue {
    scope: AccessScope,
    roles: BTreeMap<String, Role>,
}

impl RoleCatalogue {
    /// Returns the catalogue scope.
    #[must_use]
    pub fn scope(&self) -> AccessScope {
        self.scope
    }

    /// Looks up a role by name.
    pub fn role(&self, name: &str) -> AppResult<&Role> {
        self.roles.get(name).ok_or_else(|| {
            AppError::NotFound(format!(
                "role '{name}' does not exist in the {} catalogue",
                self.scope.as_str()
            ))
        })
    }

    /// Returns every role ordered by name.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }
}

/// Global role names.
pub mod global {
    /// Default role for every account.
    pub const USER: &str = "user";
    /// Platform administrator.
    pub const ADMIN: &str = "admin";
}

/// Organization role names.
pub mod organization {
    /// Organization creator with full control.
    pub const OWNER: &str = "owner";
    /// Manages members and waitlists.
    pub const ADMIN: &str = "admin";
    /// Reads waitlists and their statistics.
    pub const ANALYST: &str = "analyst";
    /// Baseline membership.
    pub const MEMBER: &str = "member";
}

fn build_global_catalogue() -> AppResult<RoleCatalogue> {
    let user = Statements::new().with(&[Permission::WaitlistEntryCreate]);
    let admin = Statements::vendor_admin_defaults().union(&Statements::waitlist_full());

    Ok(RoleCatalogueBuilder::new(AccessScope::Global)
        .new_role(global::USER, user)?
        .compose(global::ADMIN, &[global::USER], admin)?
        .build())
}

fn build_organization_catalogue() -> AppResult<RoleCatalogue> {
    let member = Statements::vendor_organization_member_defaults()
        .with(&[Permission::WaitlistEntryCreate]);
    let analyst = Statements::new().with(&[
        Permission::WaitlistDefinitionGet,
        Permission::WaitlistDefinitionList,
        Permission::WaitlistDefinitionGetStats,
        Permission::WaitlistDefinitionGetActiveCount,
        Permission::WaitlistEntryGetEntry,
        Permission::WaitlistEntrySearchEntries,
    ]);
    let admin = Statements::vendor_organization_admin_defaults().with(&[
        Permission::WaitlistDefinitionCreate,
        Permission::WaitlistEntryUpdateStatus,
    ]);

    Ok(RoleCatalogueBuilder::new(AccessScope::Organization)
        .new_role(organization::MEMBER, member)?
        .compose(organization::ANALYST, &[organization::MEMBER], analyst)?
        .compose(organization::ADMIN, &[organization::ANALYST], admin)?
        .compose(
            organization::OWNER,
            &[organization::ADMIN],
            Statements::vendor_organization_owner_defaults(),
        )?
        .build())
}

static GLOBAL_CATALOGUE: LazyLock<AppResult<RoleCatalogue>> = LazyLock::new(build_global_catalogue);
static ORGANIZATION_CATALOGUE: LazyLock<AppResult<RoleCatalogue>> =
    LazyLock::new(build_organization_catalogue);

fn frozen(catalogue: &'static AppResult<RoleCatalogue>) -> AppResult<&'static RoleCatalogue> {
    catalogue
        .as_ref()
        .map_err(|error| AppError::Internal(format!("role catalogue is misconfigured: {error}")))
}

/// Returns the frozen global catalogue.
pub fn global_catalogue() -> AppResult<&'static RoleCatalogue> {
    frozen(&GLOBAL_CATALOGUE)
}

/// Returns the frozen per-organization catalogue.
pub fn organization_catalogue() -> AppResult<&'static RoleCatalogue> {
    frozen(&ORGANIZATION_CATALOGUE)
}

/// Global `user` role.
pub fn global_user() -> AppResult<&'static Role> {
    global_catalogue()?.role(global::USER)
}

/// Global `admin` role.
pub fn global_admin() -> AppResult<&'static Role> {
    global_catalogue()?.role(global::ADMIN)
}

/// Organization `owner` role.
pub fn organization_owner() -> AppResult<&'static Role> {
    organization_catalogue()?.role(organization::OWNER)
}

/// Organization `admin` role.
pub fn organization_admin() -> AppResult<&'static Role> {
    organization_catalogue()?.role(organization::ADMIN)
}

/// Organization `analyst` role.
pub fn organization_analyst() -> AppResult<&'static Role> {
    organization_catalogue()?.role(organization::ANALYST)
}

/// Organization `member` role.
pub fn organization_member() -> AppResult<&'static Role> {
    organization_catalogue()?.role(organization::MEMBER)
}

#[cfg(test)]
mod tests {
    use launchpad_core::{AppError, AppResult};

    use super::*;

    #[test]
    fn global_catalogue_matches_declared_grants() -> AppResult<()> {
        let user = global_user()?;
        assert_eq!(
            user.statements().by_resource(),
            BTreeMap::from([("waitlistEntry", vec!["create"])])
        );

        let admin = global_admin()?;
        assert_eq!(
            admin.statements().actions(Resource::WaitlistDefinition),
            vec!["create", "get", "list", "getStats", "getActiveCount"]
        );
        assert_eq!(
            admin.statements().actions(Resource::WaitlistEntry),
            vec!["create", "updateStatus", "getEntry", "searchEntries"]
        );
        assert!(admin.allows(Permission::UserBan));
        assert!(admin.includes(user));
        Ok(())
    }

    #[test]
    fn user_role_cannot_update_entry_status() -> AppResult<()> {
        let response = global_user()?.authorize(Resource::WaitlistEntry, &["updateStatus"]);
        assert!(!response.success);
        assert!(response.error.is_some());
        Ok(())
    }

    #[test]
    fn organization_chain_is_monotone() -> AppResult<()> {
        let member = organization_member()?;
        let analyst = organization_analyst()?;
        let admin = organization_admin()?;
        let owner = organization_owner()?;

        assert!(analyst.includes(member));
        assert!(admin.includes(analyst));
        assert!(owner.includes(admin));
        assert!(owner.includes(member));
        assert!(!member.includes(analyst));
        assert!(owner.allows(Permission::OrganizationDelete));
        assert!(!admin.allows(Permission::OrganizationDelete));
        Ok(())
    }

    #[test]
    fn catalogues_are_isolated_by_scope() -> AppResult<()> {
        assert_eq!(global_catalogue()?.scope(), AccessScope::Global);
        assert_eq!(organization_admin()?.scope(), AccessScope::Organization);
        assert!(!organization_owner()?.allows(Permission::UserBan));
        Ok(())
    }

    #[test]
    fn new_role_rejects_resource_outside_scope() {
        let result = RoleCatalogueBuilder::new(AccessScope::Global)
            .new_role("support", Statements::new().with(&[Permission::TeamCreate]));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn new_role_rejects_duplicate_name() -> AppResult<()> {
        let result = RoleCatalogueBuilder::new(AccessScope::Global)
            .new_role("user", Statements::new())?
            .new_role("user", Statements::new());
        assert!(matches!(result, Err(AppError::Conflict(_))));
        Ok(())
    }

    #[test]
    fn compose_rejects_unknown_base() {
        let result = RoleCatalogueBuilder::new(AccessScope::Organization).compose(
            "auditor",
            &["ghost"],
            Statements::new(),
        );
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn new_role_keeps_statements_exactly() -> AppResult<()> {
        let statements = Statements::new().with(&[Permission::WaitlistEntryGetEntry]);
        let catalogue = RoleCatalogueBuilder::new(AccessScope::Global)
            .new_role("reader", statements.clone())?
            .build();

        assert_eq!(catalogue.role("reader")?.statements(), &statements);
        assert!(catalogue.role("writer").is_err());
        Ok(())
    }
}
