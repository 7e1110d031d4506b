use std::sync::Arc;

use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{Actor, AuthorizeResponse, Permission, Resource, Statements};

use crate::OrganizationRepository;

#[cfg(test)]
mod tests;

/// Application service resolving an actor's effective statements.
///
/// The effective set is the global role's statements, unioned with the
/// organization role's statements only for targets owned by the organization
/// the actor acts within. Acting within an organization one is not a member
/// of is `Forbidden`.
#[derive(Clone)]
pub struct AuthorizationService {
    organization_repository: Arc<dyn OrganizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(organization_repository: Arc<dyn OrganizationRepository>) -> Self {
        Self {
            organization_repository,
        }
    }

    /// Returns the statements the actor holds within its own organization.
    pub async fn effective_statements(&self, actor: &Actor) -> AppResult<Statements> {
        self.statements_for(actor, actor.organization_id).await
    }

    /// Returns the statements the actor holds on a target owned by `owner`.
    ///
    /// Global targets (`owner == None`) and targets of other organizations
    /// only see the global role.
    pub async fn statements_for(
        &self,
        actor: &Actor,
        owner: Option<OrganizationId>,
    ) -> AppResult<Statements> {
        let global = actor.role.catalogue_role()?.statements().clone();

        let Some(organization_id) = actor.organization_id else {
            return Ok(global);
        };

        let membership = self
            .organization_repository
            .find_membership(organization_id, actor.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden(format!(
                    "user '{}' is not a member of organization '{organization_id}'",
                    actor.user_id
                ))
            })?;

        if owner != Some(organization_id) {
            return Ok(global);
        }

        Ok(global.union(membership.role.catalogue_role()?.statements()))
    }

    /// Ensures the actor holds the permission within its own organization.
    pub async fn require_permission(&self, actor: &Actor, permission: Permission) -> AppResult<()> {
        self.require_permission_on(actor, permission, actor.organization_id)
            .await
    }

    /// Ensures the actor holds the permission on a target owned by `owner`.
    pub async fn require_permission_on(
        &self,
        actor: &Actor,
        permission: Permission,
        owner: Option<OrganizationId>,
    ) -> AppResult<()> {
        if self.has_permission_on(actor, permission, owner).await? {
            return Ok(());
        }

        Err(Self::denied(actor, permission))
    }

    /// Returns whether the actor holds the permission within its own organization.
    pub async fn has_permission(&self, actor: &Actor, permission: Permission) -> AppResult<bool> {
        self.has_permission_on(actor, permission, actor.organization_id)
            .await
    }

    /// Returns whether the actor holds the permission on a target owned by `owner`.
    pub async fn has_permission_on(
        &self,
        actor: &Actor,
        permission: Permission,
        owner: Option<OrganizationId>,
    ) -> AppResult<bool> {
        Ok(self.statements_for(actor, owner).await?.allows(permission))
    }

    /// Builds the `Forbidden` error for a missing permission.
    #[must_use]
    pub fn denied(actor: &Actor, permission: Permission) -> AppError {
        AppError::Forbidden(match actor.organization_id {
            Some(organization_id) => format!(
                "user '{}' is missing permission '{}' in organization '{organization_id}'",
                actor.user_id,
                permission.as_str()
            ),
            None => format!(
                "user '{}' is missing permission '{}'",
                actor.user_id,
                permission.as_str()
            ),
        })
    }

    /// Checks a set of actions on one resource, reporting the outcome as data.
    ///
    /// Unknown action names are validation errors, not denials.
    pub async fn authorize(
        &self,
        actor: &Actor,
        resource: Resource,
        actions: &[&str],
    ) -> AppResult<AuthorizeResponse> {
        let statements = self.effective_statements(actor).await?;
        if statements.allows_all(resource, actions)? {
            Ok(AuthorizeResponse::granted())
        } else {
            Ok(AuthorizeResponse::denied(format!(
                "not allowed to {} on {}",
                actions.join(", "),
                resource.as_str()
            )))
        }
    }
}
