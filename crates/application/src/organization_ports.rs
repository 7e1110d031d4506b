use async_trait::async_trait;
use launchpad_core::{AppResult, OrganizationId};
use launchpad_domain::{Membership, Organization, UserId};

/// Repository port for organizations and memberships.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Creates an organization together with its owner membership.
    ///
    /// Fails with `Conflict` when the slug is taken.
    async fn create_organization(
        &self,
        organization: Organization,
        owner: Membership,
    ) -> AppResult<()>;

    /// Finds an organization by identifier.
    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>>;

    /// Finds one user's membership in an organization.
    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<Membership>>;

    /// Adds a membership. Fails with `Conflict` when the user is already a member.
    async fn add_membership(&self, membership: Membership) -> AppResult<()>;
}
