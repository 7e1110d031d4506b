use std::collections::HashMap;

use async_trait::async_trait;
use launchpad_application::OrganizationRepository;
use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{Membership, Organization, UserId};
use tokio::sync::RwLock;

/// In-memory organization repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationRepository {
    organizations: RwLock<HashMap<OrganizationId, Organization>>,
    memberships: RwLock<HashMap<(OrganizationId, UserId), Membership>>,
}

impl InMemoryOrganizationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn create_organization(
        &self,
        organization: Organization,
        owner: Membership,
    ) -> AppResult<()> {
        let mut organizations = self.organizations.write().await;
        if organizations
            .values()
            .any(|existing| existing.slug == organization.slug)
        {
            return Err(AppError::Conflict(format!(
                "organization slug '{}' is already taken",
                organization.slug
            )));
        }

        self.memberships
            .write()
            .await
            .insert((owner.organization_id, owner.user_id), owner);
        organizations.insert(organization.id, organization);
        Ok(())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        Ok(self
            .organizations
            .read()
            .await
            .get(&organization_id)
            .cloned())
    }

    async fn find_membership(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .memberships
            .read()
            .await
            .get(&(organization_id, user_id))
            .cloned())
    }

    async fn add_membership(&self, membership: Membership) -> AppResult<()> {
        let key = (membership.organization_id, membership.user_id);
        let mut memberships = self.memberships.write().await;

        if memberships.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "user '{}' is already a member of organization '{}'",
                key.1, key.0
            )));
        }

        memberships.insert(key, membership);
        Ok(())
    }
}
