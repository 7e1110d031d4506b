use std::sync::Arc;

use chrono::Utc;
use launchpad_core::{AppError, AppResult, OrganizationId, Validate};
use launchpad_domain::{
    Actor, AddMemberInput, CreateOrganizationInput, EmailAddress, GetMembershipInput, Membership,
    Organization, OrganizationRole, Permission,
};

use crate::{AuthorizationService, OrganizationRepository, UserRepository};


/// Application service for organizations and their memberships.
#[derive(Clone)]
pub struct OrganizationService {
    organization_repository: Arc<dyn OrganizationRepository>,
    user_repository: Arc<dyn UserRepository>,
    authorization_service: AuthorizationService,
}

impl OrganizationService {
    /// Creates a new organization service.
    #[must_use]
    pub fn new(
        organization_repository: Arc<dyn OrganizationRepository>,
        user_repository: Arc<dyn UserRepository>,
        authorization_service: AuthorizationService,
    ) -> Self {
        Self {
            organization_repository,
            user_repository,
            authorization_service,
        }
    }

    /// Creates an organization; the caller becomes its owner.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateOrganizationInput,
    ) -> AppResult<Organization> {
        input.validate()?;

        let now = Utc::now();
        let organization = Organization {
            id: OrganizationId::new(),
            name: input.name.trim().to_owned(),
            slug: input.slug,
            created_at: now,
        };
        let owner = Membership {
            organization_id: organization.id,
            user_id: actor.user_id,
            email: actor.email.to_string(),
            role: OrganizationRole::Owner,
            created_at: now,
        };

        self.organization_repository
            .create_organization(organization.clone(), owner)
            .await?;

        Ok(organization)
    }

    /// Adds an existing account to an organization.
    ///
    /// Requires `member:create` within the target organization.
    pub async fn add_member(&self, actor: &Actor, input: AddMemberInput) -> AppResult<Membership> {
        input.validate()?;

        let scoped = actor.clone().within(Some(input.organization_id));
        self.authorization_service
            .require_permission(&scoped, Permission::MemberCreate)
            .await?;

        if self
            .organization_repository
            .find_organization(input.organization_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "organization '{}' does not exist",
                input.organization_id
            )));
        }

        let email = EmailAddress::new(&input.email)?;
        let user = self
            .user_repository
            .find_by_email(email.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no account is registered for '{email}'")))?;

        let membership = Membership {
            organization_id: input.organization_id,
            user_id: user.id,
            email: user.email,
            role: input.role,
            created_at: Utc::now(),
        };
        self.organization_repository
            .add_membership(membership.clone())
            .await?;

        Ok(membership)
    }

    /// Returns the caller's membership in an organization.
    pub async fn get_membership(
        &self,
        actor: &Actor,
        input: GetMembershipInput,
    ) -> AppResult<Membership> {
        input.validate()?;

        self.organization_repository
            .find_membership(input.organization_id, actor.user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no membership in organization '{}'",
                    input.organization_id
                ))
            })
    }
}
