use std::sync::Arc;

use chrono::Utc;
use launchpad_core::{AppError, AppResult, OrganizationId};
use launchpad_domain::{Membership, OrganizationRole, Permission, Resource, UserRole};

use crate::test_support::{FakeOrganizationRepository, actor};

use super::AuthorizationService;

async fn member_of(
    repository: &FakeOrganizationRepository,
    user_role: UserRole,
    organization_role: OrganizationRole,
) -> launchpad_domain::Actor {
    let organization_id = OrganizationId::new();
    let actor = actor(user_role).within(Some(organization_id));
    repository
        .seed_membership(Membership {
            organization_id,
            user_id: actor.user_id,
            email: actor.email.to_string(),
            role: organization_role,
            created_at: Utc::now(),
        })
        .await;
    actor
}

#[tokio::test]
async fn global_user_may_only_create_entries() -> AppResult<()> {
    let service = AuthorizationService::new(Arc::new(FakeOrganizationRepository::default()));
    let user = actor(UserRole::User);

    service
        .require_permission(&user, Permission::WaitlistEntryCreate)
        .await?;
    let result = service
        .require_permission(&user, Permission::WaitlistEntryUpdateStatus)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn global_admin_holds_every_waitlist_permission() -> AppResult<()> {
    let service = AuthorizationService::new(Arc::new(FakeOrganizationRepository::default()));
    let admin = actor(UserRole::Admin);

    for permission in Resource::WaitlistEntry
        .permissions()
        .iter()
        .chain(Resource::WaitlistDefinition.permissions())
    {
        assert!(service.has_permission(&admin, *permission).await?);
    }
    assert!(service.has_permission(&admin, Permission::UserBan).await?);
    Ok(())
}

#[tokio::test]
async fn organization_role_extends_global_role() -> AppResult<()> {
    let repository = Arc::new(FakeOrganizationRepository::default());
    let service = AuthorizationService::new(repository.clone());
    let analyst = member_of(&repository, UserRole::User, OrganizationRole::Analyst).await;

    assert!(
        service
            .has_permission(&analyst, Permission::WaitlistEntrySearchEntries)
            .await?
    );
    assert!(
        !service
            .has_permission(&analyst, Permission::WaitlistEntryUpdateStatus)
            .await?
    );

    let outside = analyst.clone().within(None);
    assert!(
        !service
            .has_permission(&outside, Permission::WaitlistEntrySearchEntries)
            .await?
    );
    Ok(())
}

#[tokio::test]
async fn non_member_is_forbidden_in_organization_context() {
    let service = AuthorizationService::new(Arc::new(FakeOrganizationRepository::default()));
    let stranger = actor(UserRole::Admin).within(Some(OrganizationId::new()));

    let result = service
        .require_permission(&stranger, Permission::WaitlistEntryCreate)
        .await;
    assert!(matches!(result, Err(error) if error.is_forbidden()));
}

#[tokio::test]
async fn authorize_reports_denial_as_data() -> AppResult<()> {
    let repository = Arc::new(FakeOrganizationRepository::default());
    let service = AuthorizationService::new(repository.clone());
    let owner = member_of(&repository, UserRole::User, OrganizationRole::Owner).await;
    let member = member_of(&repository, UserRole::User, OrganizationRole::Member).await;

    let granted = service
        .authorize(&owner, Resource::Member, &["create", "delete"])
        .await?;
    assert!(granted.success);

    let denied = service
        .authorize(&member, Resource::Member, &["create"])
        .await?;
    assert!(!denied.success);
    assert!(denied.error.is_some());

    let unknown = service
        .authorize(&owner, Resource::Member, &["promote"])
        .await;
    assert!(matches!(unknown, Err(error) if error.is_validation()));
    Ok(())
}

#[tokio::test]
async fn organization_role_only_reaches_targets_it_owns() -> AppResult<()> {
    let repository = Arc::new(FakeOrganizationRepository::default());
    let service = AuthorizationService::new(repository.clone());
    let owner = member_of(&repository, UserRole::User, OrganizationRole::Owner).await;
    let own_organization = owner.organization_id;

    assert!(
        service
            .has_permission_on(&owner, Permission::WaitlistEntryUpdateStatus, own_organization)
            .await?
    );
    assert!(
        !service
            .has_permission_on(&owner, Permission::WaitlistEntryUpdateStatus, None)
            .await?
    );
    assert!(
        !service
            .has_permission_on(
                &owner,
                Permission::WaitlistDefinitionCreate,
                Some(OrganizationId::new()),
            )
            .await?
    );

    let denied = service
        .require_permission_on(&owner, Permission::WaitlistEntryUpdateStatus, None)
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    Ok(())
}
